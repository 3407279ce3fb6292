// Extraction of capacity and declared resources from API objects
pub mod nodes;
pub mod pods;

pub use nodes::{node_capacities, node_capacity};
pub use pods::{workload_spec, workload_specs};
