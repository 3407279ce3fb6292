// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod parsing;
pub mod kubernetes;
pub mod metrics;
pub mod collector;
pub mod aggregator;
pub mod report;

// Re-export commonly used items
pub use types::*;
pub use error::AuditError;
pub use config::{build_descriptors, parse_descriptor, Cli};
pub use parsing::{parse_duration, Quantity, MEBIBYTE};
pub use kubernetes::{ClusterApi, Connector, KubeCluster, KubeConnector};
pub use metrics::{node_capacity, workload_spec};
pub use collector::{audit_cluster, collect_snapshot, select_cluster, Selection};
pub use aggregator::aggregate;
pub use report::{percent_of, NodeUtilization, Percent, UtilizationReport};
