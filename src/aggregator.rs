use std::collections::BTreeMap;

use tracing::debug;

use crate::types::{NodeCapacity, NodeUsage, WorkloadResourceSpec};

/// Fold workloads into per-node totals.
///
/// Every node starts with an empty accumulator. A workload bound to a node
/// that is not in `nodes` (including unscheduled ones, keyed by the empty
/// name) gets an accumulator with zero capacity.
pub fn aggregate(nodes: &[NodeCapacity], workloads: &[WorkloadResourceSpec]) -> BTreeMap<String, NodeUsage> {
    let mut usage: BTreeMap<String, NodeUsage> = nodes
        .iter()
        .map(|node| (node.name.clone(), NodeUsage::new(node.clone())))
        .collect();

    for workload in workloads {
        let entry = usage.entry(workload.node_name.clone()).or_insert_with(|| {
            debug!(
                "{}/{} is bound to unknown node {:?}",
                workload.namespace, workload.name, workload.node_name
            );
            NodeUsage::new(NodeCapacity::absent(workload.node_name.clone()))
        });
        entry.pods += 1;
        for container in &workload.containers {
            entry.memory_request += container.request;
            entry.memory_limit += container.limit;
        }
    }

    usage
}
