use k8s_openapi::api::core::v1::Node;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity as K8sQuantity;
use std::collections::BTreeMap;
use tracing::warn;

use crate::parsing::Quantity;
use crate::types::NodeCapacity;

/// Allocatable memory and pod slots of a node. Nodes without a name are skipped.
pub fn node_capacity(node: &Node) -> Option<NodeCapacity> {
    let name = node.metadata.name.as_ref()?.clone();
    let allocatable = node.status.as_ref().and_then(|s| s.allocatable.as_ref());

    let max_memory = allocatable_quantity(&name, allocatable, "memory");
    let max_pods = allocatable_quantity(&name, allocatable, "pods").value();

    Some(NodeCapacity {
        name,
        max_memory,
        max_pods,
    })
}

pub fn node_capacities(nodes: &[Node]) -> Vec<NodeCapacity> {
    nodes.iter().filter_map(node_capacity).collect()
}

fn allocatable_quantity(
    node_name: &str,
    allocatable: Option<&BTreeMap<String, K8sQuantity>>,
    resource: &str,
) -> Quantity {
    match allocatable.and_then(|a| a.get(resource)) {
        Some(q) => q.0.parse().unwrap_or_else(|e| {
            warn!("node {}: ignoring allocatable {}: {}", node_name, resource, e);
            Quantity::ZERO
        }),
        None => Quantity::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::NodeStatus;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn node(name: Option<&str>, allocatable: &[(&str, &str)]) -> Node {
        let allocatable: BTreeMap<String, K8sQuantity> = allocatable
            .iter()
            .map(|(k, v)| (k.to_string(), K8sQuantity(v.to_string())))
            .collect();
        Node {
            metadata: ObjectMeta {
                name: name.map(str::to_string),
                ..Default::default()
            },
            status: Some(NodeStatus {
                allocatable: Some(allocatable),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_node_capacity_reads_allocatable() {
        let n = node(Some("worker-1"), &[("memory", "4096Mi"), ("pods", "110"), ("cpu", "4")]);
        let cap = node_capacity(&n).unwrap();
        assert_eq!(cap.name, "worker-1");
        assert_eq!(cap.max_memory, "4Gi".parse::<Quantity>().unwrap());
        assert_eq!(cap.max_pods, 110);
    }

    #[test]
    fn test_node_capacity_missing_values_are_zero() {
        let cap = node_capacity(&node(Some("bare"), &[])).unwrap();
        assert!(cap.max_memory.is_zero());
        assert_eq!(cap.max_pods, 0);

        let no_status = Node {
            metadata: ObjectMeta {
                name: Some("no-status".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let cap = node_capacity(&no_status).unwrap();
        assert!(cap.max_memory.is_zero());
        assert_eq!(cap.max_pods, 0);
    }

    #[test]
    fn test_malformed_allocatable_is_zero() {
        let cap = node_capacity(&node(Some("odd"), &[("memory", "lots"), ("pods", "10")])).unwrap();
        assert!(cap.max_memory.is_zero());
        assert_eq!(cap.max_pods, 10);
    }

    #[test]
    fn test_unnamed_nodes_are_skipped() {
        let nodes = vec![node(None, &[("pods", "10")]), node(Some("named"), &[("pods", "10")])];
        let caps = node_capacities(&nodes);
        assert_eq!(caps.len(), 1);
        assert_eq!(caps[0].name, "named");
    }
}
