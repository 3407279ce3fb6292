use k8s_openapi::api::core::v1::{Container, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity as K8sQuantity;
use std::collections::BTreeMap;
use tracing::warn;

use crate::parsing::Quantity;
use crate::types::{ContainerMemory, WorkloadResourceSpec};

/// Memory requests and limits of a pod's regular containers, keyed to the
/// node it is bound to.
pub fn workload_spec(pod: &Pod) -> WorkloadResourceSpec {
    let name = pod.metadata.name.clone().unwrap_or_default();
    let namespace = pod.metadata.namespace.clone().unwrap_or_default();
    let (node_name, containers) = match pod.spec.as_ref() {
        Some(spec) => (
            spec.node_name.clone().unwrap_or_default(),
            spec.containers
                .iter()
                .map(|c| container_memory(&namespace, &name, c))
                .collect(),
        ),
        None => (String::new(), Vec::new()),
    };

    WorkloadResourceSpec {
        name,
        namespace,
        node_name,
        containers,
    }
}

pub fn workload_specs(pods: &[Pod]) -> Vec<WorkloadResourceSpec> {
    pods.iter().map(workload_spec).collect()
}

fn container_memory(namespace: &str, pod: &str, container: &Container) -> ContainerMemory {
    let resources = container.resources.as_ref();
    let memory = |values: Option<&BTreeMap<String, K8sQuantity>>, field: &str| -> Quantity {
        match values.and_then(|v| v.get("memory")) {
            Some(q) => q.0.parse().unwrap_or_else(|e| {
                warn!("{}/{} [{}]: ignoring memory {}: {}", namespace, pod, container.name, field, e);
                Quantity::ZERO
            }),
            None => Quantity::ZERO,
        }
    };

    ContainerMemory {
        request: memory(resources.and_then(|r| r.requests.as_ref()), "request"),
        limit: memory(resources.and_then(|r| r.limits.as_ref()), "limit"),
    }
}
