use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::aggregator::aggregate;
use crate::parsing::MEBIBYTE;
use crate::types::{ClusterSnapshot, NodeUsage};

const UNSCHEDULED_LABEL: &str = "<unscheduled>";

/// Whole-number percentage, undefined when the capacity it is taken of is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percent(pub Option<i64>);

/// `part * 100 / whole` with truncating division; `None` for a zero `whole`.
pub fn percent_of(part: i64, whole: i64) -> Percent {
    Percent(part.saturating_mul(100).checked_div(whole))
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, "{}%", p),
            None => f.write_str("n/a"),
        }
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Utilization figures for one node, memory in whole MiB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeUtilization {
    pub name: String,
    pub memory_request_mib: i64,
    pub memory_request_pct: Percent,
    pub memory_limit_mib: i64,
    pub memory_limit_pct: Percent,
    pub memory_allocatable_mib: i64,
    pub pods: i64,
    pub max_pods: i64,
    pub pods_pct: Percent,
}

impl NodeUtilization {
    pub fn from_usage(usage: &NodeUsage) -> Self {
        let request = usage.memory_request.scaled_ceil(MEBIBYTE);
        let limit = usage.memory_limit.scaled_ceil(MEBIBYTE);
        let allocatable = usage.capacity.max_memory.scaled_ceil(MEBIBYTE);

        Self {
            name: usage.capacity.name.clone(),
            memory_request_mib: request,
            memory_request_pct: percent_of(request, allocatable),
            memory_limit_mib: limit,
            memory_limit_pct: percent_of(limit, allocatable),
            memory_allocatable_mib: allocatable,
            pods: usage.pods,
            max_pods: usage.capacity.max_pods,
            pods_pct: percent_of(usage.pods, usage.capacity.max_pods),
        }
    }

    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            UNSCHEDULED_LABEL
        } else {
            &self.name
        }
    }
}

impl fmt::Display for NodeUtilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Memory: {}Mi request ({}), {}Mi limit ({}), {}Mi total available. Pods: {}/{} pods ({})",
            self.label(),
            self.memory_request_mib,
            self.memory_request_pct,
            self.memory_limit_mib,
            self.memory_limit_pct,
            self.memory_allocatable_mib,
            self.pods,
            self.max_pods,
            self.pods_pct,
        )
    }
}

/// Per-node utilization of one snapshot, ordered by node name.
#[derive(Debug, Clone, Serialize)]
pub struct UtilizationReport {
    pub endpoint: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub node_count: usize,
    pub pod_count: usize,
    pub nodes: Vec<NodeUtilization>,
}

impl UtilizationReport {
    pub fn from_snapshot(snapshot: &ClusterSnapshot) -> Self {
        let usage = aggregate(&snapshot.nodes, &snapshot.workloads);
        let mut report = Self::build(&usage, snapshot.nodes.len(), snapshot.workloads.len());
        report.generated_at = snapshot.fetched_at;
        report
    }

    pub fn build(usage: &BTreeMap<String, NodeUsage>, node_count: usize, pod_count: usize) -> Self {
        Self {
            endpoint: None,
            generated_at: Utc::now(),
            node_count,
            pod_count,
            nodes: usage.values().map(NodeUtilization::from_usage).collect(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn summary_line(&self) -> String {
        format!(
            "There are {} nodes and {} pods in the cluster.",
            self.node_count, self.pod_count
        )
    }

    /// Summary followed by one line per node.
    pub fn lines(&self) -> Vec<String> {
        std::iter::once(self.summary_line())
            .chain(self.nodes.iter().map(|n| n.to_string()))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Nodes whose pod or memory figures could not be computed.
    pub fn undefined_nodes(&self) -> impl Iterator<Item = &NodeUtilization> {
        self.nodes
            .iter()
            .filter(|n| n.memory_request_pct.0.is_none() || n.pods_pct.0.is_none())
    }
}
