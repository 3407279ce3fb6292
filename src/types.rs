use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::parsing::Quantity;

/// Allocatable ceiling of one worker node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCapacity {
    pub name: String,
    pub max_memory: Quantity,
    pub max_pods: i64,
}

impl NodeCapacity {
    /// Capacity of a node that never appeared in the node list.
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_memory: Quantity::ZERO,
            max_pods: 0,
        }
    }
}

/// Memory declared by a single container. Undeclared values are zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ContainerMemory {
    pub request: Quantity,
    pub limit: Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadResourceSpec {
    pub name: String,
    pub namespace: String,
    /// Empty when the pod has not been scheduled.
    pub node_name: String,
    pub containers: Vec<ContainerMemory>,
}

/// Running totals for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeUsage {
    pub capacity: NodeCapacity,
    pub memory_request: Quantity,
    pub memory_limit: Quantity,
    pub pods: i64,
}

impl NodeUsage {
    pub fn new(capacity: NodeCapacity) -> Self {
        Self {
            capacity,
            memory_request: Quantity::ZERO,
            memory_limit: Quantity::ZERO,
            pods: 0,
        }
    }
}

/// One candidate API endpoint together with the credentials to reach it.
#[derive(Clone)]
pub struct ConnectionDescriptor {
    pub scheme: String,
    /// Host, including the port when one was given.
    pub host: String,
    pub api_path: String,
    pub bearer_token: String,
    /// PEM bundle, already base64-decoded. May be empty.
    pub ca_certificate: Vec<u8>,
    pub connect_timeout: Duration,
}

impl ConnectionDescriptor {
    pub fn server_url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.api_path.trim_end_matches('/'))
    }
}

// Keep the token out of logs.
impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("api_path", &self.api_path)
            .field("bearer_token", &"<redacted>")
            .field("ca_certificate", &format_args!("{} bytes", self.ca_certificate.len()))
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// The two lists fetched from one endpoint. They are not read
/// transactionally, so a pod may reference a node missing from `nodes`.
#[derive(Debug, Clone)]
pub struct ClusterSnapshot {
    pub nodes: Vec<NodeCapacity>,
    pub workloads: Vec<WorkloadResourceSpec>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Nodes,
    Pods,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Nodes => f.write_str("nodes"),
            Resource::Pods => f.write_str("pods"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub ca_certificate: Vec<u8>,
    pub bearer_token: String,
    pub endpoints: Vec<String>,
    pub connect_timeout: Duration,
    pub output: OutputFormat,
}
