use thiserror::Error;

use crate::types::Resource;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures while locating and reading a cluster.
///
/// Everything except `NoEndpoints` and `ClusterUnreachable` is local to one
/// candidate endpoint: it is logged and the next candidate is tried.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    Configuration { endpoint: String, reason: String },

    #[error("unable to build client for {host}: {source}")]
    Connection {
        host: String,
        #[source]
        source: BoxError,
    },

    #[error("unable to obtain {resource} list: {source}")]
    Fetch {
        resource: Resource,
        #[source]
        source: kube::Error,
    },

    #[error("no usable API server URL was given")]
    NoEndpoints,

    #[error("could not connect to cluster: {attempts} endpoint(s) tried")]
    ClusterUnreachable { attempts: usize },
}
