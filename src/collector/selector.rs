use tracing::{info, warn};

use crate::error::AuditError;
use crate::kubernetes::Connector;
use crate::types::{ClusterSnapshot, ConnectionDescriptor};

use super::collect_snapshot;

/// Outcome of walking the candidate endpoints.
#[derive(Debug)]
pub enum Selection {
    Connected {
        endpoint: String,
        snapshot: ClusterSnapshot,
    },
    Exhausted {
        attempts: usize,
    },
}

impl Selection {
    pub fn into_result(self) -> Result<(String, ClusterSnapshot), AuditError> {
        match self {
            Selection::Connected { endpoint, snapshot } => Ok((endpoint, snapshot)),
            Selection::Exhausted { attempts } => Err(AuditError::ClusterUnreachable { attempts }),
        }
    }
}

/// Try each descriptor in order and keep the first one that yields a full
/// snapshot. Later candidates are never contacted once one succeeds, and a
/// failing candidate gets exactly one attempt.
pub async fn select_cluster<C: Connector>(connector: &C, descriptors: &[ConnectionDescriptor]) -> Selection {
    for (i, descriptor) in descriptors.iter().enumerate() {
        let endpoint = descriptor.server_url();
        info!("trying {} ({}/{})", endpoint, i + 1, descriptors.len());

        let cluster = match connector.connect(descriptor).await {
            Ok(cluster) => cluster,
            Err(e) => {
                warn!("Invalid configuration: {}", e);
                continue;
            }
        };

        match collect_snapshot(&cluster).await {
            Ok(snapshot) => {
                info!("using {}", endpoint);
                return Selection::Connected { endpoint, snapshot };
            }
            Err(e) => warn!("{}: {}", endpoint, e),
        }
    }

    Selection::Exhausted {
        attempts: descriptors.len(),
    }
}
