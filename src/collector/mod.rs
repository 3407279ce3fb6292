pub mod selector;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::AuditError;
use crate::kubernetes::{ClusterApi, Connector};
use crate::metrics;
use crate::report::UtilizationReport;
use crate::types::{ClusterSnapshot, ConnectionDescriptor, Resource};

pub use selector::{select_cluster, Selection};

/// Fetch every pod and every node from one live connection.
///
/// Pods are listed first: that call doubles as the proof that the endpoint
/// is usable. The two lists are read independently and may be slightly out
/// of step with each other.
pub async fn collect_snapshot<A: ClusterApi + ?Sized>(api: &A) -> Result<ClusterSnapshot, AuditError> {
    let pods = api
        .list_pods()
        .await
        .map_err(|source| AuditError::Fetch { resource: Resource::Pods, source })?;
    debug!("listed {} pods", pods.len());

    let nodes = api
        .list_nodes()
        .await
        .map_err(|source| AuditError::Fetch { resource: Resource::Nodes, source })?;
    debug!("listed {} nodes", nodes.len());

    let snapshot = ClusterSnapshot {
        nodes: metrics::node_capacities(&nodes),
        workloads: metrics::workload_specs(&pods),
        fetched_at: Utc::now(),
    };
    info!(
        "snapshot taken at {}: {} nodes, {} pods",
        snapshot.fetched_at.to_rfc3339(),
        snapshot.nodes.len(),
        snapshot.workloads.len()
    );
    Ok(snapshot)
}

/// Select the first working endpoint and build its utilization report.
pub async fn audit_cluster<C: Connector>(
    connector: &C,
    descriptors: &[ConnectionDescriptor],
) -> Result<UtilizationReport, AuditError> {
    let (endpoint, snapshot) = select_cluster(connector, descriptors).await.into_result()?;
    Ok(UtilizationReport::from_snapshot(&snapshot).with_endpoint(endpoint))
}
