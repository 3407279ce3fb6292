use async_trait::async_trait;
use base64::Engine;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{api::ListParams, Api, Client};
use tracing::debug;

use crate::error::AuditError;
use crate::types::ConnectionDescriptor;

const CONTEXT_NAME: &str = "auditor";

/// Read access to one cluster.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_nodes(&self) -> Result<Vec<Node>, kube::Error>;

    /// Pods across all namespaces.
    async fn list_pods(&self) -> Result<Vec<Pod>, kube::Error>;
}

/// Builds a `ClusterApi` for a candidate endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    type Cluster: ClusterApi;

    async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<Self::Cluster, AuditError>;
}

pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn list_nodes(&self) -> Result<Vec<Node>, kube::Error> {
        let node_api: Api<Node> = Api::all(self.client.clone());
        Ok(node_api.list(&ListParams::default()).await?.items)
    }

    async fn list_pods(&self) -> Result<Vec<Pod>, kube::Error> {
        let pod_api: Api<Pod> = Api::all(self.client.clone());
        Ok(pod_api.list(&ListParams::default()).await?.items)
    }
}

/// Connects with the descriptor's bearer token and CA bundle.
#[derive(Debug, Default, Clone, Copy)]
pub struct KubeConnector;

#[async_trait]
impl Connector for KubeConnector {
    type Cluster = KubeCluster;

    async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<KubeCluster, AuditError> {
        let failed = |source: Box<dyn std::error::Error + Send + Sync>| AuditError::Connection {
            host: descriptor.host.clone(),
            source,
        };

        let kubeconfig = descriptor_kubeconfig(descriptor).map_err(|e| failed(e.into()))?;
        let options = KubeConfigOptions {
            context: Some(CONTEXT_NAME.to_string()),
            ..Default::default()
        };
        let mut config = kube::Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .map_err(|e| failed(e.into()))?;
        // The timeout bounds connection establishment only; list calls run to completion.
        config.connect_timeout = Some(descriptor.connect_timeout);
        config.read_timeout = None;
        config.write_timeout = None;

        debug!("connecting to {}", config.cluster_url);
        let client = Client::try_from(config).map_err(|e| failed(e.into()))?;
        Ok(KubeCluster::new(client))
    }
}

/// In-memory kubeconfig with a single cluster, user and context.
fn descriptor_kubeconfig(descriptor: &ConnectionDescriptor) -> Result<Kubeconfig, serde_json::Error> {
    let mut cluster = serde_json::json!({ "server": descriptor.server_url() });
    if !descriptor.ca_certificate.is_empty() {
        cluster["certificate-authority-data"] = serde_json::Value::String(
            base64::engine::general_purpose::STANDARD.encode(&descriptor.ca_certificate),
        );
    }

    serde_json::from_value(serde_json::json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{ "name": CONTEXT_NAME, "cluster": cluster }],
        "users": [{ "name": CONTEXT_NAME, "user": { "token": descriptor.bearer_token } }],
        "contexts": [{
            "name": CONTEXT_NAME,
            "context": { "cluster": CONTEXT_NAME, "user": CONTEXT_NAME }
        }],
        "current-context": CONTEXT_NAME,
    }))
}
