use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use common::spark::{Application, ClusterMetrics, ExecutorInfo, JobInfo, StageInfo};

use crate::databricks::decode;
use crate::error::Result;
use crate::transport::{AuthClient, Transport};

pub const METRICS_PATH: &str = "/metrics/json";
pub const APPLICATIONS_PATH: &str = "/api/v1/applications";

/// Recurso por aplicación de la API REST de Spark.
pub trait AppResource: DeserializeOwned + Send + 'static {
    /// "executors", "jobs" o "stages"
    const KIND: &'static str;

    fn path(app_id: &str) -> String {
        format!("{APPLICATIONS_PATH}/{app_id}/{}", Self::KIND)
    }
}

impl AppResource for ExecutorInfo {
    const KIND: &'static str = "executors";
}

impl AppResource for JobInfo {
    const KIND: &'static str = "jobs";
}

impl AppResource for StageInfo {
    const KIND: &'static str = "stages";
}

/// Cliente de Spark para un cluster puntual.
#[derive(Clone)]
pub struct SparkClient {
    transport: Arc<dyn Transport>,
}

impl SparkClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn metrics(&self) -> Result<ClusterMetrics> {
        let bytes = self.transport.get(METRICS_PATH).await?;
        decode("spark metrics", &bytes)
    }

    pub async fn applications(&self) -> Result<Vec<Application>> {
        let bytes = self.transport.get(APPLICATIONS_PATH).await?;
        decode("spark applications", &bytes)
    }

    pub async fn app_resource<T: AppResource>(&self, app_id: &str) -> Result<Vec<T>> {
        let path = T::path(app_id);
        debug!("spark: pidiendo {} de la app {}", T::KIND, app_id);
        let bytes = self.transport.get(&path).await?;
        decode(T::KIND, &bytes)
    }
}

/// Arma un cliente de Spark apuntando a un cluster.
pub trait SparkClientFactory: Send + Sync {
    fn client(&self, cluster_id: &str) -> SparkClient;
}

impl<F> SparkClientFactory for F
where
    F: Fn(&str) -> SparkClient + Send + Sync,
{
    fn client(&self, cluster_id: &str) -> SparkClient {
        self(cluster_id)
    }
}

/// Factory real: pasa por el driver proxy del workspace
/// ({endpoint}/driver-proxy-api/o/{org}/{cluster}/{puerto}).
#[derive(Clone)]
pub struct ProxySparkClientFactory {
    http: Client,
    endpoint: String,
    org_id: String,
    ui_port: u16,
    token: String,
}

impl ProxySparkClientFactory {
    pub fn new(http: Client, endpoint: &str, org_id: &str, ui_port: u16, token: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            org_id: org_id.to_string(),
            ui_port,
            token: token.to_string(),
        }
    }

    pub fn proxy_url(&self, cluster_id: &str) -> String {
        format!(
            "{}/driver-proxy-api/o/{}/{}/{}",
            self.endpoint, self.org_id, cluster_id, self.ui_port
        )
    }
}

impl SparkClientFactory for ProxySparkClientFactory {
    fn client(&self, cluster_id: &str) -> SparkClient {
        let auth = AuthClient::new(self.http.clone(), &self.proxy_url(cluster_id), &self.token);
        SparkClient::new(Arc::new(auth))
    }
}
