use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use common::spark::{Application, ClusterMetrics, ExecutorInfo, JobInfo, StageInfo};
use common::{Cluster, ClusterId, Job, JobId, JobRun, PipelineSummary};

use crate::error::{Error, Result};
use crate::service::DatabricksApi;
use crate::spark::{AppResource, SparkClient, SparkClientFactory};

/// Registros de una app de Spark, agrupados por la app que los produjo.
pub type ByApp<T> = HashMap<Application, Vec<T>>;

/// Los tres mapas por app de un cluster, con una sola lectura de la
/// lista de apps.
#[derive(Debug, Clone, Default)]
pub struct SparkClusterDetail {
    pub executors: ByApp<ExecutorInfo>,
    pub jobs: ByApp<JobInfo>,
    pub stages: ByApp<StageInfo>,
}

#[async_trait]
pub trait SparkService: Send + Sync {
    async fn core_metrics_for_clusters(
        &self,
        clusters: &[Cluster],
    ) -> Result<BTreeMap<ClusterId, ClusterMetrics>>;
    async fn core_metrics_for_cluster(&self, cluster_id: &str) -> Result<ClusterMetrics>;
    async fn executors_by_app(&self, cluster_id: &str) -> Result<ByApp<ExecutorInfo>>;
    async fn jobs_by_app(&self, cluster_id: &str) -> Result<ByApp<JobInfo>>;
    async fn stages_by_app(&self, cluster_id: &str) -> Result<ByApp<StageInfo>>;
    async fn cluster_detail(&self, cluster_id: &str) -> Result<SparkClusterDetail>;
}

#[derive(Clone)]
pub struct SparkRestService {
    factory: Arc<dyn SparkClientFactory>,
}

impl SparkRestService {
    pub fn new(factory: Arc<dyn SparkClientFactory>) -> Self {
        Self { factory }
    }

    fn new_client(&self, cluster_id: &str) -> SparkClient {
        self.factory.client(cluster_id)
    }
}

async fn applications(client: &SparkClient, cluster_id: &str) -> Result<Vec<Application>> {
    let apps = client
        .applications()
        .await
        .map_err(|e| e.fetching("applications", "cluster id", cluster_id))?;
    debug!("cluster {}: {} apps de spark", cluster_id, apps.len());
    Ok(apps)
}

/// Un pedido por app, en secuencia. Si falla cualquiera no hay mapa.
async fn slices_by_app<T: AppResource>(client: &SparkClient, apps: &[Application]) -> Result<ByApp<T>> {
    let mut out = HashMap::with_capacity(apps.len());
    for app in apps {
        let items = client
            .app_resource::<T>(&app.id)
            .await
            .map_err(|e| e.fetching(T::KIND, "app id", &app.id))?;
        out.insert(app.clone(), items);
    }
    Ok(out)
}

impl SparkRestService {
    async fn by_app<T: AppResource>(&self, cluster_id: &str) -> Result<ByApp<T>> {
        let client = self.new_client(cluster_id);
        let apps = applications(&client, cluster_id).await?;
        slices_by_app(&client, &apps).await
    }
}

#[async_trait]
impl SparkService for SparkRestService {
    async fn core_metrics_for_clusters(
        &self,
        clusters: &[Cluster],
    ) -> Result<BTreeMap<ClusterId, ClusterMetrics>> {
        let mut out = BTreeMap::new();
        for cluster in clusters {
            let metrics = self.core_metrics_for_cluster(&cluster.cluster_id).await?;
            out.insert(cluster.cluster_id.clone(), metrics);
        }
        Ok(out)
    }

    async fn core_metrics_for_cluster(&self, cluster_id: &str) -> Result<ClusterMetrics> {
        self.new_client(cluster_id)
            .metrics()
            .await
            .map_err(|e| e.fetching("spark metrics", "cluster id", cluster_id))
    }

    async fn executors_by_app(&self, cluster_id: &str) -> Result<ByApp<ExecutorInfo>> {
        self.by_app(cluster_id)
            .await
            .map_err(|e| e.during("executors_by_app"))
    }

    async fn jobs_by_app(&self, cluster_id: &str) -> Result<ByApp<JobInfo>> {
        self.by_app(cluster_id).await.map_err(|e| e.during("jobs_by_app"))
    }

    async fn stages_by_app(&self, cluster_id: &str) -> Result<ByApp<StageInfo>> {
        self.by_app(cluster_id)
            .await
            .map_err(|e| e.during("stages_by_app"))
    }

    async fn cluster_detail(&self, cluster_id: &str) -> Result<SparkClusterDetail> {
        let client = self.new_client(cluster_id);
        let detail = async {
            // la lista de apps no cambia dentro de un ciclo: se lee una vez
            let apps = applications(&client, cluster_id).await?;
            Ok::<_, Error>(SparkClusterDetail {
                executors: slices_by_app(&client, &apps).await?,
                jobs: slices_by_app(&client, &apps).await?,
                stages: slices_by_app(&client, &apps).await?,
            })
        }
        .await;
        detail.map_err(|e| e.during("cluster_detail"))
    }
}

/// El servicio de Spark no sabe hablar con la API del workspace.
#[async_trait]
impl DatabricksApi for SparkRestService {
    async fn jobs(&self) -> Result<Vec<Job>> {
        Err(Error::Unsupported("SparkRestService::jobs"))
    }

    async fn active_job_runs(&self) -> Result<Vec<JobRun>> {
        Err(Error::Unsupported("SparkRestService::active_job_runs"))
    }

    async fn completed_job_runs(&self, _job_id: JobId, _prev_start_time: i64) -> Result<Vec<JobRun>> {
        Err(Error::Unsupported("SparkRestService::completed_job_runs"))
    }

    async fn running_clusters(&self) -> Result<Vec<Cluster>> {
        Err(Error::Unsupported("SparkRestService::running_clusters"))
    }

    async fn running_pipelines(&self) -> Result<Vec<PipelineSummary>> {
        Err(Error::Unsupported("SparkRestService::running_pipelines"))
    }
}
