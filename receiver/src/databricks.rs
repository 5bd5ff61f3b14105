use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

use common::{ClusterList, JobId, JobsPage, PipelineDetail, PipelineList, RunsPage};

use crate::error::{Error, Result};
use crate::transport::Transport;

pub const JOBS_LIST_PATH: &str = "/api/2.1/jobs/list";
pub const JOB_RUNS_PATH: &str = "/api/2.1/jobs/runs/list";
pub const CLUSTERS_LIST_PATH: &str = "/api/2.0/clusters/list";
pub const PIPELINES_PATH: &str = "/api/2.0/pipelines";

pub fn jobs_list_path(limit: usize, offset: usize) -> String {
    format!("{JOBS_LIST_PATH}?expand_tasks=true&limit={limit}&offset={offset}")
}

pub fn active_job_runs_path(limit: usize, offset: usize) -> String {
    format!("{JOB_RUNS_PATH}?active_only=true&limit={limit}&offset={offset}")
}

pub fn completed_job_runs_path(job_id: JobId, limit: usize, offset: usize) -> String {
    format!(
        "{JOB_RUNS_PATH}?completed_only=true&expand_tasks=true&job_id={job_id}&limit={limit}&offset={offset}"
    )
}

pub fn pipeline_path(pipeline_id: &str) -> String {
    format!("{PIPELINES_PATH}/{pipeline_id}")
}

pub(crate) fn decode<T: DeserializeOwned>(resource: &'static str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| Error::Decode { resource, source })
}

/// Cliente de la API del workspace: arma los paths y decodifica las
/// respuestas. La paginación vive en el servicio.
#[derive(Clone)]
pub struct DatabricksClient {
    transport: Arc<dyn Transport>,
}

impl DatabricksClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn get<T: DeserializeOwned>(&self, resource: &'static str, path: &str) -> Result<T> {
        debug!("databricks: pidiendo {} en {}", resource, path);
        let bytes = self.transport.get(path).await?;
        decode(resource, &bytes)
    }

    pub async fn jobs_list(&self, limit: usize, offset: usize) -> Result<JobsPage> {
        self.get("jobs", &jobs_list_path(limit, offset)).await
    }

    pub async fn active_job_runs(&self, limit: usize, offset: usize) -> Result<RunsPage> {
        self.get("active job runs", &active_job_runs_path(limit, offset))
            .await
    }

    pub async fn completed_job_runs(
        &self,
        job_id: JobId,
        limit: usize,
        offset: usize,
    ) -> Result<RunsPage> {
        self.get(
            "completed job runs",
            &completed_job_runs_path(job_id, limit, offset),
        )
        .await
    }

    pub async fn clusters_list(&self) -> Result<ClusterList> {
        self.get("clusters", CLUSTERS_LIST_PATH).await
    }

    pub async fn pipelines(&self) -> Result<PipelineList> {
        self.get("pipelines", PIPELINES_PATH).await
    }

    pub async fn pipeline(&self, pipeline_id: &str) -> Result<PipelineDetail> {
        self.get("pipeline", &pipeline_path(pipeline_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;
    use serde_json::json;

    #[test]
    fn paths_llevan_limit_offset_e_ids() {
        assert_eq!(
            jobs_list_path(25, 50),
            "/api/2.1/jobs/list?expand_tasks=true&limit=25&offset=50"
        );
        assert_eq!(
            active_job_runs_path(25, 0),
            "/api/2.1/jobs/runs/list?active_only=true&limit=25&offset=0"
        );
        assert_eq!(
            completed_job_runs_path(42, 10, 20),
            "/api/2.1/jobs/runs/list?completed_only=true&expand_tasks=true&job_id=42&limit=10&offset=20"
        );
        assert_eq!(pipeline_path("abc"), "/api/2.0/pipelines/abc");
    }

    #[tokio::test]
    async fn decodifica_el_sobre_de_clusters() {
        let fake = FakeTransport::new().with_json(
            CLUSTERS_LIST_PATH,
            json!({"clusters": [{"cluster_id": "c1", "state": "RUNNING"}]}),
        );
        let client = DatabricksClient::new(Arc::new(fake.clone()));

        let list = client.clusters_list().await.unwrap();
        assert_eq!(list.clusters.len(), 1);
        assert_eq!(list.clusters[0].cluster_id, "c1");
        assert_eq!(fake.calls(), vec![CLUSTERS_LIST_PATH.to_string()]);
    }

    #[tokio::test]
    async fn json_invalido_es_error_de_decodificacion() {
        let fake = FakeTransport::new().with_raw(PIPELINES_PATH, "{no es json");
        let client = DatabricksClient::new(Arc::new(fake));

        let err = client.pipelines().await.unwrap_err();
        assert!(matches!(err, Error::Decode { resource: "pipelines", .. }));
    }
}
