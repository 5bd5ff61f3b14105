use async_trait::async_trait;
use tracing::debug;

use common::{Cluster, Job, JobId, JobRun, JobsPage, PipelineSummary, RunsPage, PIPELINE_RUNNING};

use crate::databricks::DatabricksClient;
use crate::error::Result;
use crate::pagination::{walk_pages, walk_pages_until, Page};

/// Operaciones contra el workspace. Se extrae como trait para poder
/// cambiar la implementación en los tests y en el scraper.
#[async_trait]
pub trait DatabricksApi: Send + Sync {
    async fn jobs(&self) -> Result<Vec<Job>>;
    async fn active_job_runs(&self) -> Result<Vec<JobRun>>;
    async fn completed_job_runs(&self, job_id: JobId, prev_start_time: i64) -> Result<Vec<JobRun>>;
    async fn running_clusters(&self) -> Result<Vec<Cluster>>;
    async fn running_pipelines(&self) -> Result<Vec<PipelineSummary>>;
}

impl From<JobsPage> for Page<Job> {
    fn from(p: JobsPage) -> Self {
        Page { items: p.jobs, has_more: p.has_more }
    }
}

impl From<RunsPage> for Page<JobRun> {
    fn from(p: RunsPage) -> Self {
        Page { items: p.runs, has_more: p.has_more }
    }
}

/// Maneja la paginación (has_more) y junta los objetos devueltos en una
/// sola colección.
#[derive(Clone)]
pub struct DatabricksService {
    client: DatabricksClient,
    limit: usize,
}

impl DatabricksService {
    pub fn new(client: DatabricksClient, limit: usize) -> Self {
        Self {
            client,
            limit: limit.max(1),
        }
    }
}

/// Condición de corte para los runs completados de un job.
///
/// Las páginas vienen de la más nueva a la más vieja: cuando el run más
/// viejo de la página ya es anterior a la marca previa, todo lo nuevo está
/// adentro. Con `prev_start_time == 0` (primer poll del job) se trae sólo
/// la primera página.
pub fn reached_watermark(page: &[JobRun], prev_start_time: i64) -> bool {
    match page.last() {
        _ if prev_start_time == 0 => true,
        None => true,
        Some(oldest) => oldest.start_time < prev_start_time,
    }
}

#[async_trait]
impl DatabricksApi for DatabricksService {
    async fn jobs(&self) -> Result<Vec<Job>> {
        let client = &self.client;
        let limit = self.limit;
        walk_pages(limit, move |offset| async move {
            client.jobs_list(limit, offset).await.map(Page::from)
        })
        .await
        .map_err(|e| e.during("jobs"))
    }

    async fn active_job_runs(&self) -> Result<Vec<JobRun>> {
        let client = &self.client;
        let limit = self.limit;
        walk_pages(limit, move |offset| async move {
            client.active_job_runs(limit, offset).await.map(Page::from)
        })
        .await
        .map_err(|e| e.during("active_job_runs"))
    }

    async fn completed_job_runs(&self, job_id: JobId, prev_start_time: i64) -> Result<Vec<JobRun>> {
        let client = &self.client;
        let limit = self.limit;
        let runs = walk_pages_until(
            limit,
            move |offset| async move {
                client
                    .completed_job_runs(job_id, limit, offset)
                    .await
                    .map(Page::from)
            },
            |page| reached_watermark(page, prev_start_time),
        )
        .await
        .map_err(|e| e.fetching("completed runs", "job id", job_id).during("completed_job_runs"))?;

        debug!(
            "job {}: {} runs completados (marca previa {})",
            job_id,
            runs.len(),
            prev_start_time
        );
        Ok(runs)
    }

    async fn running_clusters(&self) -> Result<Vec<Cluster>> {
        let list = self
            .client
            .clusters_list()
            .await
            .map_err(|e| e.during("running_clusters"))?;

        Ok(list.clusters.into_iter().filter(Cluster::is_running).collect())
    }

    async fn running_pipelines(&self) -> Result<Vec<PipelineSummary>> {
        let list = self
            .client
            .pipelines()
            .await
            .map_err(|e| e.during("running_pipelines"))?;

        let mut out = Vec::new();
        for status in list.statuses {
            if status.state != PIPELINE_RUNNING {
                continue;
            }

            let pipeline = self
                .client
                .pipeline(&status.pipeline_id)
                .await
                .map_err(|e| {
                    e.fetching("pipeline info", "pipeline id", &status.pipeline_id)
                        .during("running_pipelines")
                })?;

            out.push(PipelineSummary {
                id: status.pipeline_id,
                name: status.name,
                cluster_id: pipeline.cluster_id,
            });
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::databricks::{
        active_job_runs_path, completed_job_runs_path, jobs_list_path, pipeline_path,
        CLUSTERS_LIST_PATH, PIPELINES_PATH,
    };
    use crate::error::Error;
    use crate::testing::FakeTransport;
    use serde_json::{json, Value};
    use std::sync::Arc;

    const LIMIT: usize = 2;

    fn service(fake: &FakeTransport) -> DatabricksService {
        DatabricksService::new(DatabricksClient::new(Arc::new(fake.clone())), LIMIT)
    }

    fn runs(job_id: i64, start_times: &[i64], has_more: bool) -> Value {
        let runs: Vec<Value> = start_times
            .iter()
            .enumerate()
            .map(|(i, t)| json!({"job_id": job_id, "run_id": t * 10 + i as i64, "start_time": t}))
            .collect();
        json!({"runs": runs, "has_more": has_more})
    }

    #[tokio::test]
    async fn jobs_recorre_todas_las_paginas() {
        let fake = FakeTransport::new()
            .with_json(&jobs_list_path(LIMIT, 0), json!({"jobs": [{"job_id": 1}, {"job_id": 2}], "has_more": true}))
            .with_json(&jobs_list_path(LIMIT, 2), json!({"jobs": [{"job_id": 3}], "has_more": false}));

        let jobs = service(&fake).jobs().await.unwrap();

        let ids: Vec<i64> = jobs.iter().map(|j| j.job_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(fake.calls().len(), 2);
    }

    #[tokio::test]
    async fn active_runs_con_error_no_devuelve_parciales() {
        let fake = FakeTransport::new()
            .with_json(&active_job_runs_path(LIMIT, 0), runs(1, &[5, 4], true))
            .with_status(&active_job_runs_path(LIMIT, 2), 500);

        let err = service(&fake).active_job_runs().await.unwrap_err();

        assert!(err.to_string().starts_with("active_job_runs: "));
        assert!(matches!(err.root(), Error::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn completed_runs_primer_poll_hace_un_solo_request() {
        let fake = FakeTransport::new()
            .with_json(&completed_job_runs_path(9, LIMIT, 0), runs(9, &[300, 200], true))
            .with_json(&completed_job_runs_path(9, LIMIT, 2), runs(9, &[100, 50], false));

        let out = service(&fake).completed_job_runs(9, 0).await.unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(fake.calls(), vec![completed_job_runs_path(9, LIMIT, 0)]);
    }

    #[tokio::test]
    async fn completed_runs_corta_al_pasar_la_marca() {
        // P0: el más viejo es 80 (no es < 75) -> sigue; P1: 60 < 75 -> corta
        let fake = FakeTransport::new()
            .with_json(&completed_job_runs_path(9, LIMIT, 0), runs(9, &[120, 80], true))
            .with_json(&completed_job_runs_path(9, LIMIT, 2), runs(9, &[70, 60], true))
            .with_json(&completed_job_runs_path(9, LIMIT, 4), runs(9, &[40, 30], false));

        let out = service(&fake).completed_job_runs(9, 75).await.unwrap();

        let starts: Vec<i64> = out.iter().map(|r| r.start_time).collect();
        assert_eq!(starts, vec![120, 80, 70, 60]);
        assert_eq!(fake.calls().len(), 2);
    }

    #[tokio::test]
    async fn completed_runs_pagina_vacia_corta() {
        let fake = FakeTransport::new()
            .with_json(&completed_job_runs_path(9, LIMIT, 0), json!({"has_more": true}));

        let out = service(&fake).completed_job_runs(9, 75).await.unwrap();

        assert!(out.is_empty());
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn completed_runs_respeta_has_more_false() {
        let fake = FakeTransport::new()
            .with_json(&completed_job_runs_path(9, LIMIT, 0), runs(9, &[120, 100], false));

        let out = service(&fake).completed_job_runs(9, 75).await.unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn completed_runs_error_nombra_el_job() {
        let fake = FakeTransport::new()
            .with_json(&completed_job_runs_path(9, LIMIT, 0), runs(9, &[120, 100], true))
            .with_status(&completed_job_runs_path(9, LIMIT, 2), 502);

        let err = service(&fake).completed_job_runs(9, 75).await.unwrap_err();

        assert!(err.to_string().contains("job id 9"));
    }

    #[tokio::test]
    async fn running_clusters_filtra_y_conserva_orden() {
        let fake = FakeTransport::new().with_json(
            CLUSTERS_LIST_PATH,
            json!({"clusters": [
                {"cluster_id": "a", "state": "RUNNING"},
                {"cluster_id": "b", "state": "TERMINATED"},
                {"cluster_id": "c", "state": "RUNNING"},
                {"cluster_id": "d", "state": "PENDING"},
                {"cluster_id": "e", "state": "running"}
            ]}),
        );

        let clusters = service(&fake).running_clusters().await.unwrap();

        let ids: Vec<&str> = clusters.iter().map(|c| c.cluster_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn running_pipelines_resuelve_cluster_solo_de_los_running() {
        let fake = FakeTransport::new()
            .with_json(
                PIPELINES_PATH,
                json!({"statuses": [
                    {"pipeline_id": "a", "name": "ingesta", "state": "RUNNING"},
                    {"pipeline_id": "b", "name": "parado", "state": "STOPPED"}
                ]}),
            )
            .with_json(&pipeline_path("a"), json!({"pipeline_id": "a", "cluster_id": "c-77"}));

        let out = service(&fake).running_pipelines().await.unwrap();

        assert_eq!(
            out,
            vec![PipelineSummary { id: "a".into(), name: "ingesta".into(), cluster_id: "c-77".into() }]
        );
        assert_eq!(fake.calls(), vec![PIPELINES_PATH.to_string(), pipeline_path("a")]);
    }

    #[tokio::test]
    async fn running_pipelines_falla_entero_si_falla_un_detalle() {
        let fake = FakeTransport::new()
            .with_json(
                PIPELINES_PATH,
                json!({"statuses": [
                    {"pipeline_id": "a", "state": "RUNNING"},
                    {"pipeline_id": "b", "state": "RUNNING"}
                ]}),
            )
            .with_json(&pipeline_path("a"), json!({"pipeline_id": "a", "cluster_id": "c1"}))
            .with_status(&pipeline_path("b"), 500);

        let err = service(&fake).running_pipelines().await.unwrap_err();

        assert!(err.to_string().contains("pipeline id b"));
    }
}
