use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use common::spark::ClusterMetrics;
use common::{Cluster, ClusterId, JobId, JobRun, ScrapeReport};

use crate::error::Result;
use crate::metrics::MetricsBuilder;
use crate::service::DatabricksApi;
use crate::spark_service::{SparkClusterDetail, SparkService};
use crate::state::AppState;

/// Runs que todavía no habíamos visto y la nueva marca del job.
///
/// En el primer poll (`prev == 0`) sólo se registra la marca: no se emiten
/// duraciones de runs viejos.
pub fn new_completed_runs(runs: &[JobRun], prev: i64) -> (Vec<JobRun>, i64) {
    let mark = runs.iter().map(|r| r.start_time).max().unwrap_or(prev).max(prev);
    if prev == 0 {
        return (Vec::new(), mark);
    }
    let fresh = runs.iter().filter(|r| r.start_time > prev).cloned().collect();
    (fresh, mark)
}

struct SparkResults {
    core: BTreeMap<ClusterId, ClusterMetrics>,
    details: BTreeMap<ClusterId, SparkClusterDetail>,
}

pub struct Scraper {
    databricks: Arc<dyn DatabricksApi>,
    spark: Arc<dyn SparkService>,
    max_concurrency: usize,
}

impl Scraper {
    pub fn new(
        databricks: Arc<dyn DatabricksApi>,
        spark: Arc<dyn SparkService>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            databricks,
            spark,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Un ciclo completo. O sale todo bien y se actualiza el estado, o se
    /// devuelve el error y el estado queda como estaba.
    pub async fn scrape_once(&self, state: &AppState) -> Result<ScrapeReport> {
        let now = Utc::now();
        let mut builder = MetricsBuilder::new(now);

        // 1) jobs y runs activos
        let jobs = self.databricks.jobs().await?;
        builder.record_jobs(&jobs);

        let active = self.databricks.active_job_runs().await?;
        builder.record_active_runs(&active);

        // 2) runs completados desde la última marca de cada job; las marcas
        // de jobs que ya no aparecen en el listado se descartan
        let mut marks: HashMap<JobId, i64> = HashMap::new();
        for job in &jobs {
            let prev = state.watermark(job.job_id);
            let runs = self
                .databricks
                .completed_job_runs(job.job_id, prev)
                .await?;
            let (fresh, mark) = new_completed_runs(&runs, prev);
            builder.record_run_durations(&fresh);
            if mark != 0 {
                marks.insert(job.job_id, mark);
            }
        }

        // 3) clusters encendidos y su detalle de spark
        let clusters = self.databricks.running_clusters().await?;
        let spark = self.spark_for_clusters(&clusters).await?;
        builder.record_core_metrics(&spark.core);
        for (cluster_id, detail) in &spark.details {
            builder.record_spark_detail(cluster_id, detail);
        }

        // 4) pipelines
        let pipelines = self.databricks.running_pipelines().await?;
        builder.record_pipelines(&pipelines);

        let report = ScrapeReport {
            scraped_at: now,
            data_points: builder.finish(),
        };

        info!(
            "scrape ok: {} jobs, {} clusters, {} pipelines, {} data points",
            jobs.len(),
            clusters.len(),
            pipelines.len(),
            report.data_points.len()
        );

        state.commit_watermarks(marks);
        state.set_report(report.clone());
        Ok(report)
    }

    /// Un cluster por tarea, como mucho `max_concurrency` a la vez. El
    /// primer error corta todo.
    async fn spark_for_clusters(&self, clusters: &[Cluster]) -> Result<SparkResults> {
        let sem = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for cluster in clusters {
            tasks.spawn(scrape_cluster(
                self.spark.clone(),
                sem.clone(),
                cluster.cluster_id.clone(),
            ));
        }

        let mut out = SparkResults {
            core: BTreeMap::new(),
            details: BTreeMap::new(),
        };

        // al soltar `tasks` con `?` se abortan las que siguen corriendo
        while let Some(joined) = tasks.join_next().await {
            let (cluster_id, core, detail) = joined??;
            out.core.insert(cluster_id.clone(), core);
            out.details.insert(cluster_id, detail);
        }

        Ok(out)
    }
}

async fn scrape_cluster(
    spark: Arc<dyn SparkService>,
    sem: Arc<Semaphore>,
    cluster_id: ClusterId,
) -> Result<(ClusterId, ClusterMetrics, SparkClusterDetail)> {
    let _permit = sem.acquire_owned().await?;
    let core = spark.core_metrics_for_cluster(&cluster_id).await?;
    let detail = spark.cluster_detail(&cluster_id).await?;
    Ok((cluster_id, core, detail))
}

/// Loop principal: un ciclo por intervalo. Un ciclo fallido sólo se loguea
/// y el siguiente arranca desde las mismas marcas.
pub async fn run_scrape_loop(scraper: Scraper, state: AppState, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if let Err(e) = scraper.scrape_once(&state).await {
            warn!("error en ciclo de scrape: {}", e);
        }
    }
}
