//! Convierte los agregados en mediciones con nombre y dimensiones.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use common::spark::ClusterMetrics;
use common::{DataPoint, Job, JobRun, PipelineSummary};

use crate::spark_service::SparkClusterDetail;

pub const ATTR_CLUSTER_ID: &str = "cluster.id";
pub const ATTR_JOB_ID: &str = "job.id";
pub const ATTR_APP_ID: &str = "spark.app.id";

/// Acumula los data points de un ciclo, todos con el mismo timestamp.
pub struct MetricsBuilder {
    now: DateTime<Utc>,
    points: Vec<DataPoint>,
}

impl MetricsBuilder {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            points: Vec::new(),
        }
    }

    fn point(&self, name: &str, value: f64) -> DataPoint {
        DataPoint::new(name, value, self.now)
    }

    pub fn record_jobs(&mut self, jobs: &[Job]) {
        self.points
            .push(self.point("databricks.jobs.total", jobs.len() as f64));

        for job in jobs {
            let job_id = job.job_id.to_string();

            if let Some(schedule) = &job.settings.schedule {
                let status = if schedule.is_paused() { 0.0 } else { 1.0 };
                self.points.push(
                    self.point("databricks.jobs.schedule.status", status)
                        .with_attr(ATTR_JOB_ID, job_id.clone()),
                );
            }

            self.points.push(
                self.point("databricks.tasks.total", job.settings.tasks.len() as f64)
                    .with_attr(ATTR_JOB_ID, job_id),
            );
        }
    }

    pub fn record_active_runs(&mut self, runs: &[JobRun]) {
        self.points
            .push(self.point("databricks.jobs.active.total", runs.len() as f64));
    }

    /// Sólo los runs que el llamador ya filtró como nuevos.
    pub fn record_run_durations(&mut self, runs: &[JobRun]) {
        for run in runs {
            self.points.push(
                self.point("databricks.jobs.run.duration", run.execution_duration as f64)
                    .with_attr(ATTR_JOB_ID, run.job_id.to_string()),
            );
        }
    }

    pub fn record_pipelines(&mut self, pipelines: &[PipelineSummary]) {
        for p in pipelines {
            self.points.push(
                self.point("databricks.pipelines.running", 1.0)
                    .with_attr("pipeline.id", p.id.clone())
                    .with_attr("pipeline.name", p.name.clone())
                    .with_attr(ATTR_CLUSTER_ID, p.cluster_id.clone()),
            );
        }
    }

    pub fn record_core_metrics(&mut self, metrics: &BTreeMap<String, ClusterMetrics>) {
        for (cluster_id, m) in metrics {
            let tagged = |p: DataPoint, metric: &str| {
                p.with_attr(ATTR_CLUSTER_ID, cluster_id.clone())
                    .with_attr("metric", metric)
            };

            for (name, gauge) in &m.gauges {
                // gauges de texto se ignoran
                if let Some(v) = gauge.value.as_f64() {
                    self.points
                        .push(tagged(self.point("databricks.spark.gauge", v), name.as_str()));
                }
            }

            for (name, counter) in &m.counters {
                self.points.push(tagged(
                    self.point("databricks.spark.counter", counter.count as f64),
                    name.as_str(),
                ));
            }

            for (name, h) in &m.histograms {
                let fields = [
                    ("count", h.count as f64),
                    ("max", h.max),
                    ("mean", h.mean),
                    ("min", h.min),
                    ("p50", h.p50),
                    ("p95", h.p95),
                    ("p99", h.p99),
                ];
                for (suffix, v) in fields {
                    let metric_name = format!("databricks.spark.histogram.{suffix}");
                    self.points
                        .push(tagged(self.point(&metric_name, v), name.as_str()));
                }
            }
        }
    }

    pub fn record_spark_detail(&mut self, cluster_id: &str, detail: &SparkClusterDetail) {
        for (app, executors) in &detail.executors {
            for e in executors {
                let values = [
                    ("memory_used", e.memory_used),
                    ("disk_used", e.disk_used),
                    ("total_input_bytes", e.total_input_bytes),
                    ("total_shuffle_read", e.total_shuffle_read),
                    ("total_shuffle_write", e.total_shuffle_write),
                    ("max_memory", e.max_memory),
                ];
                for (field, v) in values {
                    self.points.push(
                        self.point(&format!("databricks.spark.executor.{field}"), v as f64)
                            .with_attr(ATTR_CLUSTER_ID, cluster_id)
                            .with_attr(ATTR_APP_ID, app.id.clone())
                            .with_attr("spark.executor.id", e.id.clone()),
                    );
                }
            }
        }

        for (app, jobs) in &detail.jobs {
            for j in jobs {
                let values = [
                    ("num_tasks", j.num_tasks),
                    ("num_active_tasks", j.num_active_tasks),
                    ("num_completed_tasks", j.num_completed_tasks),
                    ("num_skipped_tasks", j.num_skipped_tasks),
                    ("num_failed_tasks", j.num_failed_tasks),
                    ("num_active_stages", j.num_active_stages),
                    ("num_completed_stages", j.num_completed_stages),
                    ("num_skipped_stages", j.num_skipped_stages),
                    ("num_failed_stages", j.num_failed_stages),
                ];
                for (field, v) in values {
                    self.points.push(
                        self.point(&format!("databricks.spark.job.{field}"), v as f64)
                            .with_attr(ATTR_CLUSTER_ID, cluster_id)
                            .with_attr(ATTR_APP_ID, app.id.clone())
                            .with_attr("spark.job.id", j.job_id.to_string()),
                    );
                }
            }
        }

        for (app, stages) in &detail.stages {
            for s in stages {
                let values = [
                    ("executor_run_time", s.executor_run_time),
                    ("input_bytes", s.input_bytes),
                    ("input_records", s.input_records),
                    ("output_bytes", s.output_bytes),
                    ("output_records", s.output_records),
                    ("memory_bytes_spilled", s.memory_bytes_spilled),
                    ("disk_bytes_spilled", s.disk_bytes_spilled),
                ];
                for (field, v) in values {
                    self.points.push(
                        self.point(&format!("databricks.spark.stage.{field}"), v as f64)
                            .with_attr(ATTR_CLUSTER_ID, cluster_id)
                            .with_attr(ATTR_APP_ID, app.id.clone())
                            .with_attr("spark.stage.id", s.stage_id.to_string()),
                    );
                }
            }
        }
    }

    pub fn finish(self) -> Vec<DataPoint> {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::spark::{Application, ExecutorInfo};
    use serde_json::json;
    use std::collections::HashMap;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn jobs_total_y_schedule() {
        let jobs: Vec<Job> = serde_json::from_value(json!([
            {"job_id": 1, "settings": {"schedule": {"pause_status": "PAUSED"}, "tasks": [{"task_key": "t"}]}},
            {"job_id": 2}
        ]))
        .unwrap();

        let mut b = MetricsBuilder::new(now());
        b.record_jobs(&jobs);
        let points = b.finish();

        assert_eq!(points[0].name, "databricks.jobs.total");
        assert_eq!(points[0].value, 2.0);
        let sched: Vec<&DataPoint> = points
            .iter()
            .filter(|p| p.name == "databricks.jobs.schedule.status")
            .collect();
        assert_eq!(sched.len(), 1);
        assert_eq!(sched[0].value, 0.0);
        assert_eq!(sched[0].attr(ATTR_JOB_ID), Some("1"));
        assert!(points.iter().all(|p| p.timestamp == now()));
    }

    #[test]
    fn executors_llevan_cluster_app_y_executor() {
        let exec: ExecutorInfo =
            serde_json::from_value(json!({"id": "driver", "memoryUsed": 64, "maxMemory": 128})).unwrap();
        let detail = SparkClusterDetail {
            executors: HashMap::from([(
                Application { id: "app-9".into(), name: String::new() },
                vec![exec],
            )]),
            ..Default::default()
        };

        let mut b = MetricsBuilder::new(now());
        b.record_spark_detail("c1", &detail);
        let points = b.finish();

        assert_eq!(points.len(), 6);
        let mem = points
            .iter()
            .find(|p| p.name == "databricks.spark.executor.memory_used")
            .unwrap();
        assert_eq!(mem.value, 64.0);
        assert_eq!(mem.attr(ATTR_CLUSTER_ID), Some("c1"));
        assert_eq!(mem.attr(ATTR_APP_ID), Some("app-9"));
        assert_eq!(mem.attr("spark.executor.id"), Some("driver"));
    }

    #[test]
    fn core_metrics_ignora_gauges_de_texto() {
        let m: ClusterMetrics = serde_json::from_value(json!({
            "gauges": {"a": {"value": 3}, "b": {"value": "texto"}},
            "counters": {"c": {"count": 5}}
        }))
        .unwrap();

        let mut b = MetricsBuilder::new(now());
        b.record_core_metrics(&BTreeMap::from([("c1".to_string(), m)]));
        let points = b.finish();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "databricks.spark.gauge");
        assert_eq!(points[0].attr("metric"), Some("a"));
        assert_eq!(points[1].name, "databricks.spark.counter");
        assert_eq!(points[1].value, 5.0);
    }
}
