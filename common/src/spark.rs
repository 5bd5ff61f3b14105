//! Registros de la API REST de Spark (camelCase en el JSON).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

pub type AppId = String;

/// Aplicación de Spark corriendo en un cluster.
///
/// Igualdad y hash se calculan sólo con `id`: dos lecturas de la misma app
/// en momentos distintos siguen siendo la misma clave en los mapas por app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: AppId,

    #[serde(default)]
    pub name: String,
}

impl PartialEq for Application {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Application {}

impl Hash for Application {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorInfo {
    /// "driver" o el número del executor
    pub id: String,
    #[serde(default)]
    pub host_port: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub memory_used: i64,
    #[serde(default)]
    pub disk_used: i64,
    #[serde(default)]
    pub total_cores: i64,
    #[serde(default)]
    pub total_input_bytes: i64,
    #[serde(default)]
    pub total_shuffle_read: i64,
    #[serde(default)]
    pub total_shuffle_write: i64,
    #[serde(default)]
    pub max_memory: i64,
}

/// Job de Spark (no confundir con un job del workspace).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub job_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub num_tasks: i64,
    #[serde(default)]
    pub num_active_tasks: i64,
    #[serde(default)]
    pub num_completed_tasks: i64,
    #[serde(default)]
    pub num_skipped_tasks: i64,
    #[serde(default)]
    pub num_failed_tasks: i64,
    #[serde(default)]
    pub num_active_stages: i64,
    #[serde(default)]
    pub num_completed_stages: i64,
    #[serde(default)]
    pub num_skipped_stages: i64,
    #[serde(default)]
    pub num_failed_stages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageInfo {
    pub stage_id: i64,
    #[serde(default)]
    pub attempt_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub executor_run_time: i64,
    #[serde(default)]
    pub input_bytes: i64,
    #[serde(default)]
    pub input_records: i64,
    #[serde(default)]
    pub output_bytes: i64,
    #[serde(default)]
    pub output_records: i64,
    #[serde(default)]
    pub memory_bytes_spilled: i64,
    #[serde(default)]
    pub disk_bytes_spilled: i64,
}

/* --------- /metrics/json (formato Dropwizard) --------- */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterMetrics {
    #[serde(default)]
    pub gauges: BTreeMap<String, Gauge>,
    #[serde(default)]
    pub counters: BTreeMap<String, Counter>,
    #[serde(default)]
    pub histograms: BTreeMap<String, Histogram>,
}

/// Algunos gauges de Spark no son numéricos, por eso el valor queda crudo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gauge {
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Histogram {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub p50: f64,
    #[serde(default)]
    pub p95: f64,
    #[serde(default)]
    pub p99: f64,
}
