use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::job::JobId;

/// Una medición con nombre, timestamp y dimensiones que la identifican
/// (cluster.id, spark.app.id, job.id, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub name: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub attributes: BTreeMap<String, String>,
}

impl DataPoint {
    pub fn new(name: &str, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            value,
            timestamp,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Resultado del último ciclo de scrape que terminó bien.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub scraped_at: DateTime<Utc>,
    pub data_points: Vec<DataPoint>,
}

/// Último start_time de run completado visto para un job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobWatermark {
    pub job_id: JobId,
    pub start_time: i64,
}
