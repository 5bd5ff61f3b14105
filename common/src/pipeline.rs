use serde::{Deserialize, Serialize};

use crate::cluster::ClusterId;

pub type PipelineId = String;

pub const PIPELINE_RUNNING: &str = "RUNNING";

/// Resumen que devuelve el listado /api/2.0/pipelines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub pipeline_id: PipelineId,

    #[serde(default)]
    pub name: String,

    pub state: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineList {
    #[serde(default)]
    pub statuses: Vec<PipelineStatus>,
}

/// Detalle de /api/2.0/pipelines/{id}; sólo nos interesa el cluster dueño.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDetail {
    pub pipeline_id: PipelineId,

    #[serde(default)]
    pub cluster_id: ClusterId,

    #[serde(default)]
    pub state: String,
}

/// Pipeline en ejecución ya resuelto contra su cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub id: PipelineId,
    pub name: String,
    pub cluster_id: ClusterId,
}
