use serde::{Deserialize, Serialize};

pub type ClusterId = String;

/// Valor exacto (case-sensitive) que usa la API para un cluster encendido.
pub const CLUSTER_RUNNING: &str = "RUNNING";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: ClusterId,

    #[serde(default)]
    pub cluster_name: String,

    /// PENDING, RUNNING, RESTARTING, RESIZING, TERMINATING, TERMINATED, ...
    pub state: String,
}

impl Cluster {
    pub fn is_running(&self) -> bool {
        self.state == CLUSTER_RUNNING
    }
}

/// Respuesta de /api/2.0/clusters/list (sin paginar).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterList {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}
