use serde::{Deserialize, Serialize};

pub type JobId = i64;
pub type RunId = i64;

/// Job definido en el workspace (sólo lectura, se lista en cada ciclo).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,

    #[serde(default)]
    pub creator_user_name: Option<String>,

    /// Epoch en milisegundos
    #[serde(default)]
    pub created_time: i64,

    #[serde(default)]
    pub settings: JobSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSettings {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub schedule: Option<JobSchedule>,

    /// Sólo viene cuando se pide con expand_tasks=true
    #[serde(default)]
    pub tasks: Vec<JobTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSchedule {
    #[serde(default)]
    pub quartz_cron_expression: String,

    /// "PAUSED" o "UNPAUSED"
    #[serde(default)]
    pub pause_status: String,
}

impl JobSchedule {
    pub fn is_paused(&self) -> bool {
        self.pause_status == "PAUSED"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTask {
    pub task_key: String,
}

/// Una ejecución concreta de un job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRun {
    pub job_id: JobId,
    pub run_id: RunId,

    /// Epoch en milisegundos. Las páginas de runs completados vienen
    /// ordenadas de la más nueva a la más vieja.
    #[serde(default)]
    pub start_time: i64,

    #[serde(default)]
    pub end_time: i64,

    /// Duración en milisegundos
    #[serde(default)]
    pub execution_duration: i64,

    #[serde(default)]
    pub state: RunState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    #[serde(default)]
    pub life_cycle_state: String,

    #[serde(default)]
    pub result_state: Option<String>,
}

/* --------- Sobres paginados de la API (has_more) --------- */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobsPage {
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunsPage {
    #[serde(default)]
    pub runs: Vec<JobRun>,
    #[serde(default)]
    pub has_more: bool,
}
