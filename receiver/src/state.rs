// receiver/src/state.rs

use common::{JobId, JobWatermark, ScrapeReport};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

#[derive(Clone, Default)]
pub struct AppState {
    // último start_time de run completado visto por job
    pub watermarks: Arc<Mutex<HashMap<JobId, i64>>>,
    // resultado del último ciclo que terminó bien
    pub last_report: Arc<Mutex<Option<ScrapeReport>>>,
}

// Si un hilo entró en pánico con el lock tomado, los datos siguen siendo válidos
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 0 si nunca vimos runs completados de ese job.
    pub fn watermark(&self, job_id: JobId) -> i64 {
        lock(&self.watermarks).get(&job_id).copied().unwrap_or(0)
    }

    /// Reemplaza todas las marcas: un job que no viene en `marks` ya no
    /// existe en el workspace.
    pub fn commit_watermarks(&self, marks: HashMap<JobId, i64>) {
        *lock(&self.watermarks) = marks;
    }

    pub fn watermark_list(&self) -> Vec<JobWatermark> {
        let mut out: Vec<JobWatermark> = lock(&self.watermarks)
            .iter()
            .map(|(job_id, start_time)| JobWatermark {
                job_id: *job_id,
                start_time: *start_time,
            })
            .collect();
        out.sort_by_key(|w| w.job_id);
        out
    }

    pub fn set_report(&self, report: ScrapeReport) {
        *lock(&self.last_report) = Some(report);
    }

    pub fn report(&self) -> Option<ScrapeReport> {
        lock(&self.last_report).clone()
    }
}
