use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use common::{JobWatermark, ScrapeReport};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/metrics", get(last_report))
        .route("/api/v1/watermarks", get(list_watermarks))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// Último ciclo que terminó bien; 503 hasta que haya uno
async fn last_report(State(state): State<AppState>) -> Result<Json<ScrapeReport>, StatusCode> {
    state
        .report()
        .map(Json)
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)
}

async fn list_watermarks(State(state): State<AppState>) -> Json<Vec<JobWatermark>> {
    Json(state.watermark_list())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::Utc;
    use common::DataPoint;
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_responde_ok() {
        let resp = build_router(AppState::new())
            .oneshot(get_req("/health"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_503_antes_del_primer_scrape() {
        let state = AppState::new();
        let router = build_router(state.clone());

        let resp = router.clone().oneshot(get_req("/api/v1/metrics")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.set_report(ScrapeReport {
            scraped_at: Utc::now(),
            data_points: vec![DataPoint::new("databricks.jobs.total", 3.0, Utc::now())],
        });

        let resp = router.oneshot(get_req("/api/v1/metrics")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let report: ScrapeReport = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.data_points[0].value, 3.0);
    }

    #[tokio::test]
    async fn watermarks_como_lista() {
        let state = AppState::new();
        state.commit_watermarks(HashMap::from([(2, 20), (1, 10)]));

        let resp = build_router(state)
            .oneshot(get_req("/api/v1/watermarks"))
            .await
            .unwrap();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let marks: Vec<JobWatermark> = serde_json::from_slice(&body).unwrap();

        assert_eq!(marks[0], JobWatermark { job_id: 1, start_time: 10 });
        assert_eq!(marks.len(), 2);
    }
}
