//! Health check backed by a real query against the task store

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use log::warn;
use serde::Serialize;
use std::sync::Arc;

use crate::core::shared::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub database: bool,
    /// Stored task count; absent when the store could not be queried.
    pub tasks: Option<i64>,
}

impl HealthReport {
    fn from_count(count: Option<i64>) -> Self {
        Self {
            status: if count.is_some() { "healthy" } else { "degraded" },
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            database: count.is_some(),
            tasks: count,
        }
    }

    fn status_code(&self) -> StatusCode {
        if self.database {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let count = match state.task_engine.count_tasks().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("[HEALTH] Task store unavailable: {}", e);
            None
        }
    };

    let report = HealthReport::from_count(count);
    (report.status_code(), Json(report))
}
