use axum::{Router, extract::State, response::Json, routing::get};
use chrono::{DateTime, Utc};
use deployment::Deployment;
use serde::Serialize;
use utils::build_info::BUILD_INFO;

use crate::DeploymentImpl;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub git_commit: &'static str,
    pub build_timestamp: &'static str,
    pub database_ready: bool,
}

/// Liveness probe. Always `200`; `database_ready` reports pool health.
pub async fn health_check(State(deployment): State<DeploymentImpl>) -> Json<HealthResponse> {
    let database_ready = deployment.db().is_ready().await;
    if !database_ready {
        tracing::warn!("Health check: database not ready");
    }

    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
        version: BUILD_INFO.version,
        git_commit: BUILD_INFO.git_commit,
        build_timestamp: BUILD_INFO.build_timestamp,
        database_ready,
    })
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new().route("/health", get(health_check))
}
