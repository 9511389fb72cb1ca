use axum::{Json, Router, extract::State, response::Json as ResponseJson, routing::post};
use axum_extra::extract::WithRejection;
use deployment::Deployment;
use services::services::assist::{GenerateRequest, GenerateResponse};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

/// POST /api/ai/generate - Board, task or free-text suggestions
pub async fn generate(
    State(deployment): State<DeploymentImpl>,
    WithRejection(Json(payload), _): WithRejection<Json<GenerateRequest>, ApiError>,
) -> Result<ResponseJson<ApiResponse<GenerateResponse>>, ApiError> {
    let payload = payload.validate()?;
    let response = deployment.assist().generate(&payload).await?;

    tracing::debug!(kind = ?payload.kind, source = ?response.source, "Generated suggestion");
    Ok(ResponseJson(ApiResponse::success(response)))
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new().route("/ai/generate", post(generate))
}
