use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{post, put},
};
use axum_extra::extract::WithRejection;
use db::models::{
    board::Board,
    column::{Column, CreateColumn, UpdateColumn},
};
use deployment::Deployment;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, middleware::load_column_middleware};

/// POST /api/columns - Append (or place) a column on a board
pub async fn create_column(
    State(deployment): State<DeploymentImpl>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateColumn>, ApiError>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Column>>), ApiError> {
    let payload = payload.validate()?;
    let pool = &deployment.db().pool;

    if Board::find_by_id(pool, payload.board_id).await?.is_none() {
        return Err(ApiError::NotFound("Board not found"));
    }

    let column = Column::create(pool, &payload, Uuid::new_v4()).await?;
    tracing::info!(
        column_id = %column.id,
        board_id = %column.board_id,
        position = column.position,
        "Created column"
    );
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(column))))
}

pub async fn update_column(
    Extension(column): Extension<Column>,
    State(deployment): State<DeploymentImpl>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateColumn>, ApiError>,
) -> Result<ResponseJson<ApiResponse<Column>>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    let payload = payload.validate()?;
    let column = Column::update(&deployment.db().pool, column.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(column)))
}

/// DELETE /api/columns/{id} - Removes the column and its tasks
pub async fn delete_column(
    Extension(column): Extension<Column>,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Column::delete(&deployment.db().pool, column.id).await?;
    if rows_affected == 0 {
        return Err(ApiError::Database(sqlx::Error::RowNotFound));
    }

    tracing::info!(column_id = %column.id, board_id = %column.board_id, "Deleted column");
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Column deleted successfully",
    )))
}

pub fn router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let column_router = Router::new()
        .route("/", put(update_column).delete(delete_column))
        .layer(from_fn_with_state(
            deployment.clone(),
            load_column_middleware,
        ));

    let inner = Router::new()
        .route("/", post(create_column))
        .nest("/{column_id}", column_router);

    Router::new().nest("/columns", inner)
}
