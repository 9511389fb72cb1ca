//! Middleware that resolves `{id}` path segments into models.
//!
//! Each loader inserts the model as a request extension, so handlers take
//! `Extension<Board>` (or column/task) and never see a missing row.

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::WithRejection;
use db::models::{board::Board, column::Column, task::Task};
use deployment::Deployment;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

pub async fn load_board_middleware(
    State(deployment): State<DeploymentImpl>,
    WithRejection(Path(board_id), _): WithRejection<Path<Uuid>, ApiError>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let board = Board::find_by_id(&deployment.db().pool, board_id)
        .await?
        .ok_or_else(|| {
            tracing::debug!(%board_id, "Board not found");
            ApiError::NotFound("Board not found")
        })?;

    request.extensions_mut().insert(board);
    Ok(next.run(request).await)
}

pub async fn load_column_middleware(
    State(deployment): State<DeploymentImpl>,
    WithRejection(Path(column_id), _): WithRejection<Path<Uuid>, ApiError>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let column = Column::find_by_id(&deployment.db().pool, column_id)
        .await?
        .ok_or_else(|| {
            tracing::debug!(%column_id, "Column not found");
            ApiError::NotFound("Column not found")
        })?;

    request.extensions_mut().insert(column);
    Ok(next.run(request).await)
}

pub async fn load_task_middleware(
    State(deployment): State<DeploymentImpl>,
    WithRejection(Path(task_id), _): WithRejection<Path<Uuid>, ApiError>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let task = Task::find_by_id(&deployment.db().pool, task_id)
        .await?
        .ok_or_else(|| {
            tracing::debug!(%task_id, "Task not found");
            ApiError::NotFound("Task not found")
        })?;

    request.extensions_mut().insert(task);
    Ok(next.run(request).await)
}
