use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use axum_extra::extract::WithRejection;
use db::{
    ValidationErrors,
    models::{
        column::Column,
        task::{CreateTask, MoveTask, Task, UpdateTask},
    },
};
use deployment::Deployment;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, middleware::load_task_middleware};

/// POST /api/tasks - Add a task to a column
pub async fn create_task(
    State(deployment): State<DeploymentImpl>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateTask>, ApiError>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Task>>), ApiError> {
    let payload = payload.validate()?;
    let pool = &deployment.db().pool;

    let column = Column::find_by_id(pool, payload.column_id)
        .await?
        .ok_or(ApiError::NotFound("Column not found"))?;
    if column.board_id != payload.board_id {
        return Err(ValidationErrors::single(
            "board_id",
            "Column does not belong to this board",
        )
        .into());
    }

    let task = Task::create(pool, &payload, Uuid::new_v4()).await?;
    tracing::info!(
        task_id = %task.id,
        column_id = %task.column_id,
        position = task.position,
        "Created task"
    );
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(task))))
}

pub async fn get_task(
    Extension(task): Extension<Task>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// PUT /api/tasks/{id} - Change title, description or story points
pub async fn update_task(
    Extension(task): Extension<Task>,
    State(deployment): State<DeploymentImpl>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateTask>, ApiError>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    let payload = payload.validate()?;
    let task = Task::update(&deployment.db().pool, task.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

/// PUT /api/tasks/{id}/move - Reparent and/or reorder a task
pub async fn move_task(
    Extension(task): Extension<Task>,
    State(deployment): State<DeploymentImpl>,
    WithRejection(Json(payload), _): WithRejection<Json<MoveTask>, ApiError>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let payload = payload.validate()?;
    let pool = &deployment.db().pool;

    if Column::find_by_id(pool, payload.column_id).await?.is_none() {
        return Err(ApiError::NotFound("Column not found"));
    }

    let moved = Task::move_to_column(pool, task.id, &payload).await?;
    tracing::debug!(
        task_id = %moved.id,
        from_column = %task.column_id,
        to_column = %moved.column_id,
        position = moved.position,
        "Moved task"
    );
    Ok(ResponseJson(ApiResponse::success(moved)))
}

pub async fn delete_task(
    Extension(task): Extension<Task>,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Task::delete(&deployment.db().pool, task.id).await?;
    if rows_affected == 0 {
        return Err(ApiError::Database(sqlx::Error::RowNotFound));
    }
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Task deleted successfully",
    )))
}

pub fn router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let task_router = Router::new()
        .route("/", get(get_task).put(update_task).delete(delete_task))
        .route("/move", put(move_task))
        .layer(from_fn_with_state(deployment.clone(), load_task_middleware));

    let inner = Router::new()
        .route("/", post(create_task))
        .nest("/{task_id}", task_router);

    Router::new().nest("/tasks", inner)
}
