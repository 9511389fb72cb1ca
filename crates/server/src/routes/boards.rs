use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use axum_extra::extract::WithRejection;
use db::models::board::{Board, BoardWithColumns, CreateBoard, UpdateBoard};
use deployment::Deployment;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, middleware::load_board_middleware};

/// GET /api/boards - All boards, newest first
pub async fn get_boards(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Board>>>, ApiError> {
    let boards = Board::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(boards)))
}

/// GET /api/boards/{id} - Board with its columns and their tasks
pub async fn get_board(
    Extension(board): Extension<Board>,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<BoardWithColumns>>, ApiError> {
    // The board may be deleted between the loader and this read.
    let board = Board::find_with_columns(&deployment.db().pool, board.id)
        .await?
        .ok_or(ApiError::NotFound("Board not found"))?;
    Ok(ResponseJson(ApiResponse::success(board)))
}

pub async fn create_board(
    State(deployment): State<DeploymentImpl>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateBoard>, ApiError>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Board>>), ApiError> {
    let payload = payload.validate()?;
    let board = Board::create(&deployment.db().pool, &payload, Uuid::new_v4()).await?;

    tracing::info!(board_id = %board.id, name = %board.name, "Created board");
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(board))))
}

pub async fn update_board(
    Extension(board): Extension<Board>,
    State(deployment): State<DeploymentImpl>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateBoard>, ApiError>,
) -> Result<ResponseJson<ApiResponse<Board>>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    let payload = payload.validate()?;
    let board = Board::update(&deployment.db().pool, board.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(board)))
}

pub async fn delete_board(
    Extension(board): Extension<Board>,
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Board::delete(&deployment.db().pool, board.id).await?;
    if rows_affected == 0 {
        return Err(ApiError::Database(sqlx::Error::RowNotFound));
    }

    tracing::info!(board_id = %board.id, "Deleted board");
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Board deleted successfully",
    )))
}

pub fn router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let board_router = Router::new()
        .route("/", get(get_board).put(update_board).delete(delete_board))
        .layer(from_fn_with_state(
            deployment.clone(),
            load_board_middleware,
        ));

    let inner = Router::new()
        .route("/", get(get_boards).post(create_board))
        .nest("/{board_id}", board_router);

    Router::new().nest("/boards", inner)
}
