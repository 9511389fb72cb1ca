use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use db::{FieldError, ValidationErrors};
use services::services::assist::AssistError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Assist(#[from] AssistError),
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error(transparent)]
    Path(#[from] PathRejection),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("Too many requests, please try again later.")]
    TooManyRequests,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(sqlx::Error::RowNotFound) | ApiError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Assist(err) => match err {
                AssistError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                AssistError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                AssistError::Unauthorized => StatusCode::UNAUTHORIZED,
                AssistError::Forbidden => StatusCode::FORBIDDEN,
                AssistError::Upstream { .. } | AssistError::EmptyReply | AssistError::Http(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            ApiError::Json(JsonRejection::MissingJsonContentType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            ApiError::Json(_) | ApiError::Path(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn message(&self) -> String {
        match self {
            // The first field message reads like the old single-error API.
            ApiError::Validation(errors) => errors
                .errors()
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Validation failed".to_string()),
            ApiError::Database(sqlx::Error::RowNotFound) => "Not found".to_string(),
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "Internal server error".to_string()
            }
            ApiError::Assist(AssistError::Http(e)) => {
                tracing::error!(error = %e, "AI service request failed");
                if e.is_timeout() {
                    "AI service timed out".to_string()
                } else {
                    "AI service request failed".to_string()
                }
            }
            ApiError::Assist(e @ AssistError::Upstream { .. }) => {
                tracing::warn!(error = %e, "AI service error");
                "AI service error".to_string()
            }
            ApiError::Json(rejection) => rejection.body_text(),
            ApiError::Path(rejection) => rejection.body_text(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let message = self.message();

        match self {
            ApiError::Validation(errors) => {
                let response =
                    ApiResponse::<(), Vec<FieldError>>::error_with_data(&message, errors.0);
                (status_code, ResponseJson(response)).into_response()
            }
            _ => {
                let response = ApiResponse::<()>::error(&message);
                (status_code, ResponseJson(response)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ValidationErrors::single("name", "Board name is required"))
                .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Assist(AssistError::NotConfigured).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Assist(AssistError::from_status(403, "")).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Assist(AssistError::from_status(500, "boom")).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_validation_message_and_data() {
        let err = ApiError::from(ValidationErrors(vec![
            FieldError {
                field: "name".to_string(),
                message: "Column name is required".to_string(),
            },
            FieldError {
                field: "color".to_string(),
                message: "Invalid color format".to_string(),
            },
        ]));
        assert_eq!(err.message(), "Column name is required");
    }

    #[test]
    fn test_database_details_are_hidden() {
        let err = ApiError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.message(), "Internal server error");
    }
}
