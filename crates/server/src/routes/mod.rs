use std::any::Any;

use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use deployment::Deployment;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    middleware::{RateLimiter, rate_limit_middleware},
};

pub mod assist;
pub mod boards;
pub mod columns;
pub mod health;
pub mod tasks;

/// Full application router with a limiter built from the deployment config.
pub fn router(deployment: DeploymentImpl) -> Router {
    let limiter = RateLimiter::new(&deployment.config().rate_limit);
    router_with_limiter(deployment, limiter)
}

/// Like [`router`], sharing a limiter the caller also prunes.
pub fn router_with_limiter(deployment: DeploymentImpl, limiter: RateLimiter) -> Router {
    let cors = cors_layer(&deployment.config().server.frontend_url);

    let api_routes = Router::new()
        .merge(health::router())
        .merge(boards::router(&deployment))
        .merge(columns::router(&deployment))
        .merge(tasks::router(&deployment))
        .merge(assist::router())
        .fallback(route_not_found)
        .layer(from_fn_with_state(limiter, rate_limit_middleware))
        .with_state(deployment);

    Router::new()
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::RETRY_AFTER]);

    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(frontend_url, error = %e, "Invalid CORS origin, cross-origin requests disabled");
            layer
        }
    }
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found")
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ResponseJson(ApiResponse::<()>::error("Internal server error")),
    )
        .into_response()
}
