use std::{net::SocketAddr, time::Duration};

use deployment::{Deployment, DeploymentError};
use server::{DeploymentImpl, file_logging, middleware::RateLimiter, routes};
use thiserror::Error;

/// How often idle rate-limit state is dropped.
const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum TilesError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Deployment(#[from] DeploymentError),
}

#[tokio::main]
async fn main() -> Result<(), TilesError> {
    dotenvy::dotenv().ok();

    // Held for the life of the process so file logs are flushed.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _file_log_guard = file_logging::init_logging(&log_level);

    let deployment = DeploymentImpl::new().await?;

    let limiter = RateLimiter::new(&deployment.config().rate_limit);
    spawn_limiter_pruning(limiter.clone());

    let app_router = routes::router_with_limiter(deployment.clone(), limiter);

    let server_config = &deployment.config().server;
    let listener =
        tokio::net::TcpListener::bind((server_config.host.as_str(), server_config.port)).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(
        frontend_url = %server_config.frontend_url,
        "Server running on http://{local_addr}"
    );

    axum::serve(
        listener,
        app_router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutting down");
    deployment.db().shutdown().await;

    Ok(())
}

fn spawn_limiter_pruning(limiter: RateLimiter) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            limiter.prune();
            tracing::trace!(clients = limiter.tracked_clients(), "Pruned rate limiter");
        }
    });
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let terminate = async {
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
            } else {
                tracing::error!("Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}
