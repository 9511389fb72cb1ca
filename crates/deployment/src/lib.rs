//! The seam HTTP handlers depend on: everything a running server needs,
//! behind one cloneable handle.

use async_trait::async_trait;
use db::DBService;
use services::services::{
    assist::{AssistError, AssistService},
    config::{Config, ConfigError},
};
use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Sqlx(#[from] SqlxError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Assist(#[from] AssistError),
}

#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    /// Build from the process environment, opening and migrating the
    /// database.
    async fn new() -> Result<Self, DeploymentError>;

    fn config(&self) -> &Config;

    fn db(&self) -> &DBService;

    fn assist(&self) -> &AssistService;
}
