use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{assist::AssistService, config::Config};

#[derive(Clone)]
pub struct LocalDeployment {
    config: Arc<Config>,
    db: DBService,
    assist: AssistService,
}

impl LocalDeployment {
    /// Assemble from already-built parts, e.g. a test pool and a stub
    /// generator.
    pub fn from_parts(config: Config, db: DBService, assist: AssistService) -> Self {
        Self {
            config: Arc::new(config),
            db,
            assist,
        }
    }
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new() -> Result<Self, DeploymentError> {
        let config = Config::from_env()?;
        let db = DBService::new().await?;
        let assist = AssistService::new(&config.assist)?;

        tracing::info!(
            assist_configured = assist.is_configured(),
            model = %config.assist.model,
            "Deployment initialized"
        );

        Ok(Self::from_parts(config, db, assist))
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn assist(&self) -> &AssistService {
        &self.assist
    }
}
