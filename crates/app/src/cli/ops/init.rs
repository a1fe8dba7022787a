use clap::Args;
use url::Url;

use crate::cli::op::OpContext;
use crate::database::{Database, DatabaseSetupError};
use crate::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Twinkle API (or relay) URL
    #[arg(long)]
    pub api_url: Option<Url>,

    /// Celestia network to post to
    #[arg(long)]
    pub network: Option<String>,

    /// Namespace identifier (at most 10 bytes)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Persist the --api-key value into config.toml
    #[arg(long)]
    pub save_api_key: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to create history database: {0}")]
    Database(#[from] DatabaseSetupError),
    #[error("--save-api-key needs --api-key or SEALPOST_API_KEY")]
    NoApiKey,
}

impl Init {
    fn config(&self, ctx: &OpContext) -> Result<AppConfig, InitError> {
        let mut config = AppConfig::default();
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(network) = &self.network {
            config.network = network.clone();
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(timeout) = self.request_timeout_secs {
            config.request_timeout_secs = timeout;
        }
        if self.save_api_key {
            config.api_key = Some(ctx.api_key.clone().ok_or(InitError::NoApiKey)?);
        }
        Ok(config)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::init(ctx.config_path.clone(), self.config(ctx)?)?;
        Database::connect(&state.db_path).await?;
        tracing::info!(dir = %state.sealpost_dir.display(), "initialized state directory");

        Ok(format!(
            "Initialized sealpost in {}\n  api:       {}\n  network:   {}\n  namespace: {}\n  owner id:  {}",
            state.sealpost_dir.display(),
            state.config.api_url,
            state.config.network,
            state.config.namespace,
            state.config.owner_id,
        ))
    }
}
