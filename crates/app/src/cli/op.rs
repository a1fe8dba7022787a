use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use common::crypto::{CipherError, Passphrase};
use common::pipeline::Pipeline;
use common::session::Session;
use common::transport::{TransportError, TwinkleClient};

use crate::database::{Database, DatabaseSetupError};
use crate::state::{AppState, StateError};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to create API client: {0}")]
    Client(#[from] TransportError),
    #[error("failed to open history database: {0}")]
    Database(#[from] DatabaseSetupError),
    #[error("invalid passphrase: {0}")]
    Passphrase(#[from] CipherError),
}

/// Everything an op may need, resolved lazily so `init` works before any
///  state exists
#[derive(Clone)]
pub struct OpContext {
    /// Explicit API URL, wins over the configured one
    pub remote: Option<Url>,
    /// Explicit API key, wins over the configured one
    pub api_key: Option<String>,
    /// Session passphrase; the device key is used when unset
    pub passphrase: Option<String>,
    /// Optional custom config path (defaults to ~/.sealpost)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    pub fn new(
        remote: Option<Url>,
        api_key: Option<String>,
        passphrase: Option<String>,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            remote,
            api_key,
            passphrase,
            config_path,
        }
    }

    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_path.clone())
    }

    /// Unlock key material: the passphrase if one was given, otherwise the
    ///  device key from the state directory
    pub fn session(&self, state: &AppState) -> Result<Session, ContextError> {
        match &self.passphrase {
            Some(passphrase) => Ok(Session::from_passphrase(
                Passphrase::new(passphrase.clone())?,
                None,
            )),
            None => Ok(Session::from_device_key(&state.load_device_key()?, None)),
        }
    }

    /// Resolve the API URL.
    ///
    /// Priority: explicit `--remote` flag > config file `api_url`.
    pub fn remote(&self, state: &AppState) -> Url {
        self.remote
            .clone()
            .unwrap_or_else(|| state.config.api_url.clone())
    }

    pub fn pipeline(&self, state: &AppState) -> Result<Pipeline<TwinkleClient>, ContextError> {
        let api_key = self.api_key.as_deref().or(state.config.api_key.as_deref());
        let client = TwinkleClient::new(
            &self.remote(state),
            api_key,
            Duration::from_secs(state.config.request_timeout_secs),
        )?;
        Ok(Pipeline::new(
            client,
            state.namespace()?,
            state.config.network.clone(),
        ))
    }

    pub async fn database(&self, state: &AppState) -> Result<Database, ContextError> {
        Ok(Database::connect(&state.db_path).await?)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
