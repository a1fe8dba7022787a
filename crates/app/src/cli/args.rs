use std::path::PathBuf;

use clap::Parser;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "sealpost")]
#[command(about = "Encrypt text and images locally and post them to Celestia")]
#[command(version)]
pub struct Args {
    /// Twinkle API (or relay) URL, overrides the configured one
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the sealpost config directory (defaults to ~/.sealpost)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// API key sent as a bearer token, overrides the configured one
    #[arg(long, global = true, env = "SEALPOST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Encrypt and decrypt with this passphrase instead of the device key
    #[arg(long, global = true, env = "SEALPOST_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: crate::Command,
}
