use std::{fs, path::Path, path::PathBuf};

use common::crypto::DeviceKey;
use common::namespace::{Namespace, NamespaceError};
use common::transport::{DEFAULT_API_URL, DEFAULT_NETWORK};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub const APP_NAME: &str = "sealpost";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "history.sqlite";
pub const KEY_FILE_NAME: &str = "device.key";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Twinkle API, or of a relay that adds the API key
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    /// Celestia network to post to
    #[serde(default = "default_network")]
    pub network: String,
    /// Namespace identifier, at most 10 bytes
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Bearer token for the API (optional when posting through a relay)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Who our history records belong to
    #[serde(default = "Uuid::new_v4")]
    pub owner_id: Uuid,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("hardcoded URL must parse")
}

fn default_network() -> String {
    DEFAULT_NETWORK.to_string()
}

fn default_namespace() -> String {
    APP_NAME.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            network: default_network(),
            namespace: default_namespace(),
            api_key: None,
            owner_id: Uuid::new_v4(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AppConfig {
    pub fn namespace_tag(&self) -> Result<Namespace, NamespaceError> {
        Namespace::try_from_id(self.namespace.as_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the sealpost directory (~/.sealpost)
    pub sealpost_dir: PathBuf,
    /// Path to the SQLite history database
    pub db_path: PathBuf,
    /// Path to the hex encoded device key
    pub key_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the sealpost directory path (custom or default ~/.sealpost)
    pub fn sealpost_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new state directory with a fresh device key
    pub fn init(custom_path: Option<PathBuf>, config: AppConfig) -> Result<Self, StateError> {
        let sealpost_dir = Self::sealpost_dir(custom_path)?;

        if sealpost_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }
        config.namespace_tag()?;

        fs::create_dir_all(&sealpost_dir)?;

        let key = DeviceKey::generate().map_err(|e| StateError::InvalidKey(e.to_string()))?;
        let key_path = sealpost_dir.join(KEY_FILE_NAME);
        write_private(&key_path, &key.to_hex())?;

        let config_path = sealpost_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        write_private(&config_path, &config_toml)?;

        Ok(Self {
            db_path: sealpost_dir.join(DB_FILE_NAME),
            sealpost_dir,
            key_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the sealpost directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let sealpost_dir = Self::sealpost_dir(custom_path)?;

        if !sealpost_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = sealpost_dir.join(DB_FILE_NAME);
        let key_path = sealpost_dir.join(KEY_FILE_NAME);
        let config_path = sealpost_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }
        if !key_path.exists() {
            return Err(StateError::MissingFile(KEY_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;
        config.namespace_tag()?;

        Ok(Self {
            sealpost_dir,
            db_path,
            key_path,
            config_path,
            config,
        })
    }

    /// Load the device key from the key file
    pub fn load_device_key(&self) -> Result<DeviceKey, StateError> {
        let hex = fs::read_to_string(&self.key_path)?;
        DeviceKey::from_hex(&hex).map_err(|e| StateError::InvalidKey(e.to_string()))
    }

    pub fn namespace(&self) -> Result<Namespace, StateError> {
        Ok(self.config.namespace_tag()?)
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> Result<(), StateError> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> Result<(), StateError> {
    fs::write(path, contents)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("sealpost directory not initialized. Run 'sealpost init' first")]
    NotInitialized,

    #[error("sealpost directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid device key: {0}")]
    InvalidKey(String),

    #[error("invalid namespace in config: {0}")]
    InvalidNamespace(#[from] NamespaceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");

        let state = AppState::init(Some(path.clone()), AppConfig::default()).unwrap();
        assert!(state.key_path.exists());
        assert!(state.config_path.exists());

        let loaded = AppState::load(Some(path)).unwrap();
        assert_eq!(loaded.config, state.config);
        assert_eq!(loaded.config.network, "mocha-4");
        assert_eq!(loaded.config.namespace, "sealpost");
        assert_eq!(
            loaded.load_device_key().unwrap(),
            state.load_device_key().unwrap()
        );
    }

    #[test]
    fn test_init_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = Some(dir.path().to_path_buf());
        AppState::init(path.clone(), AppConfig::default()).unwrap();
        assert!(matches!(
            AppState::init(path, AppConfig::default()),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppState::load(Some(dir.path().join("missing"))),
            Err(StateError::NotInitialized)
        ));
        assert!(matches!(
            AppState::load(Some(dir.path().to_path_buf())),
            Err(StateError::MissingFile(_))
        ));
    }

    #[test]
    fn test_namespace_too_long_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            namespace: "much-too-long-namespace".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            AppState::init(Some(dir.path().to_path_buf()), config),
            Err(StateError::InvalidNamespace(_))
        ));
    }

    #[test]
    fn test_config_defaults_fill_in() {
        let config: AppConfig = toml::from_str("namespace = \"board\"\n").unwrap();
        assert_eq!(config.namespace, "board");
        assert_eq!(config.api_url.as_str(), "https://t.tech/");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.api_key.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let state = AppState::init(Some(dir.path().to_path_buf()), AppConfig::default()).unwrap();
        let mode = fs::metadata(&state.key_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
