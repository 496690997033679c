/// CLI configuration
use crate::error::{CliError, Result};
use ohako_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "ohako.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,
}

impl ServerSettings {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.url.clone()).with_timeouts(
            Duration::from_secs(self.timeout_secs),
            Duration::from_secs(self.connect_timeout_secs),
        )
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
        }
    }
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// `path` must exist when given; otherwise `ohako.toml` in the working
    /// directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (e.g. OHAKO_SERVER__URL)
        settings = settings.add_source(
            config::Environment::with_prefix("OHAKO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            return Err(CliError::Config(
                "Server URL is required (set OHAKO_SERVER__URL)".to_string(),
            ));
        }

        if self.server.timeout_secs == 0 || self.server.connect_timeout_secs == 0 {
            return Err(CliError::Config(
                "Timeouts must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        url: default_url(),
        timeout_secs: default_timeout_secs(),
        connect_timeout_secs: default_connect_timeout_secs(),
    }
}

fn default_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        session_dir: default_session_dir(),
    }
}

fn default_session_dir() -> PathBuf {
    PathBuf::from("./.ohako")
}
