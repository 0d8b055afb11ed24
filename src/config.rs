use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{FileCredentialStore, ReqwestTransport, SessionClient};

pub const CONFIG_ENV: &str = "RECEIPT_CLIENT_CONFIG";
pub const API_BASE_ENV: &str = "RECEIPT_API_BASE";

/// Client settings from config.yaml
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Where the CLI keeps session cookies between runs
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

fn default_api_base() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_secs: default_timeout(),
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Load a config from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .context(format!("Failed to read config: {:?}", path.as_ref()))?;
        let config: ClientConfig =
            serde_yaml::from_str(&content).context("Failed to parse config YAML")?;
        Ok(config)
    }

    /// `$RECEIPT_CLIENT_CONFIG`, then the user config dir, then defaults.
    /// `$RECEIPT_API_BASE` overrides the API base in every case.
    pub fn discover() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::load(path)?,
                None => Self::default(),
            },
        };

        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                config.api_base = base;
            }
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_path(&self) -> PathBuf {
        self.session_file
            .clone()
            .or_else(|| config_dir().map(|d| d.join("session.json")))
            .unwrap_or_else(|| PathBuf::from(".receipt-session.json"))
    }

    /// Session client over reqwest with a file-backed credential store
    pub fn build_client(&self) -> Result<SessionClient> {
        let transport = ReqwestTransport::new(self.request_timeout())
            .context("Failed to build HTTP client")?;
        let credentials = FileCredentialStore::open(self.session_path());
        Ok(SessionClient::new(
            self.api_base.clone(),
            Arc::new(transport),
            Arc::new(credentials),
        ))
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("receipt-client"))
}

fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.yaml"))
}
