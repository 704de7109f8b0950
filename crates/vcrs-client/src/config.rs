//! Client configuration.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Client configuration loaded from environment variables.
///
/// Environment variables are prefixed with `VCRS_`:
/// - `VCRS_API_BASE_URL`: Complaint service base URL
/// - `VCRS_SESSION_FILE`: Session file path (default: `~/.vcrs/session.yaml`)
/// - `VCRS_TIMEOUT_SECS`: Request timeout in seconds (default: none)
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Complaint service base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Session file path
    #[serde(default)]
    pub session_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_api_base_url() -> String {
    "https://vcrs-api.onrender.com/api".to_string()
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        let config = envy::prefixed("VCRS_").from_env::<ClientConfig>()?;
        Ok(config.normalized())
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self.normalized()
    }

    pub fn with_session_file(mut self, path: PathBuf) -> Self {
        self.session_file = Some(path);
        self
    }

    /// Request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Resolve the session file, falling back to `~/.vcrs/session.yaml`.
    pub fn session_path(&self) -> ClientResult<PathBuf> {
        if let Some(path) = &self.session_file {
            return Ok(path.clone());
        }
        let home = dirs::home_dir()
            .ok_or_else(|| ClientError::Config("Could not find home directory".to_string()))?;
        Ok(home.join(".vcrs").join("session.yaml"))
    }

    fn normalized(mut self) -> Self {
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_file: None,
            timeout_secs: None,
        }
    }
}
