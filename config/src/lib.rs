//! Configuration for hackatime-lsp.
//!
//! Two sources are read, never written:
//!
//! - **`HackatimeConfig`**: optional server settings in `~/.hackatime-lsp/config.toml`
//! - **`WakatimeSettings`**: API key and URL from the user's `~/.wakatime.cfg`
//!
//! ```toml
//! plugin = "Zed"
//!
//! [delivery]
//! cli_path = "/usr/local/bin/wakatime-cli"
//! timeout_secs = 10
//!
//! [heartbeat]
//! debounce_ms = 50
//! batch_delay_secs = 120
//! max_queue_len = 100
//!
//! [audit]
//! enabled = true
//! path = "/home/me/hackatime-zed.log"
//! ```

mod wakatime;

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use wakatime::{WakatimeSettings, config_file_path, log_file_path, lookup};

// `[audit]` without `enabled` keeps the audit log on.
const fn default_true() -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct HackatimeConfig {
    /// Plugin name reported with every heartbeat.
    pub plugin: Option<String>,
    pub delivery: Option<DeliveryConfig>,
    pub heartbeat: Option<HeartbeatConfig>,
    pub audit: Option<AuditConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeliveryConfig {
    /// Path or bare name of the `wakatime-cli` executable.
    pub cli_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HeartbeatConfig {
    pub debounce_ms: Option<u64>,
    pub batch_delay_secs: Option<u64>,
    pub max_queue_len: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl HackatimeConfig {
    /// Load from the default location. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from an explicit path. A missing file is `Ok(None)`.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }
}

/// Directory holding the server's own config and logs: `~/.hackatime-lsp`.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".hackatime-lsp"))
}

/// Default audit log location: `~/hackatime-zed.log`.
#[must_use]
pub fn default_audit_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("hackatime-zed.log"))
}

fn config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}
