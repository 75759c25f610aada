//! TOML configuration for the client.
//!
//! Read once at startup from:
//! - `$DOBOT_CLIENT_CONFIG`, when set
//! - Linux:   `$XDG_CONFIG_HOME/dobot-client/config.toml` or `~/.config/dobot-client/config.toml`
//! - Windows: `%APPDATA%\DobotClient\config.toml`
//! - macOS:   `~/Library/Application Support/DobotClient/config.toml`
//!
//! A missing file means "use defaults"; every field is optional:
//!
//! ```toml
//! [server]
//! host = "localhost"
//! port = 7000
//! connect_timeout_ms = 10000
//!
//! [client]
//! name = "DOBOT"
//! log_level = "info"
//!
//! [executor]
//! poll_interval_ms = 100
//! shutdown_grace_ms = 500
//!
//! [robot]
//! simulate = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "DOBOT_CLIENT_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: IdentityConfig,
    #[serde(default)]
    pub executor: ExecutorSettings,
    #[serde(default)]
    pub robot: RobotConfig,
}

/// Where the control server lives.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on the TCP connect, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// How the client presents itself and logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IdentityConfig {
    /// Sent as `client_name` in `CLIENT_IDENTIFY_REQ`.
    #[serde(default = "default_client_name")]
    pub name: String,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Executor and teardown timing.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ExecutorSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

/// Robot capability selection.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RobotConfig {
    /// Use the in-process simulated actuator and sensor.
    #[serde(default)]
    pub simulate: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    7000
}
fn default_connect_timeout_ms() -> u64 {
    10_000
}
fn default_client_name() -> String {
    "DOBOT".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_shutdown_grace_ms() -> u64 {
    500
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: default_client_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl ServerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl ExecutorSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves the config file path, or `None` if no location can be derived
/// from the environment.
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    platform_config_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the configuration from the resolved path, or defaults if there is
/// no path or no file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    match config_file_path() {
        Some(path) => load_config_from(&path),
        None => Ok(ClientConfig::default()),
    }
}

/// Loads the configuration from `path`, returning defaults if it does not
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("DobotClient"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("dobot-client"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("DobotClient")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
