use crate::paths::AppDirs;
use crate::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_EXECUTE_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_PORT,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            remote: RemoteConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where the painter control server lives and how long to wait on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_execute_timeout_secs")]
    pub execute_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout_secs(),
            execute_timeout_secs: default_execute_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn execute_timeout(&self) -> Duration {
        Duration::from_secs(self.execute_timeout_secs)
    }

    /// Applies command-line overrides; explicit values win over the file.
    pub fn with_overrides(mut self, host: Option<&str>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host.to_string();
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::EmptyHost);
        }
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.connect_timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout {
                field: "connect_timeout_secs",
            });
        }
        if self.execute_timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout {
                field: "execute_timeout_secs",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
    /// Mirror log lines to stderr in addition to the rolling file.
    #[serde(default)]
    pub stderr: bool,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_log_files: default_max_log_files(),
            stderr: false,
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config validation failed: {0}")]
    Validation(ValidationError),
    #[error("failed to prepare configuration directories: {0}")]
    Directories(#[from] crate::paths::DirsError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unsupported config_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("remote.host must not be empty")]
    EmptyHost,
    #[error("remote.port must be between 1 and 65535")]
    InvalidPort,
    #[error("remote.{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

impl Config {
    pub fn load_or_default(dirs: &AppDirs) -> Result<Self, ConfigError> {
        dirs.ensure_exists()?;
        let path = Self::config_path(dirs);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn config_path(dirs: &AppDirs) -> PathBuf {
        dirs.config_file()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config_version != CURRENT_CONFIG_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.config_version,
                expected: CURRENT_CONFIG_VERSION,
            });
        }
        self.remote.validate()
    }
}

fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_execute_timeout_secs() -> u64 {
    DEFAULT_EXECUTE_TIMEOUT_SECS
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_max_log_files() -> usize {
    7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.remote.host, "localhost");
        assert_eq!(config.remote.port, 60041);
        assert_eq!(config.remote.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.remote.execute_timeout(), Duration::from_secs(3600));
        assert_eq!(config.logging.max_log_files, 7);
        assert!(!config.logging.stderr);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn invalid_version_rejected() {
        let mut config = Config::default();
        config.config_version = CURRENT_CONFIG_VERSION + 1;
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn remote_validation_rejects_bad_endpoint() {
        let mut remote = RemoteConfig::default();
        remote.port = 0;
        assert!(matches!(remote.validate(), Err(ValidationError::InvalidPort)));

        let mut remote = RemoteConfig::default();
        remote.host = "  ".into();
        assert!(matches!(remote.validate(), Err(ValidationError::EmptyHost)));

        let mut remote = RemoteConfig::default();
        remote.execute_timeout_secs = 0;
        assert!(matches!(
            remote.validate(),
            Err(ValidationError::ZeroTimeout {
                field: "execute_timeout_secs"
            })
        ));
    }

    #[test]
    fn overrides_take_precedence() {
        let remote = RemoteConfig::default().with_overrides(Some("10.0.0.5"), Some(6000));
        assert_eq!(remote.host, "10.0.0.5");
        assert_eq!(remote.port, 6000);

        let untouched = RemoteConfig::default().with_overrides(None, None);
        assert_eq!(untouched, RemoteConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dirs = AppDirs::rooted_at(tmp.path());
        dirs.ensure_exists().expect("dirs");
        fs::write(
            Config::config_path(&dirs),
            "[remote]\nport = 61000\n\n[logging]\nlevel = \"debug\"\n",
        )
        .expect("write config");

        let config = Config::load_or_default(&dirs).expect("config should load");
        assert_eq!(config.remote.port, 61000);
        assert_eq!(config.remote.host, "localhost");
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dirs = AppDirs::rooted_at(tmp.path());
        let config = Config::load_or_default(&dirs).expect("defaults");
        assert_eq!(config.remote, RemoteConfig::default());
    }

    #[test]
    fn malformed_file_reports_path() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dirs = AppDirs::rooted_at(tmp.path());
        dirs.ensure_exists().expect("dirs");
        fs::write(Config::config_path(&dirs), "remote = 5").expect("write config");

        let err = Config::load_or_default(&dirs).expect_err("parse should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
