pub mod config;
pub mod logging;
pub mod paths;

pub use config::{Config, ConfigError, LogLevel, LoggingConfig, RemoteConfig, ValidationError};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use paths::{AppDirs, DirsError};

pub const APP_NAME: &str = "painter-remote";
pub const APP_AUTHOR: &str = "PainterRemote";
pub const APP_QUALIFIER: &str = "io";

/// Host the painter control server listens on unless configured otherwise.
pub const DEFAULT_HOST: &str = "localhost";
/// Port of the painter remote-scripting server.
pub const DEFAULT_PORT: u16 = 60041;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Scripts may drive long-running operations inside the host.
pub const DEFAULT_EXECUTE_TIMEOUT_SECS: u64 = 3600;
