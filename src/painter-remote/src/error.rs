use thiserror::Error;

pub type PainterResult<T> = Result<T, PainterError>;

#[derive(Debug, Error)]
pub enum PainterError {
    /// The painter endpoint could not be reached in time.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connection {
        host: String,
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The host ran the script and reported an error.
    #[error("an error occurred when executing script: {detail}")]
    ExecuteScript { detail: String },
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid painter endpoint {host}:{port}: {source}")]
    InvalidEndpoint {
        host: String,
        port: u16,
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
}

impl PainterError {
    /// True when the host itself rejected the script, as opposed to a
    /// transport or setup failure.
    pub fn is_execute_script(&self) -> bool {
        matches!(self, PainterError::ExecuteScript { .. })
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, PainterError::Connection { .. })
    }
}
