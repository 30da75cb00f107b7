use crate::error::{PainterError, PainterResult};
use crate::payload::{ScriptKind, ScriptPayload};
use crate::response::{interpret_response, ExecutionResult};
use async_trait::async_trait;
use painter_core::{
    RemoteConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_EXECUTE_TIMEOUT_SECS, DEFAULT_HOST,
    DEFAULT_PORT,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONNECTION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tokio::net::TcpStream;
use url::Url;

/// Route the painter server runs scripts on.
pub const PAINTER_ROUTE: &str = "/run.json";

/// Address of a painter control server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self) -> Result<Url, url::ParseError> {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        Url::parse(&format!("http://{host}:{}", self.port))?.join(PAINTER_ROUTE)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

/// Runs scripts inside a painter process.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Verifies the endpoint accepts connections.
    async fn check_connection(&self) -> PainterResult<bool>;

    async fn execute_script(&self, script: &str, kind: ScriptKind)
        -> PainterResult<ExecutionResult>;
}

/// HTTP client for the painter remote-scripting server.
///
/// Holds only the endpoint and immutable settings. Every call opens its own
/// connection and closes it before returning, whatever the outcome. Separate
/// instances may be used from separate tasks freely; keep a single instance
/// to one call in flight at a time.
#[derive(Debug, Clone)]
pub struct RemotePainter {
    endpoint: Endpoint,
    url: Url,
    client: Client,
    connect_timeout: Duration,
    execute_timeout: Duration,
}

impl RemotePainter {
    pub fn new(host: impl Into<String>, port: u16) -> PainterResult<Self> {
        Self::with_timeouts(
            Endpoint::new(host, port),
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_EXECUTE_TIMEOUT_SECS),
        )
    }

    /// `localhost:60041`.
    pub fn local() -> PainterResult<Self> {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }

    pub fn from_config(config: &RemoteConfig) -> PainterResult<Self> {
        Self::with_timeouts(
            Endpoint::new(config.host.clone(), config.port),
            config.connect_timeout(),
            config.execute_timeout(),
        )
    }

    pub fn with_timeouts(
        endpoint: Endpoint,
        connect_timeout: Duration,
        execute_timeout: Duration,
    ) -> PainterResult<Self> {
        let url = endpoint
            .url()
            .map_err(|source| PainterError::InvalidEndpoint {
                host: endpoint.host.clone(),
                port: endpoint.port,
                source,
            })?;
        let client = Client::builder()
            .default_headers(default_headers())
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(0)
            // always dial the endpoint itself, never an HTTP_PROXY
            .no_proxy()
            .build()
            .map_err(PainterError::ClientBuild)?;
        Ok(Self {
            endpoint,
            url,
            client,
            connect_timeout,
            execute_timeout,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Opens a TCP connection to the endpoint and closes it again.
    pub async fn check_connection(&self) -> PainterResult<bool> {
        let host = self.endpoint.host();
        let port = self.endpoint.port();
        tracing::debug!(host, port, "checking painter connection");

        let connect = TcpStream::connect((host, port));
        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(stream)) => {
                drop(stream);
                Ok(true)
            }
            Ok(Err(source)) => Err(self.connection_error(Box::new(source))),
            Err(elapsed) => Err(self.connection_error(Box::new(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                elapsed,
            )))),
        }
    }

    /// Sends `script` to the host and waits for it to finish running.
    pub async fn execute_script(
        &self,
        script: &str,
        kind: ScriptKind,
    ) -> PainterResult<ExecutionResult> {
        let body = ScriptPayload::new(script, kind).to_bytes()?;
        tracing::debug!(kind = %kind, bytes = body.len(), "executing script");
        self.post_and_parse(body, kind).await
    }

    async fn post_and_parse(
        &self,
        body: Vec<u8>,
        kind: ScriptKind,
    ) -> PainterResult<ExecutionResult> {
        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.execute_timeout)
            .body(body.clone())
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        let data = response.bytes().await.map_err(|e| self.request_error(e))?;

        interpret_response(&data, &body, kind)
    }

    fn connection_error(&self, source: Box<dyn std::error::Error + Send + Sync>) -> PainterError {
        PainterError::Connection {
            host: self.endpoint.host.clone(),
            port: self.endpoint.port,
            source,
        }
    }

    /// Connect failures, including connect-phase timeouts, mean the endpoint
    /// was never reached. A timeout after the request went out is a transport
    /// failure of an open connection.
    fn request_error(&self, err: reqwest::Error) -> PainterError {
        if err.is_connect() {
            self.connection_error(Box::new(err))
        } else {
            PainterError::Transport {
                url: self.url.to_string(),
                source: err,
            }
        }
    }
}

#[async_trait]
impl ScriptExecutor for RemotePainter {
    async fn check_connection(&self) -> PainterResult<bool> {
        RemotePainter::check_connection(self).await
    }

    async fn execute_script(
        &self,
        script: &str,
        kind: ScriptKind,
    ) -> PainterResult<ExecutionResult> {
        RemotePainter::execute_script(self, script, kind).await
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONNECTION, HeaderValue::from_static("close"));
    headers
}
