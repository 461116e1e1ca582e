//! Shared client utilities, error types, and telemetry wiring for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::anyhow;
use audify_client::{HEADER_REQUEST_ID, HttpBackend, SpotifyClient};
use audify_config::{ClientConfig, ConfigLoader, SpotifyConfig};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::cli::{Cli, OutputFormat};

const TELEMETRY_ENDPOINT_ENV: &str = "AUDIFY_TELEMETRY_ENDPOINT";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) config: ClientConfig,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Load configuration from the environment, apply flag overrides, and
    /// build an HTTP client tagged with `trace_id`.
    pub(crate) fn from_cli(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let mut config = ConfigLoader::from_env()
            .load()
            .map_err(|err| CliError::validation(err.to_string()))?;
        if let Some(url) = &cli.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(seconds) = cli.timeout {
            if seconds == 0 {
                return Err(CliError::validation("--timeout must be a positive number of seconds"));
            }
            config.http_timeout = Duration::from_secs(seconds);
        }
        let client = build_client(config.http_timeout, trace_id)?;
        Ok(Self {
            client,
            config,
            output: cli.output,
        })
    }

    /// Optimization backend sharing this context's HTTP client.
    pub(crate) fn backend(&self) -> HttpBackend {
        HttpBackend::with_client(self.client.clone(), self.config.backend_url.clone())
    }

    /// Spotify settings, or a validation error naming the missing variable.
    pub(crate) fn spotify_settings(&self) -> CliResult<&SpotifyConfig> {
        self.config
            .require_spotify()
            .map_err(|err| CliError::validation(format!("Spotify login is not configured: {err}")))
    }

    /// Spotify accounts client sharing this context's HTTP client.
    pub(crate) fn spotify(&self) -> CliResult<SpotifyClient> {
        let settings = self.spotify_settings()?.clone();
        Ok(SpotifyClient::with_client(self.client.clone(), settings))
    }
}

/// HTTP client that stamps every request with the invocation's trace id.
pub(crate) fn build_client(timeout: Duration, trace_id: &str) -> CliResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(trace_id)
        .map_err(|_| CliError::failure(anyhow!("trace identifier contains invalid characters")))?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);

    Client::builder()
        .timeout(timeout)
        .default_headers(default_headers)
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))
}

/// Telemetry emitter used to forward CLI outcomes.
#[derive(Clone)]
pub(crate) struct TelemetryEmitter {
    pub(crate) client: Client,
    pub(crate) endpoint: Url,
}

impl TelemetryEmitter {
    #[must_use]
    pub(crate) fn from_env() -> Option<Self> {
        let endpoint = std::env::var(TELEMETRY_ENDPOINT_ENV).ok()?;
        let endpoint = endpoint.parse().ok()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .ok()?;
        Some(Self { client, endpoint })
    }

    pub(crate) async fn emit(
        &self,
        trace_id: &str,
        command: &str,
        outcome: &str,
        exit_code: i32,
        message: Option<&str>,
    ) {
        let event = TelemetryEvent {
            command,
            outcome,
            trace_id,
            exit_code,
            message,
            timestamp_ms: timestamp_now_ms(),
        };

        if let Err(err) = self
            .client
            .post(self.endpoint.clone())
            .json(&event)
            .send()
            .await
        {
            tracing::debug!(error = %err, "telemetry emit failed");
        }
    }
}

#[derive(Serialize)]
struct TelemetryEvent<'a> {
    command: &'a str,
    outcome: &'a str,
    trace_id: &'a str,
    exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    timestamp_ms: u64,
}

/// Parse a URL argument.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// Millisecond timestamp helper for telemetry.
#[must_use]
pub(crate) fn timestamp_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
