//! Optimization backend gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use audify_api_models::{
    CompareRequest, CompareResponse, OptimizeRequest, OptimizeResponse, ReorderAck,
    ReorderRequest,
};
use audify_config::ClientConfig;

use crate::cancel::CancelHandle;
use crate::classify::{decode_json, send};
use crate::error::{GatewayError, GatewayResult};

const OPTIMIZE_PATH: &str = "optimize_playlist";
const REORDER_PATH: &str = "reorder_playlist";
const COMPARE_PATH: &str = "compare_playlists";

/// Operations offered by the optimization backend.
#[async_trait]
pub trait PlaylistBackend: Send + Sync {
    /// Request an optimized ordering for `playlist_link`.
    async fn optimize_playlist(
        &self,
        playlist_link: &str,
        cancel: &CancelHandle,
    ) -> GatewayResult<OptimizeResponse>;

    /// Write `ordered_uris` back to the playlist, authorized by `access_token`.
    ///
    /// Returns the backend's acknowledgement message.
    async fn reorder_playlist(
        &self,
        playlist_id: &str,
        ordered_uris: &[String],
        access_token: &str,
    ) -> GatewayResult<String>;

    /// Score the similarity of two playlists.
    async fn compare_playlists(
        &self,
        first_link: &str,
        second_link: &str,
        cancel: &CancelHandle,
    ) -> GatewayResult<CompareResponse>;
}

/// `reqwest` implementation of [`PlaylistBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Build a backend client for `base_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayError::Network {
                endpoint: base_url.to_string(),
                message: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self::with_client(client, base_url))
    }

    /// Build a backend client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn from_config(config: &ClientConfig) -> GatewayResult<Self> {
        Self::new(config.backend_url.clone(), config.http_timeout)
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| GatewayError::InvalidUrl {
                endpoint: path.to_string(),
                message: err.to_string(),
            })
    }
}

#[async_trait]
impl PlaylistBackend for HttpBackend {
    async fn optimize_playlist(
        &self,
        playlist_link: &str,
        cancel: &CancelHandle,
    ) -> GatewayResult<OptimizeResponse> {
        let url = self.endpoint(OPTIMIZE_PATH)?;
        let body = OptimizeRequest {
            playlist_link: playlist_link.to_string(),
        };
        let outcome = cancel
            .run(async {
                let response = send(OPTIMIZE_PATH, self.client.post(url).json(&body)).await?;
                decode_json::<OptimizeResponse>(OPTIMIZE_PATH, response).await
            })
            .await;
        match &outcome {
            Ok(response) => debug!(
                tracks = response.optimal_playlist.len(),
                "optimize request settled"
            ),
            Err(GatewayError::Cancelled) => debug!("optimize request cancelled"),
            Err(err) => warn!(error = %err, "optimize request failed"),
        }
        outcome
    }

    async fn reorder_playlist(
        &self,
        playlist_id: &str,
        ordered_uris: &[String],
        access_token: &str,
    ) -> GatewayResult<String> {
        let url = self.endpoint(REORDER_PATH)?;
        let body = ReorderRequest {
            playlist_id: playlist_id.to_string(),
            new_uris: ordered_uris.to_vec(),
        };
        let request = self.client.post(url).bearer_auth(access_token).json(&body);
        let response = send(REORDER_PATH, request).await?;
        let ack = decode_json::<ReorderAck>(REORDER_PATH, response).await?;
        ack.into_result().map_err(|message| {
            warn!(playlist_id, error = %message, "reorder rejected by backend");
            GatewayError::Rejected {
                endpoint: REORDER_PATH.to_string(),
                message,
            }
        })
    }

    async fn compare_playlists(
        &self,
        first_link: &str,
        second_link: &str,
        cancel: &CancelHandle,
    ) -> GatewayResult<CompareResponse> {
        let url = self.endpoint(COMPARE_PATH)?;
        let body = CompareRequest {
            playlist1_link: first_link.to_string(),
            playlist2_link: second_link.to_string(),
        };
        cancel
            .run(async {
                let response = send(COMPARE_PATH, self.client.post(url).json(&body)).await?;
                decode_json::<CompareResponse>(COMPARE_PATH, response).await
            })
            .await
    }
}
