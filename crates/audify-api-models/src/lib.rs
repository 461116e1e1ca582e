#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
//! Shared HTTP DTOs for the Audify optimization backend and the Spotify Web API.
//!
//! Field names mirror the wire format exactly (`snake_case` on the backend,
//! Spotify's own names on the accounts/profile endpoints) so the gateway can
//! encode and decode without per-call mapping.

use serde::{Deserialize, Serialize};

/// Body of `POST /optimize_playlist`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptimizeRequest {
    /// Playlist link exactly as submitted by the user.
    pub playlist_link: String,
}

/// Response of `POST /optimize_playlist`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OptimizeResponse {
    /// Tracks in the optimized order.
    pub optimal_playlist: Vec<OptimizedTrack>,
}

/// One entry of the optimized ordering returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizedTrack {
    /// 1-based sequence index assigned by the backend.
    pub position: u32,
    /// Track title.
    pub track_name: String,
    /// Primary artist name.
    pub artist: String,
    /// Album title.
    pub album_name: String,
    /// Album cover URL; the backend sends `null` when the album has no images.
    #[serde(default)]
    pub album_cover: Option<String>,
    /// Tempo in beats per minute.
    pub tempo: f64,
    /// Spotify popularity score (0-100).
    pub popularity: u32,
    /// Danceability score when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danceability: Option<f64>,
    /// Spotify track URI used when writing the order back.
    pub uri: String,
}

/// Body of `POST /reorder_playlist`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorderRequest {
    /// Target playlist identifier.
    pub playlist_id: String,
    /// Track URIs in the desired order.
    pub new_uris: Vec<String>,
}

/// Acknowledgement returned by `POST /reorder_playlist`.
///
/// The backend answers `200 OK` for both outcomes and distinguishes them by
/// which field is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ReorderAck {
    /// Success message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure detail reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReorderAck {
    /// Collapse the acknowledgement into a success message or a failure detail.
    ///
    /// # Errors
    ///
    /// Returns the backend's error detail when one is present.
    pub fn into_result(self) -> Result<String, String> {
        match (self.error, self.message) {
            (Some(error), _) => Err(error),
            (None, Some(message)) => Ok(message),
            (None, None) => Ok(String::new()),
        }
    }
}

/// Body of `POST /compare_playlists`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompareRequest {
    /// First playlist link.
    pub playlist1_link: String,
    /// Second playlist link.
    pub playlist2_link: String,
}

/// Response of `POST /compare_playlists`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CompareResponse {
    /// Similarity between the two playlists, 0-100.
    pub similarity_percentage: f64,
}

/// Error body the backend emits on rejected requests (`{"error": "..."}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BackendProblem {
    /// Human-readable failure detail.
    #[serde(default)]
    pub error: Option<String>,
}

/// Spotify accounts token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    /// Bearer token for Web API calls.
    pub access_token: String,
    /// Refresh token; Spotify omits it on some grant types.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Space-separated scopes granted.
    #[serde(default)]
    pub scope: Option<String>,
}

/// Access/refresh token pair kept by the client after a code exchange.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct TokenPair {
    /// Bearer token.
    pub access_token: String,
    /// Refresh token, empty when none was issued.
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

impl From<TokenResponse> for TokenPair {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.unwrap_or_default(),
        }
    }
}

/// Subset of Spotify's `GET /v1/me` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SpotifyProfile {
    /// Display name chosen by the user.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Profile images, largest first.
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

/// Image reference in Spotify payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpotifyImage {
    /// Image URL.
    pub url: String,
    /// Height in pixels when known.
    #[serde(default)]
    pub height: Option<u32>,
    /// Width in pixels when known.
    #[serde(default)]
    pub width: Option<u32>,
}

/// Profile details shown next to the login control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserProfile {
    /// Display name, if the account has one.
    pub display_name: Option<String>,
    /// Avatar URL, if the account has a profile image.
    pub image_url: Option<String>,
}

impl From<SpotifyProfile> for UserProfile {
    fn from(profile: SpotifyProfile) -> Self {
        Self {
            display_name: profile.display_name.filter(|name| !name.trim().is_empty()),
            image_url: profile.images.into_iter().next().map(|image| image.url),
        }
    }
}
