//! Typed configuration models.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};

/// How strictly a playlist link is checked before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkPolicy {
    /// Any well-formed absolute URL is accepted.
    #[default]
    AnyUrl,
    /// The link must start with `https://open.spotify.com/`.
    Spotify,
}

impl LinkPolicy {
    /// Stable string form used in configuration values.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AnyUrl => "any-url",
            Self::Spotify => "spotify",
        }
    }
}

impl fmt::Display for LinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any-url" | "any" | "url" => Ok(Self::AnyUrl),
            "spotify" | "strict" => Ok(Self::Spotify),
            other => Err(format!("unknown link policy '{other}'")),
        }
    }
}

/// Spotify application settings used by the auth widget and token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct SpotifyConfig {
    /// Application client id.
    pub client_id: String,
    /// Application client secret. When absent the token request carries no
    /// client credentials and `token_url` must point at a trusted proxy.
    pub client_secret: Option<String>,
    /// Redirect URI registered with the application.
    pub redirect_uri: Url,
    /// Scopes requested during authorization.
    pub scopes: Vec<String>,
    /// Authorization endpoint.
    pub authorize_url: Url,
    /// Token endpoint (or proxy).
    pub token_url: Url,
    /// Current-user profile endpoint.
    pub profile_url: Url,
    /// Logout page opened when the user logs out.
    pub logout_url: Url,
}

impl SpotifyConfig {
    /// Build settings for `client_id` with every endpoint at its default.
    ///
    /// # Errors
    ///
    /// Returns an error when `client_id` is blank.
    pub fn with_defaults(client_id: impl Into<String>) -> ConfigResult<Self> {
        let client_id = client_id.into();
        if client_id.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: crate::env_keys::SPOTIFY_CLIENT_ID,
            });
        }
        Ok(Self {
            client_id: client_id.trim().to_string(),
            client_secret: None,
            redirect_uri: default_url(defaults::REDIRECT_URI)?,
            scopes: defaults::SPOTIFY_SCOPES
                .iter()
                .map(|scope| (*scope).to_string())
                .collect(),
            authorize_url: default_url(defaults::SPOTIFY_AUTHORIZE_URL)?,
            token_url: default_url(defaults::SPOTIFY_TOKEN_URL)?,
            profile_url: default_url(defaults::SPOTIFY_PROFILE_URL)?,
            logout_url: default_url(defaults::SPOTIFY_LOGOUT_URL)?,
        })
    }

    /// Whether the token exchange authenticates with client credentials.
    #[must_use]
    pub const fn has_client_secret(&self) -> bool {
        self.client_secret.is_some()
    }

    /// Redirect URI as sent to Spotify.
    ///
    /// `Url` normalises a bare origin to `http://host/`; Spotify compares redirect
    /// URIs byte for byte, so a root path is sent without its trailing slash.
    #[must_use]
    pub fn redirect_uri_param(&self) -> &str {
        let raw = self.redirect_uri.as_str();
        if self.redirect_uri.path() == "/"
            && self.redirect_uri.query().is_none()
            && self.redirect_uri.fragment().is_none()
        {
            raw.trim_end_matches('/')
        } else {
            raw
        }
    }
}

impl fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("scopes", &self.scopes)
            .field("authorize_url", &self.authorize_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("profile_url", &self.profile_url.as_str())
            .field("logout_url", &self.logout_url.as_str())
            .finish()
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Optimization backend base URL.
    pub backend_url: Url,
    /// Spotify settings; `None` disables login and playlist write-back.
    pub spotify: Option<SpotifyConfig>,
    /// Playlist link validation policy.
    pub link_policy: LinkPolicy,
    /// Timeout applied to every HTTP request.
    pub http_timeout: Duration,
    /// Period of the loading status phrase rotation.
    pub status_interval: Duration,
}

impl ClientConfig {
    /// Access the Spotify settings, failing when none were configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the client id variable.
    pub fn require_spotify(&self) -> ConfigResult<&SpotifyConfig> {
        self.spotify.as_ref().ok_or(ConfigError::Missing {
            key: crate::env_keys::SPOTIFY_CLIENT_ID,
        })
    }

    /// Configuration pointing at `backend_url` with every other value at its default.
    #[must_use]
    pub fn new(backend_url: Url) -> Self {
        Self {
            backend_url,
            spotify: None,
            link_policy: LinkPolicy::default(),
            http_timeout: Duration::from_secs(defaults::HTTP_TIMEOUT_SECS),
            status_interval: Duration::from_millis(defaults::STATUS_INTERVAL_MS),
        }
    }
}

fn default_url(value: &'static str) -> ConfigResult<Url> {
    Url::parse(value).map_err(|err| ConfigError::invalid("default", value, err.to_string()))
}
