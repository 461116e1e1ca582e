//! Environment-backed configuration loader.
//!
//! # Design
//! - Lookups go through an injectable function so tests never mutate the process environment.
//! - Blank values are treated as unset.
//! - Spotify settings exist only when a client id is configured.

use tracing::debug;

use crate::defaults;
use crate::error::ConfigResult;
use crate::model::{ClientConfig, SpotifyConfig};
use crate::validate::{parse_http_url, parse_link_policy, parse_millis, parse_seconds};

/// Environment variable names read by [`ConfigLoader`].
pub mod env_keys {
    /// Optimization backend base URL.
    pub const BACKEND_URL: &str = "AUDIFY_BACKEND_URL";
    /// Spotify application client id.
    pub const SPOTIFY_CLIENT_ID: &str = "AUDIFY_SPOTIFY_CLIENT_ID";
    /// Spotify application client secret.
    pub const SPOTIFY_CLIENT_SECRET: &str = "AUDIFY_SPOTIFY_CLIENT_SECRET";
    /// Redirect URI registered with the Spotify application.
    pub const SPOTIFY_REDIRECT_URI: &str = "AUDIFY_SPOTIFY_REDIRECT_URI";
    /// Spotify authorization endpoint override.
    pub const SPOTIFY_AUTHORIZE_URL: &str = "AUDIFY_SPOTIFY_AUTHORIZE_URL";
    /// Spotify token endpoint (or trusted proxy) override.
    pub const SPOTIFY_TOKEN_URL: &str = "AUDIFY_SPOTIFY_TOKEN_URL";
    /// Spotify profile endpoint override.
    pub const SPOTIFY_PROFILE_URL: &str = "AUDIFY_SPOTIFY_PROFILE_URL";
    /// Spotify logout page override.
    pub const SPOTIFY_LOGOUT_URL: &str = "AUDIFY_SPOTIFY_LOGOUT_URL";
    /// Playlist link validation policy.
    pub const LINK_POLICY: &str = "AUDIFY_LINK_POLICY";
    /// HTTP timeout in seconds.
    pub const HTTP_TIMEOUT_SECS: &str = "AUDIFY_HTTP_TIMEOUT_SECS";
    /// Status phrase rotation period in milliseconds.
    pub const STATUS_INTERVAL_MS: &str = "AUDIFY_STATUS_INTERVAL_MS";
}

/// Builds a [`ClientConfig`] from key/value lookups.
pub struct ConfigLoader<F> {
    lookup: F,
}

impl ConfigLoader<fn(&str) -> Option<String>> {
    /// Loader reading the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            lookup: read_process_env,
        }
    }
}

impl<F> ConfigLoader<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Loader reading values through `lookup`.
    pub const fn with_lookup(lookup: F) -> Self {
        Self { lookup }
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure encountered.
    pub fn load(&self) -> ConfigResult<ClientConfig> {
        let backend_url = parse_http_url(
            env_keys::BACKEND_URL,
            &self
                .value(env_keys::BACKEND_URL)
                .unwrap_or_else(|| defaults::BACKEND_URL.to_string()),
        )?;

        let mut config = ClientConfig::new(backend_url);

        if let Some(policy) = self.value(env_keys::LINK_POLICY) {
            config.link_policy = parse_link_policy(env_keys::LINK_POLICY, &policy)?;
        }
        if let Some(timeout) = self.value(env_keys::HTTP_TIMEOUT_SECS) {
            config.http_timeout = parse_seconds(env_keys::HTTP_TIMEOUT_SECS, &timeout)?;
        }
        if let Some(interval) = self.value(env_keys::STATUS_INTERVAL_MS) {
            config.status_interval = parse_millis(env_keys::STATUS_INTERVAL_MS, &interval)?;
        }

        config.spotify = self.load_spotify()?;
        debug!(
            backend_url = %config.backend_url,
            link_policy = %config.link_policy,
            spotify = config.spotify.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    fn load_spotify(&self) -> ConfigResult<Option<SpotifyConfig>> {
        let Some(client_id) = self.value(env_keys::SPOTIFY_CLIENT_ID) else {
            return Ok(None);
        };
        let mut spotify = SpotifyConfig::with_defaults(client_id)?;
        spotify.client_secret = self.value(env_keys::SPOTIFY_CLIENT_SECRET);

        if let Some(value) = self.value(env_keys::SPOTIFY_REDIRECT_URI) {
            spotify.redirect_uri = parse_http_url(env_keys::SPOTIFY_REDIRECT_URI, &value)?;
        }
        if let Some(value) = self.value(env_keys::SPOTIFY_AUTHORIZE_URL) {
            spotify.authorize_url = parse_http_url(env_keys::SPOTIFY_AUTHORIZE_URL, &value)?;
        }
        if let Some(value) = self.value(env_keys::SPOTIFY_TOKEN_URL) {
            spotify.token_url = parse_http_url(env_keys::SPOTIFY_TOKEN_URL, &value)?;
        }
        if let Some(value) = self.value(env_keys::SPOTIFY_PROFILE_URL) {
            spotify.profile_url = parse_http_url(env_keys::SPOTIFY_PROFILE_URL, &value)?;
        }
        if let Some(value) = self.value(env_keys::SPOTIFY_LOGOUT_URL) {
            spotify.logout_url = parse_http_url(env_keys::SPOTIFY_LOGOUT_URL, &value)?;
        }
        Ok(Some(spotify))
    }

    fn value(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

fn read_process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;
    use crate::error::ConfigError;
    use crate::model::LinkPolicy;

    fn loader(
        pairs: &[(&str, &str)],
    ) -> ConfigLoader<impl Fn(&str) -> Option<String>> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        ConfigLoader::with_lookup(move |key: &str| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = loader(&[]).load().expect("defaults should load");
        assert_eq!(config.backend_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.link_policy, LinkPolicy::AnyUrl);
        assert_eq!(config.http_timeout, Duration::from_secs(300));
        assert_eq!(config.status_interval, Duration::from_secs(1));
        assert!(config.spotify.is_none());
    }

    #[test]
    fn spotify_settings_follow_client_id() {
        let config = loader(&[
            (env_keys::SPOTIFY_CLIENT_ID, "abc"),
            (env_keys::SPOTIFY_CLIENT_SECRET, "shh"),
            (env_keys::SPOTIFY_REDIRECT_URI, "http://127.0.0.1:8888/callback"),
            (env_keys::SPOTIFY_TOKEN_URL, "https://proxy.example/token"),
        ])
        .load()
        .expect("spotify config should load");
        let spotify = config.spotify.expect("spotify settings present");
        assert_eq!(spotify.client_id, "abc");
        assert_eq!(spotify.client_secret.as_deref(), Some("shh"));
        assert_eq!(
            spotify.redirect_uri.as_str(),
            "http://127.0.0.1:8888/callback"
        );
        assert_eq!(spotify.token_url.as_str(), "https://proxy.example/token");
        assert_eq!(
            spotify.authorize_url.as_str(),
            "https://accounts.spotify.com/authorize"
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = loader(&[
            (env_keys::SPOTIFY_CLIENT_ID, "   "),
            (env_keys::BACKEND_URL, ""),
        ])
        .load()
        .expect("blank values should be ignored");
        assert!(config.spotify.is_none());
        assert_eq!(config.backend_url.as_str(), "http://localhost:5000/");
    }

    #[test]
    fn invalid_values_name_their_key() {
        let err = loader(&[(env_keys::LINK_POLICY, "loose")])
            .load()
            .expect_err("unknown policy should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidField { key, .. } if key == env_keys::LINK_POLICY
        ));

        let err = loader(&[(env_keys::STATUS_INTERVAL_MS, "0")])
            .load()
            .expect_err("zero interval should fail");
        assert!(matches!(
            err,
            ConfigError::InvalidField { key, .. } if key == env_keys::STATUS_INTERVAL_MS
        ));
    }

    #[test]
    fn strict_policy_and_custom_timings_are_honoured() {
        let config = loader(&[
            (env_keys::LINK_POLICY, "spotify"),
            (env_keys::HTTP_TIMEOUT_SECS, "45"),
            (env_keys::STATUS_INTERVAL_MS, "500"),
            (env_keys::BACKEND_URL, "https://audify.example"),
        ])
        .load()
        .expect("config should load");
        assert_eq!(config.link_policy, LinkPolicy::Spotify);
        assert_eq!(config.http_timeout, Duration::from_secs(45));
        assert_eq!(config.status_interval, Duration::from_millis(500));
        assert_eq!(config.backend_url.as_str(), "https://audify.example/");
    }
}
