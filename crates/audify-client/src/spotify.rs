//! Spotify accounts and profile gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use audify_api_models::{SpotifyProfile, TokenPair, TokenResponse, UserProfile};
use audify_config::SpotifyConfig;

use crate::classify::{decode_json, send};
use crate::error::{GatewayError, GatewayResult};

const TOKEN_ENDPOINT: &str = "spotify token";
const PROFILE_ENDPOINT: &str = "spotify profile";

/// Operations against Spotify's accounts service.
#[async_trait]
pub trait SpotifyAccounts: Send + Sync {
    /// Exchange an authorization code for an access/refresh token pair.
    async fn exchange_code(&self, auth_code: &str) -> GatewayResult<TokenPair>;

    /// Fetch the profile of the user owning `access_token`.
    async fn user_profile(&self, access_token: &str) -> GatewayResult<UserProfile>;
}

/// `reqwest` implementation of [`SpotifyAccounts`].
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client: Client,
    settings: SpotifyConfig,
}

impl SpotifyClient {
    /// Build a client for `settings` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(settings: SpotifyConfig, timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayError::Network {
                endpoint: settings.token_url.to_string(),
                message: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self::with_client(client, settings))
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: Client, settings: SpotifyConfig) -> Self {
        Self { client, settings }
    }

    /// Settings this client was built with.
    #[must_use]
    pub const fn settings(&self) -> &SpotifyConfig {
        &self.settings
    }
}

/// Form fields of the authorization-code token request.
///
/// Without a client secret the client id travels in the form so a token
/// proxy can identify the application.
fn token_form<'a>(settings: &'a SpotifyConfig, auth_code: &'a str) -> Vec<(&'static str, &'a str)> {
    let mut form = vec![
        ("grant_type", "authorization_code"),
        ("code", auth_code),
        ("redirect_uri", settings.redirect_uri_param()),
    ];
    if !settings.has_client_secret() {
        form.push(("client_id", settings.client_id.as_str()));
    }
    form
}

#[async_trait]
impl SpotifyAccounts for SpotifyClient {
    async fn exchange_code(&self, auth_code: &str) -> GatewayResult<TokenPair> {
        let mut request = self
            .client
            .post(self.settings.token_url.clone())
            .form(&token_form(&self.settings, auth_code));
        if let Some(secret) = &self.settings.client_secret {
            request = request.basic_auth(&self.settings.client_id, Some(secret));
        }
        let response = send(TOKEN_ENDPOINT, request).await?;
        let tokens = decode_json::<TokenResponse>(TOKEN_ENDPOINT, response)
            .await
            .inspect_err(|err| warn!(error = %err, "authorization code exchange failed"))?;
        debug!(
            expires_in = tokens.expires_in,
            has_refresh_token = tokens.refresh_token.is_some(),
            "authorization code exchanged"
        );
        Ok(TokenPair::from(tokens))
    }

    async fn user_profile(&self, access_token: &str) -> GatewayResult<UserProfile> {
        let request = self
            .client
            .get(self.settings.profile_url.clone())
            .bearer_auth(access_token);
        let response = send(PROFILE_ENDPOINT, request).await?;
        let profile = decode_json::<SpotifyProfile>(PROFILE_ENDPOINT, response).await?;
        Ok(UserProfile::from(profile))
    }
}

/// Spotify authorization URL for the configured application.
#[must_use]
pub fn authorize_url(settings: &SpotifyConfig) -> Url {
    let mut url = settings.authorize_url.clone();
    url.query_pairs_mut()
        .append_pair("client_id", &settings.client_id)
        .append_pair("redirect_uri", settings.redirect_uri_param())
        .append_pair("scope", &settings.scopes.join(" "))
        .append_pair("response_type", "code");
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;

    fn settings_for(server: &MockServer, secret: Option<&str>) -> SpotifyConfig {
        let mut settings = SpotifyConfig::with_defaults("client-1").expect("valid defaults");
        settings.client_secret = secret.map(str::to_string);
        settings.token_url = Url::parse(&server.url("/api/token")).expect("mock URL");
        settings.profile_url = Url::parse(&server.url("/v1/me")).expect("mock URL");
        settings
    }

    #[test]
    fn authorize_url_carries_client_redirect_and_scopes() {
        let settings = SpotifyConfig::with_defaults("client-1").expect("valid defaults");
        let url = authorize_url(&settings);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        assert_eq!(url.path(), "/authorize");
        assert!(pairs.contains(&("client_id".into(), "client-1".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://localhost:3000".into())));
        assert!(pairs.contains(&(
            "scope".into(),
            "user-library-read playlist-read-private playlist-modify-public \
             playlist-modify-private user-read-private"
                .into()
        )));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
    }

    #[test]
    fn token_form_includes_client_id_only_without_secret() {
        let mut settings = SpotifyConfig::with_defaults("client-1").expect("valid defaults");
        let form = token_form(&settings, "XYZ");
        assert!(form.contains(&("grant_type", "authorization_code")));
        assert!(form.contains(&("code", "XYZ")));
        assert!(form.contains(&("redirect_uri", "http://localhost:3000")));
        assert!(form.contains(&("client_id", "client-1")));

        settings.client_secret = Some("secret".into());
        let form = token_form(&settings, "XYZ");
        assert!(!form.iter().any(|(key, _)| *key == "client_id"));
    }

    #[tokio::test]
    async fn exchange_uses_basic_auth_when_secret_is_configured() {
        let server = MockServer::start_async().await;
        let expected = format!("Basic {}", STANDARD.encode("client-1:shh"));
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/token")
                .header("authorization", expected.as_str())
                .header("content-type", "application/x-www-form-urlencoded");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "access_token": "access-1",
                    "refresh_token": "refresh-1",
                    "token_type": "Bearer",
                    "expires_in": 3600
                }));
        });

        let client = SpotifyClient::with_client(Client::new(), settings_for(&server, Some("shh")));
        let tokens = client.exchange_code("XYZ").await.expect("exchange should succeed");

        mock.assert();
        assert_eq!(tokens.access_token, "access-1");
        assert_eq!(tokens.refresh_token, "refresh-1");
    }

    #[tokio::test]
    async fn exchange_failure_carries_oauth_description() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/token");
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({
                    "error": "invalid_grant",
                    "error_description": "Invalid authorization code"
                }));
        });

        let client = SpotifyClient::with_client(Client::new(), settings_for(&server, None));
        let err = client.exchange_code("bad").await.expect_err("400 should fail");
        assert_eq!(err.user_message(), "Invalid authorization code");
    }

    #[tokio::test]
    async fn profile_uses_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/me")
                .header("authorization", "Bearer access-1");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "display_name": "Manav",
                    "images": [{"url": "https://i.scdn.co/me", "height": 300, "width": 300}]
                }));
        });

        let client = SpotifyClient::with_client(Client::new(), settings_for(&server, None));
        let profile = client
            .user_profile("access-1")
            .await
            .expect("profile should load");

        mock.assert();
        assert_eq!(profile.display_name.as_deref(), Some("Manav"));
        assert_eq!(profile.image_url.as_deref(), Some("https://i.scdn.co/me"));
    }

    #[tokio::test]
    async fn expired_token_maps_to_auth_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/me");
            then.status(401)
                .header("content-type", "application/json")
                .json_body(json!({"error": {"status": 401, "message": "The access token expired"}}));
        });

        let client = SpotifyClient::with_client(Client::new(), settings_for(&server, None));
        let err = client.user_profile("stale").await.expect_err("401 should fail");
        assert!(matches!(err, GatewayError::Auth { .. }));
        assert_eq!(err.user_message(), "The access token expired");
    }
}
