//! Spotify login control.
//!
//! # Design
//! - Logged-in state is derived from the access token alone; blank tokens count as logged out.
//! - The redirect result is handed in at construction and consumed once by `mount`.
//! - Profile lookups are cosmetic: their failure never changes the session.

use std::sync::Arc;

use audify_api_models::{TokenPair, UserProfile};
use audify_client::{GatewayError, SpotifyAccounts, authorize_url};
use audify_config::SpotifyConfig;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::routes::Route;

/// Label of the control while logged out.
pub const LOGIN_LABEL: &str = "Log In";
/// Label of the control while logged in.
pub const LOGOUT_LABEL: &str = "Log Out";

/// In-memory Spotify session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    tokens: TokenPair,
}

impl AuthSession {
    /// Session from raw tokens.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            tokens: TokenPair {
                access_token: access_token.into(),
                refresh_token: refresh_token.into(),
            },
        }
    }

    /// Session from an exchanged token pair.
    #[must_use]
    pub const fn from_tokens(tokens: TokenPair) -> Self {
        Self { tokens }
    }

    /// Whether a usable access token is present.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        !self.tokens.access_token.trim().is_empty()
    }

    /// Bearer token for Spotify-authorized calls.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.tokens.access_token
    }

    /// Refresh token, empty when none was issued.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        &self.tokens.refresh_token
    }

    /// Forget both tokens.
    pub fn clear(&mut self) {
        self.tokens = TokenPair::default();
    }
}

/// Query parameters Spotify appends when redirecting back to the app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectResult {
    code: Option<String>,
    error: Option<String>,
}

impl RedirectResult {
    /// No redirect happened (plain page load).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Redirect carrying an authorization code.
    #[must_use]
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            error: None,
        }
    }

    /// Read `code` and `error` from a return URL. Blank values are ignored.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let mut result = Self::default();
        for (key, value) in url.query_pairs() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "code" if result.code.is_none() => result.code = Some(value.to_string()),
                "error" if result.error.is_none() => result.error = Some(value.to_string()),
                _ => {}
            }
        }
        result
    }

    /// Authorization code, if present.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Error reported by Spotify (e.g. `access_denied`), if present.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// What the front end must do after the control is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    /// Send the user to Spotify's authorization page.
    Redirect {
        /// Authorization URL.
        url: Url,
    },
    /// Open Spotify's logout page and return the app to `navigate_to`.
    Logout {
        /// Spotify logout page.
        logout_url: Url,
        /// In-app destination.
        navigate_to: Route,
    },
}

/// Login failures surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The user declined (or Spotify refused) the authorization request.
    #[error("Spotify authorization failed: {reason}")]
    Denied {
        /// `error` value from the redirect.
        reason: String,
    },
    /// The code could not be exchanged for tokens.
    #[error("could not complete Spotify login: {}", .0.user_message())]
    Exchange(GatewayError),
}

/// Login/logout control bound to one redirect result.
pub struct AuthWidget<A> {
    accounts: Arc<A>,
    settings: SpotifyConfig,
    redirect: Option<RedirectResult>,
    session: AuthSession,
    profile: Option<UserProfile>,
    last_error: Option<String>,
}

impl<A> AuthWidget<A>
where
    A: SpotifyAccounts,
{
    /// Widget for `settings`, consuming `redirect` on first mount.
    #[must_use]
    pub fn new(accounts: Arc<A>, settings: SpotifyConfig, redirect: RedirectResult) -> Self {
        Self {
            accounts,
            settings,
            redirect: Some(redirect),
            session: AuthSession::default(),
            profile: None,
            last_error: None,
        }
    }

    /// Inspect the redirect result once.
    ///
    /// A `code` is exchanged for tokens and the profile is fetched. Later
    /// calls do nothing. Returns whether a session was established.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when Spotify reported an error or the exchange
    /// failed; the message is also kept in [`AuthWidget::last_error`].
    pub async fn mount(&mut self) -> Result<bool, AuthError> {
        let Some(redirect) = self.redirect.take() else {
            return Ok(false);
        };
        if let Some(reason) = redirect.error {
            let err = AuthError::Denied { reason };
            warn!(error = %err, "spotify authorization denied");
            self.last_error = Some(err.to_string());
            return Err(err);
        }
        let Some(code) = redirect.code else {
            return Ok(false);
        };

        match self.accounts.exchange_code(&code).await {
            Ok(tokens) => {
                self.session = AuthSession::from_tokens(tokens);
                self.last_error = None;
                info!("spotify login completed");
                self.refresh_profile().await;
                Ok(self.session.is_logged_in())
            }
            Err(source) => {
                let err = AuthError::Exchange(source);
                warn!(error = %err, "authorization code exchange failed");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Fetch the profile for the current session.
    ///
    /// Failures leave the profile empty and keep the session.
    pub async fn refresh_profile(&mut self) -> Option<&UserProfile> {
        if !self.session.is_logged_in() {
            self.profile = None;
            return None;
        }
        self.profile = match self.accounts.user_profile(self.session.access_token()).await {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(error = %err, "spotify profile lookup failed");
                None
            }
        };
        self.profile.as_ref()
    }

    /// React to a click on the control.
    ///
    /// Logging out clears the session and profile before returning.
    pub fn click(&mut self) -> AuthAction {
        if self.session.is_logged_in() {
            self.session.clear();
            self.profile = None;
            info!("spotify session cleared");
            AuthAction::Logout {
                logout_url: self.settings.logout_url.clone(),
                navigate_to: Route::Landing,
            }
        } else {
            AuthAction::Redirect {
                url: self.authorize_url(),
            }
        }
    }

    /// Adopt a session obtained elsewhere (e.g. a token passed on the command line).
    pub fn restore_session(&mut self, session: AuthSession) {
        self.session = session;
        self.profile = None;
    }

    /// Authorization URL for this application.
    #[must_use]
    pub fn authorize_url(&self) -> Url {
        authorize_url(&self.settings)
    }

    /// Label for the control.
    #[must_use]
    pub fn button_label(&self) -> &'static str {
        if self.session.is_logged_in() {
            LOGOUT_LABEL
        } else {
            LOGIN_LABEL
        }
    }

    /// Current session.
    #[must_use]
    pub const fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Whether the user is logged in.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Profile shown next to the control.
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Last login failure shown to the user.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
