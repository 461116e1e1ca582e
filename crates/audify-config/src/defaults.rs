//! Default endpoints and timings.
//!
//! # Design
//! - Spotify endpoints are overridable so tests and token proxies can redirect them.
//! - The backend URL is fixed per deployment; the default matches a local backend.

/// Optimization backend used when `AUDIFY_BACKEND_URL` is unset.
pub const BACKEND_URL: &str = "http://localhost:5000";
/// Redirect URI registered with the Spotify application.
pub const REDIRECT_URI: &str = "http://localhost:3000";
/// Spotify authorization endpoint.
pub const SPOTIFY_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
/// Spotify token endpoint.
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Spotify current-user profile endpoint.
pub const SPOTIFY_PROFILE_URL: &str = "https://api.spotify.com/v1/me";
/// Spotify logout page.
pub const SPOTIFY_LOGOUT_URL: &str = "https://www.spotify.com/logout";
/// Scopes requested during authorization.
pub const SPOTIFY_SCOPES: [&str; 5] = [
    "user-library-read",
    "playlist-read-private",
    "playlist-modify-public",
    "playlist-modify-private",
    "user-read-private",
];
/// HTTP timeout in seconds. Optimizing a large playlist takes minutes.
pub const HTTP_TIMEOUT_SECS: u64 = 300;
/// Period of the loading status phrase rotation, in milliseconds.
pub const STATUS_INTERVAL_MS: u64 = 1_000;
