#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
//! HTTP gateway to the Audify optimization backend and the Spotify accounts API.
//!
//! Screens depend on the [`PlaylistBackend`] and [`SpotifyAccounts`] traits so
//! they can be driven by the reqwest implementations here or by test doubles.

pub mod backend;
pub mod cancel;
mod classify;
pub mod error;
pub mod spotify;

pub use backend::{HttpBackend, PlaylistBackend};
pub use cancel::CancelHandle;
pub use error::{GatewayError, GatewayResult};
pub use spotify::{SpotifyAccounts, SpotifyClient, authorize_url};

/// Header carrying the per-invocation request identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";
/// Header carrying the route (command or screen path) that issued the call.
pub const HEADER_ROUTE: &str = "x-audify-route";
