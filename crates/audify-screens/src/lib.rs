#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
//! DOM-free screen logic for Audify.
//!
//! Each screen owns its state and publishes snapshots through a
//! `tokio::sync::watch` channel; front ends render those snapshots and call
//! back into the screen for user actions.
//!
//! Layout: `link.rs`/`form.rs` (input validation), `status.rs` (loading
//! phrases), `flight.rs` (single in-flight request slot), `home.rs`,
//! `auth.rs`, `similarity.rs` (screens), `presentation.rs` (view models),
//! `routes.rs` (routing shell).

pub mod auth;
mod flight;
pub mod form;
pub mod home;
pub mod link;
pub mod presentation;
pub mod routes;
pub mod similarity;
pub mod status;

pub use auth::{AuthAction, AuthError, AuthSession, AuthWidget, RedirectResult};
pub use flight::RequestTicket;
pub use form::PlaylistForm;
pub use home::{HomeFailure, HomePhase, HomeScreen, HomeSettings, HomeView, ModifyError, Settlement};
pub use link::{LinkError, PlaylistLink};
pub use routes::Route;
pub use similarity::{SimilarityError, SimilarityResult, SimilarityScreen, SimilarityView};
