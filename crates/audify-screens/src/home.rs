//! Home screen: submit a playlist link, wait for the optimized order, show it.
//!
//! # Design
//! - `Idle → Validating → Loading → {Success, Error}`, and `Loading → Idle` on cancellation.
//! - Every transition happens under the request slot lock; snapshots go out through `watch`.
//! - The status ticker belongs to the slot entry, so it dies with the request on every path.
//! - Settlements from superseded or cancelled requests are discarded by generation.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use audify_api_models::{OptimizeResponse, OptimizedTrack};
use audify_client::{CancelHandle, GatewayError, GatewayResult, PlaylistBackend};
use audify_config::{ClientConfig, LinkPolicy, defaults};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::auth::AuthSession;
use crate::flight::{RequestSlot, RequestTicket, lock_slot};
use crate::form::PlaylistForm;
use crate::link::{LinkError, PlaylistLink};
use crate::status::{PhraseCycle, StatusTicker};

/// Acknowledgement shown after a successful write-back.
pub const MODIFY_SUCCESS_TEXT: &str = "Playlist reordered successfully";
/// Acknowledgement shown when the write-back fails.
pub const MODIFY_FAILURE_TEXT: &str =
    "Error reordering playlist. Please try again. It may be a problem with your permissions!";
/// Acknowledgement shown when write-back is attempted while logged out.
pub const MODIFY_LOGIN_TEXT: &str = "Log in with Spotify to modify your playlist.";

/// Why the screen is showing the error dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeFailure {
    /// The link was rejected before any request was made.
    Validation(LinkError),
    /// The optimize request failed.
    Network(String),
    /// The backend refused the request's credentials.
    Auth(String),
}

impl HomeFailure {
    fn from_gateway(err: &GatewayError) -> Self {
        if err.is_auth() {
            Self::Auth(err.user_message())
        } else {
            Self::Network(err.user_message())
        }
    }

    /// Detail line for the error dialog.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Network(message) | Self::Auth(message) => message.clone(),
        }
    }
}

/// Lifecycle phase of the screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HomePhase {
    /// Form enabled, nothing pending.
    #[default]
    Idle,
    /// Link is being checked.
    Validating,
    /// Optimize request outstanding.
    Loading,
    /// Result view open.
    Success,
    /// Error dialog open.
    Error(HomeFailure),
}

/// Snapshot rendered by front ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeView {
    /// Link input.
    pub form: PlaylistForm,
    /// Current phase.
    pub phase: HomePhase,
    /// Status phrase, present only while loading.
    pub loading_phrase: Option<&'static str>,
    /// Optimized tracks in backend order; empty unless the result view is open.
    pub tracks: Vec<OptimizedTrack>,
    /// Link the current result was produced for.
    pub source: Option<PlaylistLink>,
}

impl HomeView {
    /// Whether the loading overlay is shown.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == HomePhase::Loading
    }

    /// Whether the result view is open.
    #[must_use]
    pub fn result_open(&self) -> bool {
        self.phase == HomePhase::Success
    }

    /// Failure behind the error dialog, if it is open.
    #[must_use]
    pub const fn failure(&self) -> Option<&HomeFailure> {
        match &self.phase {
            HomePhase::Error(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Timing and validation knobs for the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeSettings {
    /// Link validation policy.
    pub link_policy: LinkPolicy,
    /// Status phrase rotation period.
    pub status_interval: Duration,
}

impl Default for HomeSettings {
    fn default() -> Self {
        Self {
            link_policy: LinkPolicy::default(),
            status_interval: Duration::from_millis(defaults::STATUS_INTERVAL_MS),
        }
    }
}

impl HomeSettings {
    /// Settings taken from the loaded client configuration.
    #[must_use]
    pub const fn from_config(config: &ClientConfig) -> Self {
        Self {
            link_policy: config.link_policy,
            status_interval: config.status_interval,
        }
    }
}

/// How an optimize request ended, as seen by the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Result view opened with this many tracks.
    Succeeded {
        /// Number of tracks received.
        tracks: usize,
    },
    /// Error dialog opened.
    Failed(GatewayError),
    /// Request was cancelled through [`HomeScreen::cancel`]; the screen went
    /// back to idle and the outcome was dropped.
    Cancelled,
    /// A newer request, a close, or dropping the screen took over; the
    /// outcome was dropped.
    Superseded,
}

/// Failures of the playlist write-back action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModifyError {
    /// No Spotify session.
    #[error("not logged in to Spotify")]
    NotAuthenticated,
    /// No optimized result is on screen.
    #[error("no optimized playlist to write back")]
    NoResult,
    /// The submitted link has no playlist id.
    #[error("the playlist link does not contain a playlist id")]
    InvalidLink,
    /// The reorder call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ModifyError {
    /// Blocking acknowledgement text for this failure.
    #[must_use]
    pub const fn acknowledgement(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => MODIFY_LOGIN_TEXT,
            Self::NoResult | Self::InvalidLink | Self::Gateway(_) => MODIFY_FAILURE_TEXT,
        }
    }
}

struct HomeShared<B> {
    backend: Arc<B>,
    status_interval: Duration,
    slot: Mutex<RequestSlot>,
    view: watch::Sender<HomeView>,
}

impl<B> HomeShared<B> {
    fn show_phrase(&self, generation: u64, phrase: &'static str) {
        let slot = lock_slot(&self.slot);
        if !slot.is_current(generation) {
            return;
        }
        self.view.send_modify(|view| {
            if view.phase == HomePhase::Loading {
                view.loading_phrase = Some(phrase);
            }
        });
    }

    fn settle(
        &self,
        generation: u64,
        link: PlaylistLink,
        outcome: GatewayResult<OptimizeResponse>,
    ) -> Settlement {
        let mut slot = lock_slot(&self.slot);
        if !slot.finish(generation) {
            if slot.was_cancelled(generation) {
                debug!(generation, "discarding optimize settlement after cancel");
                return Settlement::Cancelled;
            }
            debug!(generation, "discarding stale optimize settlement");
            return Settlement::Superseded;
        }
        match outcome {
            Ok(response) => {
                let tracks = response.optimal_playlist.len();
                self.view.send_modify(|view| {
                    view.phase = HomePhase::Success;
                    view.loading_phrase = None;
                    view.tracks = response.optimal_playlist;
                    view.source = Some(link);
                });
                info!(generation, tracks, "playlist optimized");
                Settlement::Succeeded { tracks }
            }
            Err(GatewayError::Cancelled) => {
                self.view.send_modify(|view| {
                    view.phase = HomePhase::Idle;
                    view.loading_phrase = None;
                });
                debug!(generation, "optimize request cancelled");
                Settlement::Cancelled
            }
            Err(err) => {
                let failure = HomeFailure::from_gateway(&err);
                self.view.send_modify(|view| {
                    view.phase = HomePhase::Error(failure);
                    view.loading_phrase = None;
                });
                warn!(generation, error = %err, "optimize request failed");
                Settlement::Failed(err)
            }
        }
    }
}

/// State machine behind the optimizer screen.
///
/// Dropping the screen cancels any pending request and stops the status ticker.
pub struct HomeScreen<B> {
    shared: Arc<HomeShared<B>>,
}

impl<B> HomeScreen<B>
where
    B: PlaylistBackend + 'static,
{
    /// Idle screen backed by `backend`.
    #[must_use]
    pub fn new(backend: Arc<B>, settings: HomeSettings) -> Self {
        let (view, _) = watch::channel(HomeView {
            form: PlaylistForm::new(settings.link_policy),
            ..HomeView::default()
        });
        Self {
            shared: Arc::new(HomeShared {
                backend,
                status_interval: settings.status_interval,
                slot: Mutex::new(RequestSlot::default()),
                view,
            }),
        }
    }

    /// Receiver that observes every snapshot change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<HomeView> {
        self.shared.view.subscribe()
    }

    /// Current snapshot.
    #[must_use]
    pub fn view(&self) -> HomeView {
        self.shared.view.borrow().clone()
    }

    /// Update the link input.
    pub fn set_link(&self, value: impl Into<String>) {
        let value = value.into();
        self.shared.view.send_modify(|view| view.form.set_link(value));
    }

    /// Submit the current link.
    ///
    /// Any pending request is cancelled first. An invalid link moves the screen
    /// to the error state without touching the network. A valid link enters
    /// loading, starts the status ticker, and spawns the optimize call.
    ///
    /// # Errors
    ///
    /// Returns the [`LinkError`] that rejected the input.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the request and the
    /// status ticker are spawned onto the current runtime.
    pub fn submit(&self) -> Result<RequestTicket<Settlement>, LinkError> {
        let shared = &self.shared;
        let mut slot = lock_slot(&shared.slot);
        if let Some(previous) = slot.supersede() {
            debug!(generation = previous, "superseding pending optimize request");
        }
        shared.view.send_modify(|view| {
            view.phase = HomePhase::Validating;
            view.loading_phrase = None;
            view.tracks.clear();
            view.source = None;
        });

        let validated = shared.view.borrow().form.validate();
        let link = match validated {
            Ok(link) => link,
            Err(err) => {
                warn!(error = %err, "playlist link rejected");
                let failure = HomeFailure::Validation(err.clone());
                shared
                    .view
                    .send_modify(|view| view.phase = HomePhase::Error(failure));
                return Err(err);
            }
        };

        let cancel = CancelHandle::new();
        let generation = slot.begin(cancel.clone());
        let mut phrases = PhraseCycle::new();
        shared.view.send_modify(|view| {
            view.phase = HomePhase::Loading;
            view.loading_phrase = Some(phrases.current());
        });

        let weak: Weak<HomeShared<B>> = Arc::downgrade(shared);
        let ticker = StatusTicker::start(shared.status_interval, move || {
            if let Some(shared) = weak.upgrade() {
                shared.show_phrase(generation, phrases.advance());
            }
        });
        slot.attach_ticker(generation, ticker);
        drop(slot);
        info!(generation, link = %link, "optimize request started");

        let task_shared = Arc::clone(shared);
        let handle = tokio::spawn(async move {
            let outcome = task_shared
                .backend
                .optimize_playlist(link.as_str(), &cancel)
                .await;
            task_shared.settle(generation, link, outcome)
        });
        Ok(RequestTicket::new(generation, handle))
    }

    /// Cancel the pending request (the loading overlay's close control).
    ///
    /// Returns `false` when nothing was pending.
    pub fn cancel(&self) -> bool {
        let mut slot = lock_slot(&self.shared.slot);
        let Some(generation) = slot.cancel() else {
            return false;
        };
        self.shared.view.send_modify(|view| {
            view.phase = HomePhase::Idle;
            view.loading_phrase = None;
        });
        info!(generation, "optimize request cancelled by user");
        true
    }

    /// Close the result view or error dialog: clear the link and tracks, go idle.
    pub fn close_result(&self) {
        let mut slot = lock_slot(&self.shared.slot);
        slot.supersede();
        self.shared.view.send_modify(|view| {
            view.form.clear();
            view.phase = HomePhase::Idle;
            view.loading_phrase = None;
            view.tracks.clear();
            view.source = None;
        });
    }

    /// Whether the status ticker is currently running.
    #[must_use]
    pub fn status_ticker_active(&self) -> bool {
        lock_slot(&self.shared.slot).ticker_active()
    }

    /// Whether an optimize request is outstanding.
    #[must_use]
    pub fn request_pending(&self) -> bool {
        lock_slot(&self.shared.slot).is_pending()
    }

    /// Write the optimized order back to the submitted playlist.
    ///
    /// Returns the success acknowledgement text.
    ///
    /// # Errors
    ///
    /// Returns [`ModifyError`] when logged out, when no result is shown, when
    /// the link carries no playlist id, or when the reorder call fails.
    pub async fn modify_playlist(&self, session: &AuthSession) -> Result<&'static str, ModifyError> {
        if !session.is_logged_in() {
            return Err(ModifyError::NotAuthenticated);
        }
        let (playlist_id, uris) = {
            let view = self.shared.view.borrow();
            if !view.result_open() || view.tracks.is_empty() {
                return Err(ModifyError::NoResult);
            }
            let source = view.source.as_ref().ok_or(ModifyError::NoResult)?;
            let playlist_id = source.playlist_id().ok_or(ModifyError::InvalidLink)?;
            let uris: Vec<String> = view.tracks.iter().map(|track| track.uri.clone()).collect();
            (playlist_id.to_string(), uris)
        };

        match self
            .shared
            .backend
            .reorder_playlist(&playlist_id, &uris, session.access_token())
            .await
        {
            Ok(message) => {
                info!(playlist_id = %playlist_id, tracks = uris.len(), %message, "playlist reordered");
                Ok(MODIFY_SUCCESS_TEXT)
            }
            Err(err) => {
                warn!(playlist_id = %playlist_id, error = %err, "playlist reorder failed");
                Err(ModifyError::Gateway(err))
            }
        }
    }
}

impl<B> Drop for HomeScreen<B> {
    fn drop(&mut self) {
        let mut slot = lock_slot(&self.shared.slot);
        if let Some(generation) = slot.supersede() {
            debug!(generation, "home screen dropped with a pending request");
        }
    }
}

#[cfg(test)]
mod tests {
    use audify_test_support::FakeBackend;
    use audify_test_support::fixtures::{SAMPLE_PLAYLIST_LINK, optimize_response};

    use super::*;

    fn screen(backend: &Arc<FakeBackend>) -> HomeScreen<FakeBackend> {
        HomeScreen::new(Arc::clone(backend), HomeSettings::default())
    }

    #[tokio::test]
    async fn invalid_link_errors_without_network_call() {
        let backend = Arc::new(FakeBackend::new());
        let home = screen(&backend);
        home.set_link("definitely not a url");

        let err = home.submit().expect_err("invalid link must be rejected");
        assert!(matches!(err, LinkError::Malformed { .. }));
        assert!(matches!(
            home.view().phase,
            HomePhase::Error(HomeFailure::Validation(LinkError::Malformed { .. }))
        ));
        assert!(backend.optimize_calls().is_empty());
        assert!(!home.request_pending());
        assert!(!home.status_ticker_active());
    }

    #[tokio::test]
    async fn empty_link_is_a_validation_error() {
        let backend = Arc::new(FakeBackend::new());
        let home = screen(&backend);
        assert_eq!(home.submit().map(|_| ()), Err(LinkError::Empty));
        assert_eq!(
            home.view().failure(),
            Some(&HomeFailure::Validation(LinkError::Empty))
        );
    }

    #[tokio::test]
    async fn loading_is_entered_before_the_call_resolves() {
        let backend = Arc::new(FakeBackend::new());
        let gate = backend.gate_optimize();
        let home = screen(&backend);
        home.set_link(SAMPLE_PLAYLIST_LINK);

        let ticket = home.submit().expect("valid link");
        let view = home.view();
        assert!(view.is_loading());
        assert_eq!(view.loading_phrase, Some("Calculating song key compatibility..."));
        assert!(home.status_ticker_active());

        backend.wait_for_optimize_calls(1).await;
        gate.send(Ok(optimize_response(3))).ok();
        assert_eq!(ticket.settled().await, Some(Settlement::Succeeded { tracks: 3 }));
        assert_eq!(backend.optimize_calls(), [SAMPLE_PLAYLIST_LINK]);
        assert!(!home.status_ticker_active());
    }

    #[tokio::test]
    async fn backend_failure_opens_error_dialog() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_optimize(Err(GatewayError::Network {
            endpoint: "optimize_playlist".into(),
            message: "connection refused".into(),
        }));
        let home = screen(&backend);
        home.set_link(SAMPLE_PLAYLIST_LINK);

        let settlement = home.submit().expect("valid link").settled().await;
        assert!(matches!(settlement, Some(Settlement::Failed(_))));
        assert!(matches!(
            home.view().phase,
            HomePhase::Error(HomeFailure::Network(_))
        ));
        assert_eq!(home.view().loading_phrase, None);
        assert!(!home.status_ticker_active());
        assert!(!home.request_pending());
    }

    #[tokio::test]
    async fn cancel_returns_to_idle_and_ignores_late_success() {
        let backend = Arc::new(FakeBackend::new());
        let gate = backend.gate_optimize();
        let home = screen(&backend);
        home.set_link(SAMPLE_PLAYLIST_LINK);

        let ticket = home.submit().expect("valid link");
        backend.wait_for_optimize_calls(1).await;
        assert!(home.cancel());
        assert_eq!(home.view().phase, HomePhase::Idle);
        assert!(!home.status_ticker_active());

        gate.send(Ok(optimize_response(2))).ok();
        assert_eq!(ticket.settled().await, Some(Settlement::Cancelled));
        let view = home.view();
        assert_eq!(view.phase, HomePhase::Idle);
        assert!(view.tracks.is_empty());
        assert!(!home.cancel());
    }

    #[tokio::test]
    async fn late_failure_after_cancel_keeps_dialog_closed() {
        let backend = Arc::new(FakeBackend::new());
        let gate = backend.gate_optimize();
        let home = screen(&backend);
        home.set_link(SAMPLE_PLAYLIST_LINK);

        let ticket = home.submit().expect("valid link");
        backend.wait_for_optimize_calls(1).await;
        assert!(home.cancel());

        gate.send(Err(GatewayError::Network {
            endpoint: "optimize_playlist".into(),
            message: "connection reset".into(),
        }))
        .ok();
        assert_eq!(ticket.settled().await, Some(Settlement::Cancelled));
        let view = home.view();
        assert_eq!(view.phase, HomePhase::Idle);
        assert_eq!(view.failure(), None);
        assert!(!home.request_pending());
    }

    #[tokio::test]
    async fn close_result_clears_link_and_tracks() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_optimize(Ok(optimize_response(2)));
        let home = screen(&backend);
        home.set_link(SAMPLE_PLAYLIST_LINK);
        home.submit().expect("valid link").settled().await;
        assert!(home.view().result_open());

        home.close_result();
        let view = home.view();
        assert_eq!(view.phase, HomePhase::Idle);
        assert!(view.form.link().is_empty());
        assert!(view.tracks.is_empty());
        assert!(view.source.is_none());
    }

    #[tokio::test]
    async fn modify_requires_login_and_result() {
        let backend = Arc::new(FakeBackend::new());
        let home = screen(&backend);
        assert_eq!(
            home.modify_playlist(&AuthSession::default()).await,
            Err(ModifyError::NotAuthenticated)
        );
        let session = AuthSession::new("token", "refresh");
        assert_eq!(
            home.modify_playlist(&session).await,
            Err(ModifyError::NoResult)
        );
        assert!(backend.reorder_calls().is_empty());
    }

    #[tokio::test]
    async fn modify_sends_playlist_id_and_ordered_uris() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_optimize(Ok(optimize_response(3)));
        let home = screen(&backend);
        home.set_link("https://open.spotify.com/playlist/abc?si=42");
        home.submit().expect("valid link").settled().await;

        let session = AuthSession::new("token-1", "refresh-1");
        assert_eq!(home.modify_playlist(&session).await, Ok(MODIFY_SUCCESS_TEXT));

        let calls = backend.reorder_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].playlist_id, "abc");
        assert_eq!(calls[0].access_token, "token-1");
        assert_eq!(
            calls[0].uris,
            ["spotify:track:1", "spotify:track:2", "spotify:track:3"]
        );
    }

    #[tokio::test]
    async fn modify_failure_uses_permission_hint() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_optimize(Ok(optimize_response(1)));
        backend.push_reorder(Err(GatewayError::Rejected {
            endpoint: "reorder_playlist".into(),
            message: "Insufficient client scope".into(),
        }));
        let home = screen(&backend);
        home.set_link(SAMPLE_PLAYLIST_LINK);
        home.submit().expect("valid link").settled().await;

        let err = home
            .modify_playlist(&AuthSession::new("token", ""))
            .await
            .expect_err("rejected reorder must fail");
        assert_eq!(err.acknowledgement(), MODIFY_FAILURE_TEXT);
    }
}
