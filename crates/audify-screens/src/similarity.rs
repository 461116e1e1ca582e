//! Similarity checker: compare two playlists and show a percentage.

use std::sync::{Arc, Mutex};

use audify_api_models::CompareResponse;
use audify_client::{CancelHandle, GatewayError, GatewayResult, PlaylistBackend};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::flight::{RequestSlot, RequestTicket, lock_slot};

/// Text shown in the result slot when the comparison fails.
pub const SIMILARITY_ERROR_TEXT: &str = "An error occurred. Please try again.";
/// Heading of the result modal.
pub const SIMILARITY_HEADING: &str = "Similarity Percentage";
/// Text shown next to the spinner.
pub const SIMILARITY_LOADING_TEXT: &str = "Loading...";

/// Outcome shown in the modal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimilarityResult {
    /// Similarity score, 0-100.
    Percentage(f64),
    /// The comparison failed.
    Failed,
}

impl SimilarityResult {
    /// Text for the result slot: two decimals and a percent sign, or the fallback.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Percentage(value) => format!("{value:.2}%"),
            Self::Failed => SIMILARITY_ERROR_TEXT.to_string(),
        }
    }
}

/// Snapshot rendered by front ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityView {
    /// First playlist field.
    pub playlist1: String,
    /// Second playlist field.
    pub playlist2: String,
    /// Whether the result modal is open.
    pub modal_open: bool,
    /// Whether the spinner is shown.
    pub loading: bool,
    /// Result slot.
    pub result: Option<SimilarityResult>,
}

/// Required-field failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimilarityError {
    /// A playlist field is blank.
    #[error("{field} is required")]
    MissingPlaylist {
        /// Placeholder of the blank field.
        field: &'static str,
    },
}

struct SimilarityShared<B> {
    backend: Arc<B>,
    slot: Mutex<RequestSlot>,
    view: watch::Sender<SimilarityView>,
}

impl<B> SimilarityShared<B> {
    fn settle(
        &self,
        generation: u64,
        outcome: GatewayResult<CompareResponse>,
    ) -> Option<SimilarityResult> {
        let mut slot = lock_slot(&self.slot);
        if !slot.finish(generation) {
            debug!(generation, "discarding stale compare settlement");
            return None;
        }
        let result = match outcome {
            Ok(response) if response.similarity_percentage.is_finite() => {
                info!(
                    generation,
                    similarity = response.similarity_percentage,
                    "playlists compared"
                );
                SimilarityResult::Percentage(response.similarity_percentage)
            }
            Ok(_) => {
                warn!(generation, "compare returned a non-finite percentage");
                SimilarityResult::Failed
            }
            Err(GatewayError::Cancelled) => {
                self.view.send_modify(|view| view.loading = false);
                return None;
            }
            Err(err) => {
                warn!(generation, error = %err, "compare request failed");
                SimilarityResult::Failed
            }
        };
        self.view.send_modify(|view| {
            view.loading = false;
            view.result = Some(result);
        });
        Some(result)
    }
}

/// State machine behind the similarity screen.
///
/// Dropping the screen cancels a pending comparison.
pub struct SimilarityScreen<B> {
    shared: Arc<SimilarityShared<B>>,
}

impl<B> SimilarityScreen<B>
where
    B: PlaylistBackend + 'static,
{
    /// Idle screen backed by `backend`.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        let (view, _) = watch::channel(SimilarityView::default());
        Self {
            shared: Arc::new(SimilarityShared {
                backend,
                slot: Mutex::new(RequestSlot::default()),
                view,
            }),
        }
    }

    /// Receiver that observes every snapshot change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SimilarityView> {
        self.shared.view.subscribe()
    }

    /// Current snapshot.
    #[must_use]
    pub fn view(&self) -> SimilarityView {
        self.shared.view.borrow().clone()
    }

    /// Update the first playlist field.
    pub fn set_playlist1(&self, value: impl Into<String>) {
        let value = value.into();
        self.shared.view.send_modify(|view| view.playlist1 = value);
    }

    /// Update the second playlist field.
    pub fn set_playlist2(&self, value: impl Into<String>) {
        let value = value.into();
        self.shared.view.send_modify(|view| view.playlist2 = value);
    }

    /// Submit both fields.
    ///
    /// Opens the modal with the spinner immediately, superseding any pending
    /// comparison, and spawns the compare call.
    ///
    /// # Errors
    ///
    /// Returns [`SimilarityError::MissingPlaylist`] when a field is blank; the
    /// modal stays closed.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the compare call is
    /// spawned onto the current runtime.
    pub fn submit(&self) -> Result<RequestTicket<Option<SimilarityResult>>, SimilarityError> {
        let shared = &self.shared;
        let (first, second) = {
            let view = shared.view.borrow();
            (view.playlist1.trim().to_string(), view.playlist2.trim().to_string())
        };
        if first.is_empty() {
            return Err(SimilarityError::MissingPlaylist { field: "Playlist 1" });
        }
        if second.is_empty() {
            return Err(SimilarityError::MissingPlaylist { field: "Playlist 2" });
        }

        let cancel = CancelHandle::new();
        let generation = {
            let mut slot = lock_slot(&shared.slot);
            let generation = slot.begin(cancel.clone());
            shared.view.send_modify(|view| {
                view.modal_open = true;
                view.loading = true;
                view.result = None;
            });
            generation
        };
        info!(generation, "compare request started");

        let task_shared = Arc::clone(shared);
        let handle = tokio::spawn(async move {
            let outcome = task_shared
                .backend
                .compare_playlists(&first, &second, &cancel)
                .await;
            task_shared.settle(generation, outcome)
        });
        Ok(RequestTicket::new(generation, handle))
    }

    /// Close the modal, clearing the result and cancelling a pending comparison.
    pub fn close_modal(&self) {
        let mut slot = lock_slot(&self.shared.slot);
        if let Some(generation) = slot.supersede() {
            debug!(generation, "compare request cancelled by closing the modal");
        }
        self.shared.view.send_modify(|view| {
            view.modal_open = false;
            view.loading = false;
            view.result = None;
        });
    }

    /// Whether a comparison is outstanding.
    #[must_use]
    pub fn request_pending(&self) -> bool {
        lock_slot(&self.shared.slot).is_pending()
    }
}

impl<B> Drop for SimilarityScreen<B> {
    fn drop(&mut self) {
        lock_slot(&self.shared.slot).supersede();
    }
}

#[cfg(test)]
mod tests {
    use audify_test_support::FakeBackend;

    use super::*;

    const FIRST: &str = "https://open.spotify.com/playlist/a";
    const SECOND: &str = "https://open.spotify.com/playlist/b";

    fn filled(backend: &Arc<FakeBackend>) -> SimilarityScreen<FakeBackend> {
        let screen = SimilarityScreen::new(Arc::clone(backend));
        screen.set_playlist1(FIRST);
        screen.set_playlist2(SECOND);
        screen
    }

    #[tokio::test]
    async fn blank_field_opens_nothing() {
        let backend = Arc::new(FakeBackend::new());
        let screen = SimilarityScreen::new(Arc::clone(&backend));
        screen.set_playlist1(FIRST);
        screen.set_playlist2("   ");

        assert_eq!(
            screen.submit().map(|_| ()),
            Err(SimilarityError::MissingPlaylist { field: "Playlist 2" })
        );
        assert!(!screen.view().modal_open);
        assert!(backend.compare_calls().is_empty());
    }

    #[tokio::test]
    async fn spinner_then_two_decimal_percentage() {
        let backend = Arc::new(FakeBackend::new());
        let gate = backend.gate_compare();
        let screen = filled(&backend);

        let ticket = screen.submit().expect("both fields filled");
        let view = screen.view();
        assert!(view.modal_open);
        assert!(view.loading);
        assert_eq!(view.result, None);

        backend.wait_for_compare_calls(1).await;
        gate.send(Ok(CompareResponse {
            similarity_percentage: 73.456,
        }))
        .ok();
        let result = ticket.settled().await.flatten().expect("result shown");
        assert_eq!(result.display(), "73.46%");
        assert!(!screen.view().loading);
        assert_eq!(
            backend.compare_calls(),
            [(FIRST.to_string(), SECOND.to_string())]
        );
    }

    #[tokio::test]
    async fn failure_shows_fallback_in_same_slot() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_compare(Err(GatewayError::Status {
            endpoint: "compare_playlists".into(),
            status: 500,
            message: "boom".into(),
        }));
        let screen = filled(&backend);

        let result = screen.submit().expect("both fields filled").settled().await;
        assert_eq!(result, Some(Some(SimilarityResult::Failed)));
        let view = screen.view();
        assert_eq!(
            view.result.map(|result| result.display()),
            Some(SIMILARITY_ERROR_TEXT.to_string())
        );
        assert!(view.modal_open);
    }

    #[tokio::test]
    async fn close_modal_clears_and_cancels() {
        let backend = Arc::new(FakeBackend::new());
        backend.hang_compare();
        let screen = filled(&backend);

        let ticket = screen.submit().expect("both fields filled");
        backend.wait_for_compare_calls(1).await;
        screen.close_modal();

        assert_eq!(ticket.settled().await, Some(None));
        let view = screen.view();
        assert!(!view.modal_open);
        assert!(!view.loading);
        assert_eq!(view.result, None);
        assert!(!screen.request_pending());
    }

    #[tokio::test]
    async fn resubmission_supersedes_pending_compare() {
        let backend = Arc::new(FakeBackend::new());
        let first_gate = backend.gate_compare();
        backend.push_compare(Ok(CompareResponse {
            similarity_percentage: 12.0,
        }));
        let screen = filled(&backend);

        let first = screen.submit().expect("both fields filled");
        backend.wait_for_compare_calls(1).await;
        let second = screen.submit().expect("both fields filled");

        assert_eq!(
            second.settled().await,
            Some(Some(SimilarityResult::Percentage(12.0)))
        );
        first_gate
            .send(Ok(CompareResponse {
                similarity_percentage: 99.0,
            }))
            .ok();
        assert_eq!(first.settled().await, Some(None));
        assert_eq!(
            screen.view().result,
            Some(SimilarityResult::Percentage(12.0))
        );
    }
}
