//! Single in-flight request bookkeeping shared by the screens.
//!
//! A screen keeps one [`RequestSlot`] behind a mutex and performs every state
//! transition while holding it, so a settlement, a cancellation and a phrase
//! tick can never interleave. The lock is never held across an `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use audify_client::CancelHandle;
use tokio::task::JoinHandle;

use crate::status::StatusTicker;

/// The request currently owned by a screen.
#[derive(Debug)]
struct ActiveRequest {
    generation: u64,
    cancel: CancelHandle,
    ticker: Option<StatusTicker>,
}

/// At most one outstanding request plus the generation counter.
#[derive(Debug, Default)]
pub(crate) struct RequestSlot {
    last_generation: u64,
    active: Option<ActiveRequest>,
    cancelled_generation: Option<u64>,
}

impl RequestSlot {
    /// Cancel and drop the active request, returning its generation.
    pub(crate) fn supersede(&mut self) -> Option<u64> {
        let previous = self.active.take()?;
        previous.cancel.cancel();
        Some(previous.generation)
    }

    /// Like [`RequestSlot::supersede`], but remembers that the user withdrew
    /// the request so its settlement reports a cancellation.
    pub(crate) fn cancel(&mut self) -> Option<u64> {
        let generation = self.supersede()?;
        self.cancelled_generation = Some(generation);
        Some(generation)
    }

    /// Whether `generation` was withdrawn through [`RequestSlot::cancel`].
    pub(crate) fn was_cancelled(&self, generation: u64) -> bool {
        self.cancelled_generation == Some(generation)
    }

    /// Install a new request after superseding any previous one.
    pub(crate) fn begin(&mut self, cancel: CancelHandle) -> u64 {
        self.supersede();
        self.last_generation += 1;
        self.active = Some(ActiveRequest {
            generation: self.last_generation,
            cancel,
            ticker: None,
        });
        self.last_generation
    }

    /// Attach a status ticker to the request of `generation`.
    ///
    /// The ticker is dropped immediately when that request is no longer active.
    pub(crate) fn attach_ticker(&mut self, generation: u64, ticker: StatusTicker) {
        if let Some(active) = self
            .active
            .as_mut()
            .filter(|active| active.generation == generation)
        {
            active.ticker = Some(ticker);
        }
    }

    /// Release the request of `generation` if it is still the active one.
    ///
    /// Returns `false` for stale settlements, which callers must discard.
    pub(crate) fn finish(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.generation == generation)
    }

    pub(crate) const fn is_pending(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn ticker_active(&self) -> bool {
        self.active
            .as_ref()
            .and_then(|active| active.ticker.as_ref())
            .is_some_and(StatusTicker::is_running)
    }
}

pub(crate) fn lock_slot(slot: &Mutex<RequestSlot>) -> MutexGuard<'_, RequestSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle on a spawned screen request.
///
/// Dropping the ticket detaches it; the screen still applies the outcome.
#[derive(Debug)]
pub struct RequestTicket<T> {
    generation: u64,
    handle: JoinHandle<T>,
}

impl<T> RequestTicket<T> {
    pub(crate) const fn new(generation: u64, handle: JoinHandle<T>) -> Self {
        Self { generation, handle }
    }

    /// Generation number assigned to the request.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the request to settle.
    ///
    /// Returns `None` when the request task panicked or was aborted.
    pub async fn settled(self) -> Option<T> {
        self.handle.await.ok()
    }
}
