//! Rotating status phrases shown while a playlist is being optimized.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Phrases cycled through by the loading overlay, in display order.
pub const LOADING_PHRASES: [&str; 26] = [
    "Calculating song key compatibility...",
    "Minimizing tempo differences...",
    "Comparing and contrasting genres...",
    "Finalizing the optimal playlist...",
    "Analyzing the vibe...",
    "Dusting off the turntables...",
    "Harmonizing melodies...",
    "Syncing beats per minute...",
    "Discovering hidden gems...",
    "Shuffling the deck...",
    "Fine-tuning the playlist...",
    "Crossfading tracks...",
    "Setting the groove...",
    "Calculating the perfect mix...",
    "Blending musical flavors...",
    "Balancing energy levels...",
    "Creating the ultimate auditory experience...",
    "Matching moods and emotions...",
    "Finding the right rhythm...",
    "Mixing tempos and keys...",
    "Preparing for the grand finale...",
    "Optimizing track transitions...",
    "Scouring the music archives...",
    "Bringing the beat back...",
    "Adding a touch of magic...",
    "Curating the perfect setlist...",
];

/// Cursor over [`LOADING_PHRASES`] that wraps around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhraseCycle {
    index: usize,
}

impl PhraseCycle {
    /// Cursor positioned on the first phrase.
    #[must_use]
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    /// Phrase under the cursor.
    #[must_use]
    pub const fn current(&self) -> &'static str {
        LOADING_PHRASES[self.index]
    }

    /// Move to the next phrase and return it.
    pub const fn advance(&mut self) -> &'static str {
        self.index = (self.index + 1) % LOADING_PHRASES.len();
        self.current()
    }
}

/// Repeating timer that invokes a callback once per period.
///
/// The first callback fires one period after start. Dropping the ticker
/// aborts its task, so no callback runs after the owner lets go of it.
#[derive(Debug)]
pub struct StatusTicker {
    task: JoinHandle<()>,
}

impl StatusTicker {
    /// Spawn the timer on the current tokio runtime.
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                on_tick();
            }
        });
        Self { task }
    }

    /// Whether the timer task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
