//! Scripted fakes for the gateway traits.
//!
//! Replies are queued per operation. A queued reply can be ready, gated on a
//! oneshot sender held by the test, or pending forever. Every call is recorded
//! before its reply is awaited, and every reply honours the cancel handle.

use std::collections::VecDeque;
use std::future::pending;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;

use audify_api_models::{CompareResponse, OptimizeResponse, TokenPair, UserProfile};
use audify_client::{CancelHandle, GatewayError, GatewayResult, PlaylistBackend, SpotifyAccounts};

use crate::fixtures::sample_tokens;

enum Reply<T> {
    Ready(GatewayResult<T>),
    Gated(oneshot::Receiver<GatewayResult<T>>),
    Pending,
}

impl<T> Reply<T> {
    async fn resolve(self, cancel: &CancelHandle) -> GatewayResult<T> {
        cancel
            .run(async move {
                match self {
                    Self::Ready(outcome) => outcome,
                    Self::Gated(receiver) => receiver.await.unwrap_or_else(|_| {
                        Err(GatewayError::Network {
                            endpoint: "fake".to_string(),
                            message: "reply gate dropped".to_string(),
                        })
                    }),
                    Self::Pending => pending().await,
                }
            })
            .await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Arguments of one recorded reorder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderCall {
    /// Playlist id sent to the backend.
    pub playlist_id: String,
    /// Ordered track URIs.
    pub uris: Vec<String>,
    /// Bearer token used.
    pub access_token: String,
}

/// Scripted [`PlaylistBackend`].
///
/// Unscripted calls succeed: optimize with no tracks, compare with `0.0`, and
/// reorder with the backend's success message.
#[derive(Default)]
pub struct FakeBackend {
    optimize_replies: Mutex<VecDeque<Reply<OptimizeResponse>>>,
    compare_replies: Mutex<VecDeque<Reply<CompareResponse>>>,
    reorder_replies: Mutex<VecDeque<GatewayResult<String>>>,
    optimize_calls: Mutex<Vec<String>>,
    compare_calls: Mutex<Vec<(String, String)>>,
    reorder_calls: Mutex<Vec<ReorderCall>>,
}

impl FakeBackend {
    /// Backend with no scripted replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an immediate optimize outcome.
    pub fn push_optimize(&self, outcome: GatewayResult<OptimizeResponse>) {
        lock(&self.optimize_replies).push_back(Reply::Ready(outcome));
    }

    /// Queue an optimize reply released through the returned sender.
    #[must_use]
    pub fn gate_optimize(&self) -> oneshot::Sender<GatewayResult<OptimizeResponse>> {
        let (sender, receiver) = oneshot::channel();
        lock(&self.optimize_replies).push_back(Reply::Gated(receiver));
        sender
    }

    /// Queue an optimize reply that never arrives.
    pub fn hang_optimize(&self) {
        lock(&self.optimize_replies).push_back(Reply::Pending);
    }

    /// Queue an immediate compare outcome.
    pub fn push_compare(&self, outcome: GatewayResult<CompareResponse>) {
        lock(&self.compare_replies).push_back(Reply::Ready(outcome));
    }

    /// Queue a compare reply released through the returned sender.
    #[must_use]
    pub fn gate_compare(&self) -> oneshot::Sender<GatewayResult<CompareResponse>> {
        let (sender, receiver) = oneshot::channel();
        lock(&self.compare_replies).push_back(Reply::Gated(receiver));
        sender
    }

    /// Queue a compare reply that never arrives.
    pub fn hang_compare(&self) {
        lock(&self.compare_replies).push_back(Reply::Pending);
    }

    /// Queue a reorder outcome.
    pub fn push_reorder(&self, outcome: GatewayResult<String>) {
        lock(&self.reorder_replies).push_back(outcome);
    }

    /// Links passed to optimize, in call order.
    #[must_use]
    pub fn optimize_calls(&self) -> Vec<String> {
        lock(&self.optimize_calls).clone()
    }

    /// Link pairs passed to compare, in call order.
    #[must_use]
    pub fn compare_calls(&self) -> Vec<(String, String)> {
        lock(&self.compare_calls).clone()
    }

    /// Recorded reorder calls.
    #[must_use]
    pub fn reorder_calls(&self) -> Vec<ReorderCall> {
        lock(&self.reorder_calls).clone()
    }

    /// Yield until at least `count` optimize calls were recorded.
    pub async fn wait_for_optimize_calls(&self, count: usize) {
        while lock(&self.optimize_calls).len() < count {
            tokio::task::yield_now().await;
        }
    }

    /// Yield until at least `count` compare calls were recorded.
    pub async fn wait_for_compare_calls(&self, count: usize) {
        while lock(&self.compare_calls).len() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl PlaylistBackend for FakeBackend {
    async fn optimize_playlist(
        &self,
        playlist_link: &str,
        cancel: &CancelHandle,
    ) -> GatewayResult<OptimizeResponse> {
        lock(&self.optimize_calls).push(playlist_link.to_string());
        let reply = lock(&self.optimize_replies)
            .pop_front()
            .unwrap_or_else(|| Reply::Ready(Ok(OptimizeResponse::default())));
        reply.resolve(cancel).await
    }

    async fn reorder_playlist(
        &self,
        playlist_id: &str,
        ordered_uris: &[String],
        access_token: &str,
    ) -> GatewayResult<String> {
        lock(&self.reorder_calls).push(ReorderCall {
            playlist_id: playlist_id.to_string(),
            uris: ordered_uris.to_vec(),
            access_token: access_token.to_string(),
        });
        lock(&self.reorder_replies)
            .pop_front()
            .unwrap_or_else(|| Ok("Playlist reordered successfully".to_string()))
    }

    async fn compare_playlists(
        &self,
        first_link: &str,
        second_link: &str,
        cancel: &CancelHandle,
    ) -> GatewayResult<CompareResponse> {
        lock(&self.compare_calls).push((first_link.to_string(), second_link.to_string()));
        let reply = lock(&self.compare_replies).pop_front().unwrap_or_else(|| {
            Reply::Ready(Ok(CompareResponse {
                similarity_percentage: 0.0,
            }))
        });
        reply.resolve(cancel).await
    }
}

/// Scripted [`SpotifyAccounts`].
///
/// Unscripted exchanges return [`sample_tokens`]; unscripted profile lookups
/// return an empty profile.
#[derive(Default)]
pub struct FakeAccounts {
    exchange_replies: Mutex<VecDeque<GatewayResult<TokenPair>>>,
    profile_replies: Mutex<VecDeque<GatewayResult<UserProfile>>>,
    exchange_calls: Mutex<Vec<String>>,
    profile_calls: Mutex<Vec<String>>,
}

impl FakeAccounts {
    /// Accounts fake with no scripted replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a code exchange outcome.
    pub fn push_exchange(&self, outcome: GatewayResult<TokenPair>) {
        lock(&self.exchange_replies).push_back(outcome);
    }

    /// Queue a profile lookup outcome.
    pub fn push_profile(&self, outcome: GatewayResult<UserProfile>) {
        lock(&self.profile_replies).push_back(outcome);
    }

    /// Codes passed to the exchange, in call order.
    #[must_use]
    pub fn exchange_calls(&self) -> Vec<String> {
        lock(&self.exchange_calls).clone()
    }

    /// Access tokens used for profile lookups.
    #[must_use]
    pub fn profile_calls(&self) -> Vec<String> {
        lock(&self.profile_calls).clone()
    }
}

#[async_trait]
impl SpotifyAccounts for FakeAccounts {
    async fn exchange_code(&self, auth_code: &str) -> GatewayResult<TokenPair> {
        lock(&self.exchange_calls).push(auth_code.to_string());
        lock(&self.exchange_replies)
            .pop_front()
            .unwrap_or_else(|| Ok(sample_tokens()))
    }

    async fn user_profile(&self, access_token: &str) -> GatewayResult<UserProfile> {
        lock(&self.profile_calls).push(access_token.to_string());
        lock(&self.profile_replies)
            .pop_front()
            .unwrap_or_else(|| Ok(UserProfile::default()))
    }
}
