//! Single-flight coordination of access token refreshes
//!
//! Requests that observe a 401 are parked here as [`PendingRequest`]s. The
//! first one to arrive while idle becomes responsible for starting the refresh;
//! everyone else only waits on their completion handle.

use super::error::ClientError;
use super::request::ApiRequest;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;

pub(crate) type Reply = oneshot::Sender<Result<Value, ClientError>>;

/// A request waiting for the in-flight refresh to settle
#[derive(Debug)]
pub struct PendingRequest {
    pub request: ApiRequest,
    pub(crate) reply: Reply,
}

impl PendingRequest {
    /// Park a request and get the receiving half of its completion handle
    pub(crate) fn new(
        request: ApiRequest,
    ) -> (Self, oneshot::Receiver<Result<Value, ClientError>>) {
        let (reply, rx) = oneshot::channel();
        (Self { request, reply }, rx)
    }

    /// Complete the waiting caller; a caller that went away is ignored
    pub(crate) fn complete(self, result: Result<Value, ClientError>) {
        let _ = self.reply.send(result);
    }
}

/// What a request that got 401 should do next
#[derive(Debug)]
pub enum RefreshRole {
    /// Queued; the caller must start the refresh
    Leader,
    /// Queued behind the refresh already in flight
    Follower,
    /// The stored token changed after the request was sent; resend it as is
    Replay {
        access_token: String,
        request: ApiRequest,
    },
}

#[derive(Debug, Default)]
struct RefreshState {
    refreshing: bool,
    queue: Vec<PendingRequest>,
}

/// Per-client refresh state machine: idle or refreshing, plus the queue
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        // Every critical section leaves the state consistent
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Start-or-join: queue the request and move idle -> refreshing
    ///
    /// `sent_with` is the token the request carried. While idle, the stored
    /// token is re-read under the lock: a refresh that settled after the
    /// request was sent has already stored a new token, so the request is
    /// handed back for a direct replay instead of spending the refresh token
    /// again.
    pub(crate) fn enqueue<F>(
        &self,
        pending: PendingRequest,
        sent_with: Option<&str>,
        current_token: F,
    ) -> RefreshRole
    where
        F: FnOnce() -> Option<String>,
    {
        let mut state = self.lock();
        if state.refreshing {
            state.queue.push(pending);
            return RefreshRole::Follower;
        }

        if let Some(current) = current_token() {
            if sent_with != Some(current.as_str()) {
                return RefreshRole::Replay {
                    access_token: current,
                    request: pending.request,
                };
            }
        }

        state.queue.push(pending);
        state.refreshing = true;
        RefreshRole::Leader
    }

    /// Move refreshing -> idle and hand back every queued request in order
    ///
    /// Both happen under one lock, so a 401 observed afterwards starts a new
    /// refresh instead of joining the one that just settled.
    pub(crate) fn settle(&self) -> Vec<PendingRequest> {
        let mut state = self.lock();
        state.refreshing = false;
        std::mem::take(&mut state.queue)
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    pub fn pending_len(&self) -> usize {
        self.lock().queue.len()
    }
}
