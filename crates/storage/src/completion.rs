//! Completion tokens for asynchronous operations

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;
use striper_core::Status;

#[derive(Debug, Default)]
struct CompletionState {
    result: Mutex<Option<Status>>,
    done: Condvar,
}

/// Completion token: signaled once with the operation's return value
///
/// Clones share the same state; the completion thread holds one clone while
/// the caller holds the other.
#[derive(Debug, Clone, Default)]
pub struct MemCompletion {
    state: Arc<CompletionState>,
}

impl MemCompletion {
    /// Create an unsignaled completion
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal completion with `status`, waking every waiter
    pub fn complete(&self, status: Status) {
        let mut result = self.state.result.lock();
        *result = Some(status);
        self.state.done.notify_all();
    }

    /// Block until signaled and return the operation's status
    pub fn wait(&self) -> Status {
        let mut result = self.state.result.lock();
        loop {
            if let Some(status) = *result {
                return status;
            }
            self.state.done.wait(&mut result);
        }
    }

    /// Block until signaled or `timeout` elapses
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Status> {
        let mut result = self.state.result.lock();
        if result.is_none() {
            let _ = self.state.done.wait_for(&mut result, timeout);
        }
        *result
    }

    /// Status if already signaled
    pub fn status(&self) -> Option<Status> {
        *self.state.result.lock()
    }

    /// True once signaled
    pub fn is_complete(&self) -> bool {
        self.status().is_some()
    }
}
