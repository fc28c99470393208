//! Retained worker records
//!
//! The arena is the only state workers mutate concurrently; the coordinator
//! guards it with a single mutex. Records of the latest access call are
//! `live`. Starting a new call retires them to `stale` rather than dropping
//! them: their sessions stay open and inspectable until the arena is drained.

use std::fmt;
use striper_core::{AccessResult, Status, StriperBackend, StriperError};

use crate::session::Session;

/// Opaque index of a retained record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Raw index value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Outcome of one worker, with the session it produced
pub struct WorkerRecord<B: StriperBackend> {
    id: SessionId,
    worker: usize,
    result: AccessResult,
    session: Option<Session<B>>,
}

impl<B: StriperBackend> WorkerRecord<B> {
    /// Arena index
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Worker index within its access call
    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Worker outcome
    pub fn result(&self) -> &AccessResult {
        &self.result
    }

    /// Operation status, `None` if setup failed
    pub fn status(&self) -> Option<Status> {
        self.result.status()
    }

    /// The worker's session, present iff setup succeeded
    pub fn session(&self) -> Option<&Session<B>> {
        self.session.as_ref()
    }
}

impl<B: StriperBackend> fmt::Debug for WorkerRecord<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerRecord")
            .field("id", &self.id)
            .field("worker", &self.worker)
            .field("result", &self.result)
            .field("has_session", &self.session.is_some())
            .finish()
    }
}

/// Counts over the live records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessSummary {
    /// Records in the live set
    pub workers: usize,
    /// Workers whose operation returned a non-negative status
    pub succeeded: usize,
    /// Workers whose operation returned a negative status
    pub operation_failures: usize,
    /// Workers that never got a session
    pub setup_failures: usize,
}

/// Live and retired worker records
pub struct SessionArena<B: StriperBackend> {
    next_id: u64,
    live: Vec<WorkerRecord<B>>,
    stale: Vec<WorkerRecord<B>>,
}

impl<B: StriperBackend> Default for SessionArena<B> {
    fn default() -> Self {
        Self {
            next_id: 0,
            live: Vec::new(),
            stale: Vec::new(),
        }
    }
}

impl<B: StriperBackend> SessionArena<B> {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Move every live record to the stale set
    pub fn retire_live(&mut self) {
        self.stale.append(&mut self.live);
    }

    /// Record a worker outcome and return its id
    pub fn insert(
        &mut self,
        worker: usize,
        result: AccessResult,
        session: Option<Session<B>>,
    ) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.live.push(WorkerRecord {
            id,
            worker,
            result,
            session,
        });
        id
    }

    /// Records of the latest access call, in completion order
    pub fn live(&self) -> &[WorkerRecord<B>] {
        &self.live
    }

    /// Records retired from earlier access calls
    pub fn stale(&self) -> &[WorkerRecord<B>] {
        &self.stale
    }

    /// Find a live or stale record
    pub fn get(&self, id: SessionId) -> Option<&WorkerRecord<B>> {
        self.live
            .iter()
            .chain(self.stale.iter())
            .find(|r| r.id == id)
    }

    /// Number of live records holding a session
    pub fn live_sessions(&self) -> usize {
        self.live.iter().filter(|r| r.session.is_some()).count()
    }

    /// Number of sessions held across live and stale records
    pub fn total_sessions(&self) -> usize {
        self.live_sessions() + self.stale.iter().filter(|r| r.session.is_some()).count()
    }

    /// Take the stale records out. The caller drops them outside the lock.
    pub fn drain_stale(&mut self) -> Vec<WorkerRecord<B>> {
        std::mem::take(&mut self.stale)
    }

    /// Take every record out, stale first
    pub fn drain_all(&mut self) -> Vec<WorkerRecord<B>> {
        let mut all = std::mem::take(&mut self.stale);
        all.append(&mut self.live);
        all
    }

    /// Results of the live records
    pub fn results(&self) -> Vec<AccessResult> {
        self.live.iter().map(|r| r.result.clone()).collect()
    }

    /// Setup errors of the live records
    pub fn setup_failures(&self) -> Vec<StriperError> {
        self.live
            .iter()
            .filter_map(|r| r.result.setup_error().cloned())
            .collect()
    }

    /// Tally of the live records
    pub fn summary(&self) -> AccessSummary {
        let mut summary = AccessSummary {
            workers: self.live.len(),
            ..AccessSummary::default()
        };
        for record in &self.live {
            match record.result {
                AccessResult::SetupFailed(_) => summary.setup_failures += 1,
                AccessResult::Completed(status) if status >= 0 => summary.succeeded += 1,
                AccessResult::Completed(_) => summary.operation_failures += 1,
            }
        }
        summary
    }
}
