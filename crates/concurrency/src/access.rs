//! Parallel access coordinator
//!
//! `ParallelAccess` runs one operation on N workers at once. Every worker
//! opens its own session, runs the operation against the shared object (the
//! object named after the pool, at offset 0), and records its outcome. The
//! coordinator returns only after every worker was joined and recorded.
//!
//! # Locking
//!
//! The arena mutex is the only lock the harness takes. It is held for the
//! insertion of one record, never across session setup or I/O, so the
//! operations themselves run fully in parallel.
//!
//! # Shared buffers
//!
//! The convenience entry points hand the same [`SharedBuffer`] to every
//! worker with no synchronization on its contents. Parallel reads into one
//! buffer, or writes out of a buffer someone else is filling, race on
//! purpose; choose buffers according to what the scenario should exercise.

use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use striper_core::{
    temp_pool_name, AccessResult, PoolLifecycle, SharedBuffer, Status, StripeLayout,
    StriperBackend, StriperError, StriperResult,
};
use tracing::{debug, info, warn};

use crate::arena::{AccessSummary, SessionArena, WorkerRecord};
use crate::session::{Session, SessionFactory};

type PoolTeardown = Box<dyn FnOnce() -> StriperResult<()> + Send>;

/// Pool owned by a coordinator, destroyed at teardown
struct OwnedPool {
    name: String,
    destroy: PoolTeardown,
}

/// Coordinates N concurrent clients against one striped object
pub struct ParallelAccess<B: StriperBackend> {
    factory: SessionFactory<B>,
    arena: Mutex<SessionArena<B>>,
    owned_pool: Mutex<Option<OwnedPool>>,
}

impl<B: StriperBackend> ParallelAccess<B> {
    /// Coordinate sessions created by `factory`. The pool is not owned.
    pub fn new(factory: SessionFactory<B>) -> Self {
        Self {
            factory,
            arena: Mutex::new(SessionArena::new()),
            owned_pool: Mutex::new(None),
        }
    }

    /// Coordinate sessions on an existing `pool`
    pub fn for_pool(backend: Arc<B>, pool: impl Into<String>) -> Self {
        Self::new(SessionFactory::new(backend, pool))
    }

    /// Apply `layout` to every session's striper
    pub fn with_layout(mut self, layout: StripeLayout) -> Self {
        self.factory = self.factory.clone().with_layout(layout);
        self
    }

    /// Pool every session binds to
    pub fn pool(&self) -> &str {
        self.factory.pool()
    }

    /// Name of the shared object every worker targets (the pool name)
    pub fn object_name(&self) -> &str {
        self.factory.pool()
    }

    /// Session factory used by workers
    pub fn factory(&self) -> &SessionFactory<B> {
        &self.factory
    }

    /// Run `operation` on `thread_count` parallel workers.
    ///
    /// Previously retained records are retired first (they stay open until
    /// drained or torn down). Each worker creates a session; if that fails it
    /// records `SetupFailed` and never runs the operation. Otherwise it runs
    /// the operation and records `Completed(status)` together with its
    /// session. Returns once every worker was joined.
    ///
    /// A panic inside `operation` is re-raised here after all workers were
    /// joined.
    pub fn access<F>(&self, operation: F, thread_count: usize)
    where
        F: Fn(&Session<B>) -> Status + Sync,
    {
        self.arena.lock().retire_live();

        debug!(target: "striper::access", pool = %self.pool(), threads = thread_count, "Parallel access started");
        let started = Instant::now();
        let operation = &operation;
        let mut first_panic: Option<Box<dyn Any + Send>> = None;

        thread::scope(|scope| {
            let mut workers = Vec::with_capacity(thread_count);
            for worker in 0..thread_count {
                let spawned = thread::Builder::new()
                    .name(format!("striper-worker-{}", worker))
                    .spawn_scoped(scope, move || self.run_worker(worker, operation));
                match spawned {
                    Ok(handle) => workers.push(handle),
                    Err(e) => {
                        warn!(target: "striper::access", worker, error = %e, "Failed to spawn worker");
                        self.record(worker, AccessResult::SetupFailed(StriperError::from(e)), None);
                    }
                }
            }

            for handle in workers {
                if let Err(payload) = handle.join() {
                    first_panic.get_or_insert(payload);
                }
            }
        });

        if let Some(payload) = first_panic {
            std::panic::resume_unwind(payload);
        }

        let summary = self.summary();
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        info!(
            target: "striper::access",
            pool = %self.pool(),
            workers = summary.workers,
            succeeded = summary.succeeded,
            operation_failures = summary.operation_failures,
            setup_failures = summary.setup_failures,
            elapsed_us,
            "Parallel access finished"
        );
    }

    fn run_worker<F>(&self, worker: usize, operation: &F)
    where
        F: Fn(&Session<B>) -> Status + Sync,
    {
        match self.factory.create_session() {
            Ok(session) => {
                let status = operation(&session);
                debug!(target: "striper::access", worker, status, "Worker finished");
                self.record(worker, AccessResult::Completed(status), Some(session));
            }
            Err(e) => self.record(worker, AccessResult::SetupFailed(e), None),
        }
    }

    fn record(&self, worker: usize, result: AccessResult, session: Option<Session<B>>) {
        self.arena.lock().insert(worker, result, session);
    }

    /// Blocking read of `size` bytes at offset 0 into `buf` on every worker
    pub fn sync_read(&self, buf: &SharedBuffer, size: usize, thread_count: usize) {
        let oid = self.object_name();
        self.access(|session| session.read(oid, buf, size, 0), thread_count);
    }

    /// Blocking write of `size` bytes of `buf` at offset 0 on every worker
    pub fn sync_write(&self, buf: &SharedBuffer, size: usize, thread_count: usize) {
        let oid = self.object_name();
        self.access(|session| session.write(oid, buf, size, 0), thread_count);
    }

    /// Asynchronous read on every worker; each worker waits for its own completion
    pub fn async_read(&self, buf: &SharedBuffer, size: usize, thread_count: usize) {
        let oid = self.object_name();
        self.access(
            |session| {
                submit_and_wait(session, |completion| {
                    session.aio_read(oid, completion, buf, size, 0)
                })
            },
            thread_count,
        );
    }

    /// Asynchronous write on every worker; each worker waits for its own completion
    pub fn async_write(&self, buf: &SharedBuffer, size: usize, thread_count: usize) {
        let oid = self.object_name();
        self.access(
            |session| {
                submit_and_wait(session, |completion| {
                    session.aio_write(oid, completion, buf, size, 0)
                })
            },
            thread_count,
        );
    }

    /// Results of the latest access call, in completion order
    pub fn results(&self) -> Vec<AccessResult> {
        self.arena.lock().results()
    }

    /// Live sessions from the latest access call
    pub fn session_count(&self) -> usize {
        self.arena.lock().live_sessions()
    }

    /// Records retired from earlier access calls and not yet drained
    pub fn stale_count(&self) -> usize {
        self.arena.lock().stale().len()
    }

    /// Setup errors of the latest access call
    pub fn setup_failures(&self) -> Vec<StriperError> {
        self.arena.lock().setup_failures()
    }

    /// Tally of the latest access call
    pub fn summary(&self) -> AccessSummary {
        self.arena.lock().summary()
    }

    /// Inspect the live records under the arena lock
    pub fn with_records<R>(&self, f: impl FnOnce(&[WorkerRecord<B>]) -> R) -> R {
        f(self.arena.lock().live())
    }

    /// Inspect the stale records under the arena lock
    pub fn with_stale_records<R>(&self, f: impl FnOnce(&[WorkerRecord<B>]) -> R) -> R {
        f(self.arena.lock().stale())
    }

    /// Release the sessions retired by earlier access calls.
    ///
    /// Returns the number of records released.
    pub fn drain_stale(&self) -> usize {
        let drained = self.arena.lock().drain_stale();
        let count = drained.len();
        // Sessions close outside the lock
        drop(drained);
        debug!(target: "striper::access", pool = %self.pool(), count, "Stale sessions released");
        count
    }

    /// Release every retained session, then destroy the pool if this
    /// coordinator owns it.
    ///
    /// Idempotent; also run on drop.
    ///
    /// # Errors
    ///
    /// Returns the pool destruction error.
    pub fn teardown(&self) -> StriperResult<()> {
        let drained = self.arena.lock().drain_all();
        let released = drained.len();
        drop(drained);

        let owned = self.owned_pool.lock().take();
        if let Some(pool) = owned {
            (pool.destroy)()?;
            info!(target: "striper::pool", pool = %pool.name, released, "Coordinator pool destroyed");
        }
        Ok(())
    }
}

impl<B> ParallelAccess<B>
where
    B: PoolLifecycle + 'static,
    B::Cluster: 'static,
{
    /// Create a temporary pool named from `prefix` and coordinate sessions on it.
    ///
    /// The pool is destroyed at teardown, after every retained session was
    /// released.
    ///
    /// # Errors
    ///
    /// Returns the pool creation error.
    pub fn with_temp_pool(backend: Arc<B>, prefix: &str) -> StriperResult<Self> {
        let name = temp_pool_name(prefix);
        let cluster = backend.create_pool(&name)?;

        let destroy_backend = Arc::clone(&backend);
        let destroy_name = name.clone();
        let destroy: PoolTeardown =
            Box::new(move || destroy_backend.destroy_pool(&destroy_name, cluster));

        let access = Self::for_pool(backend, name.clone());
        *access.owned_pool.lock() = Some(OwnedPool { name, destroy });
        Ok(access)
    }
}

impl<B: StriperBackend> Drop for ParallelAccess<B> {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            warn!(target: "striper::access", pool = %self.pool(), error = %e, "Coordinator teardown failed");
        }
    }
}

impl<B: StriperBackend> fmt::Debug for ParallelAccess<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena.lock();
        f.debug_struct("ParallelAccess")
            .field("pool", &self.pool())
            .field("live", &arena.live().len())
            .field("stale", &arena.stale().len())
            .finish()
    }
}

/// Create a completion, submit, wait for that completion if the submission
/// was accepted, release it. Returns the submission status.
fn submit_and_wait<B, S>(session: &Session<B>, submit: S) -> Status
where
    B: StriperBackend,
    S: FnOnce(&B::Completion) -> Status,
{
    let backend = session.backend();
    let completion = backend.create_completion();
    let status = submit(&completion);
    if status >= 0 {
        backend.wait_for_completion(&completion);
    }
    backend.release_completion(completion);
    status
}
