//! Per-suite shared pools
//!
//! Every test of a suite acquires the same `TempPool` by suite name. The
//! registry only keeps weak references, so the pool is destroyed when the
//! last test holding it finishes.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use striper_core::{PoolLifecycle, StriperError, StriperResult};
use tracing::debug;

use crate::pool::TempPool;

type ErasedPool = dyn Any + Send + Sync;

/// Global registry of suite pools (suite name -> weak reference)
static SUITE_POOLS: Lazy<Mutex<HashMap<String, Weak<ErasedPool>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Shared ownership of one temporary pool per test suite
pub struct SuitePool;

impl SuitePool {
    /// Return the pool of `suite`, creating it with `make` if no test of the
    /// suite currently holds one.
    ///
    /// `make` runs outside the registry lock. If two tests of one suite race,
    /// both may create a pool; the first to register wins and the other pool
    /// is destroyed before this returns.
    ///
    /// # Errors
    ///
    /// Returns the error from `make`, or `InvalidConfig` if the suite's pool
    /// lives on a different backend type.
    pub fn acquire<B, F>(suite: &str, make: F) -> StriperResult<Arc<TempPool<B>>>
    where
        B: PoolLifecycle + 'static,
        B::Cluster: 'static,
        F: FnOnce() -> StriperResult<TempPool<B>>,
    {
        if let Some(existing) = Self::lookup::<B>(suite)? {
            return Ok(existing);
        }

        // Created without the registry lock so other suites are not held up
        let created = Arc::new(make()?);

        let mut pools = SUITE_POOLS.lock();
        if let Some(existing) = pools.get(suite).and_then(Weak::upgrade) {
            // Another test of the suite won the race; ours is destroyed on drop
            drop(pools);
            debug!(target: "striper::suite", suite, pool = %created.name(), "Discarding duplicate suite pool");
            return Self::downcast(suite, existing);
        }
        let erased: Arc<ErasedPool> = created.clone();
        pools.insert(suite.to_string(), Arc::downgrade(&erased));
        drop(pools);

        debug!(target: "striper::suite", suite, pool = %created.name(), "Suite pool created");
        Ok(created)
    }

    fn lookup<B>(suite: &str) -> StriperResult<Option<Arc<TempPool<B>>>>
    where
        B: PoolLifecycle + 'static,
        B::Cluster: 'static,
    {
        let existing = SUITE_POOLS.lock().get(suite).and_then(Weak::upgrade);
        existing.map(|pool| Self::downcast(suite, pool)).transpose()
    }

    fn downcast<B>(suite: &str, pool: Arc<ErasedPool>) -> StriperResult<Arc<TempPool<B>>>
    where
        B: PoolLifecycle + 'static,
        B::Cluster: 'static,
    {
        pool.downcast::<TempPool<B>>().map_err(|_| {
            StriperError::InvalidConfig(format!(
                "suite '{}' already holds a pool of another backend type",
                suite
            ))
        })
    }

    /// True while some test of `suite` holds its pool
    pub fn is_active(suite: &str) -> bool {
        SUITE_POOLS
            .lock()
            .get(suite)
            .map_or(false, |weak| weak.strong_count() > 0)
    }

    /// Forget registry entries whose pool has been released.
    ///
    /// Returns the number of entries removed.
    pub fn prune() -> usize {
        let mut pools = SUITE_POOLS.lock();
        let before = pools.len();
        pools.retain(|_, weak| weak.strong_count() > 0);
        before - pools.len()
    }
}
