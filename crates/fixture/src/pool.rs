//! Temporary pools
//!
//! A `TempPool` owns a uniquely named pool for as long as it lives. The
//! connection that created the pool is kept and used to destroy it again.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use striper_concurrency::{ParallelAccess, SessionFactory};
use striper_core::{temp_pool_name, PoolLifecycle, StriperError, StriperResult};
use tracing::{info, warn};

/// A pool that exists exactly as long as this value
pub struct TempPool<B: PoolLifecycle> {
    backend: Arc<B>,
    name: String,
    admin: Mutex<Option<B::Cluster>>,
}

impl<B: PoolLifecycle> TempPool<B> {
    /// Create a pool named `{prefix}-{pid}-{counter}-{uuid8}`.
    ///
    /// # Errors
    ///
    /// Returns the pool creation error.
    pub fn create(backend: Arc<B>, prefix: &str) -> StriperResult<Self> {
        Self::create_named(backend, temp_pool_name(prefix))
    }

    /// Create a pool with an exact name.
    ///
    /// # Errors
    ///
    /// `PoolExists` if the name is taken, or the connection error.
    pub fn create_named(backend: Arc<B>, name: impl Into<String>) -> StriperResult<Self> {
        let name = name.into();
        let admin = backend.create_pool(&name)?;
        info!(target: "striper::pool", pool = %name, "Temporary pool created");
        Ok(Self {
            backend,
            name,
            admin: Mutex::new(Some(admin)),
        })
    }

    /// Pool name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend the pool lives on
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// True until the pool was destroyed
    pub fn is_active(&self) -> bool {
        self.admin.lock().is_some()
    }

    /// Run `f` with the pool-creator connection.
    ///
    /// # Errors
    ///
    /// `PoolNotFound` once the pool was destroyed.
    pub fn with_admin<R>(&self, f: impl FnOnce(&B::Cluster) -> R) -> StriperResult<R> {
        let admin = self.admin.lock();
        match admin.as_ref() {
            Some(cluster) => Ok(f(cluster)),
            None => Err(StriperError::PoolNotFound {
                pool: self.name.clone(),
            }),
        }
    }

    /// Session factory bound to this pool
    pub fn session_factory(&self) -> SessionFactory<B> {
        SessionFactory::new(Arc::clone(&self.backend), self.name.clone())
    }

    /// Coordinator on this pool. The coordinator does not own the pool.
    pub fn parallel_access(&self) -> ParallelAccess<B> {
        ParallelAccess::new(self.session_factory())
    }

    /// Destroy the pool now.
    ///
    /// # Errors
    ///
    /// Returns the pool destruction error.
    pub fn destroy(self) -> StriperResult<()> {
        self.destroy_inner()
    }

    fn destroy_inner(&self) -> StriperResult<()> {
        let admin = self.admin.lock().take();
        match admin {
            Some(cluster) => {
                self.backend.destroy_pool(&self.name, cluster)?;
                info!(target: "striper::pool", pool = %self.name, "Temporary pool destroyed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<B: PoolLifecycle> Drop for TempPool<B> {
    fn drop(&mut self) {
        if let Err(e) = self.destroy_inner() {
            warn!(target: "striper::pool", pool = %self.name, error = %e, "Failed to destroy temporary pool");
        }
    }
}

impl<B: PoolLifecycle> fmt::Debug for TempPool<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempPool")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}
