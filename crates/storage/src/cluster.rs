//! In-memory cluster implementing the client-library traits
//!
//! `MemCluster` is cheap to clone; clones share the same pools, counters and
//! fault injector. Asynchronous operations run on short-lived completion
//! threads, so a worker waiting on its completion really blocks on another
//! thread, as it would against a remote cluster.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use striper_core::errno::{self, to_status};
use striper_core::{
    PoolLifecycle, SharedBuffer, Status, StripeLayout, StriperBackend, StriperError, StriperResult,
};
use tracing::{debug, info, warn};

use crate::completion::MemCompletion;
use crate::fault::FaultInjector;
use crate::handles::{HandleGuard, HandleKind, MemClusterHandle, MemIoContext, MemStriper};
use crate::object::StripedObject;
use crate::pool::PoolState;

/// Largest logical object size a write may produce (1 TiB)
pub const MAX_OBJECT_SIZE: u64 = 1 << 40;

/// Shared state behind every clone of a [`MemCluster`]
#[derive(Debug, Default)]
pub(crate) struct ClusterInner {
    pools: DashMap<String, Arc<PoolState>>,
    faults: FaultInjector,
    clients: AtomicUsize,
    io_contexts: AtomicUsize,
    stripers: AtomicUsize,
    pending_aio: AtomicUsize,
    total_connects: AtomicU64,
    next_client_id: AtomicU64,
    io_latency_us: AtomicU64,
}

impl ClusterInner {
    pub(crate) fn counter(&self, kind: HandleKind) -> &AtomicUsize {
        match kind {
            HandleKind::Client => &self.clients,
            HandleKind::IoContext => &self.io_contexts,
            HandleKind::Striper => &self.stripers,
            HandleKind::PendingAio => &self.pending_aio,
        }
    }

    fn io_latency(&self) -> Duration {
        Duration::from_micros(self.io_latency_us.load(Ordering::Relaxed))
    }
}

/// Snapshot of live handle counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterStats {
    /// Open cluster connections
    pub clients: usize,
    /// Open I/O contexts
    pub io_contexts: usize,
    /// Open striper handles
    pub stripers: usize,
    /// Asynchronous operations not yet completed
    pub pending_aio: usize,
    /// Existing pools
    pub pools: usize,
    /// Connections ever opened
    pub total_connects: u64,
}

impl ClusterStats {
    /// True when no connection, context, striper or operation is outstanding
    pub fn is_quiescent(&self) -> bool {
        self.clients == 0 && self.io_contexts == 0 && self.stripers == 0 && self.pending_aio == 0
    }
}

/// In-process cluster: the reference binding of the harness traits
#[derive(Debug, Clone, Default)]
pub struct MemCluster {
    inner: Arc<ClusterInner>,
}

impl MemCluster {
    /// Create an empty cluster
    pub fn new() -> Self {
        Self::default()
    }

    /// Fault injector for session setup
    pub fn faults(&self) -> &FaultInjector {
        &self.inner.faults
    }

    /// Delay applied to every read, write and asynchronous operation.
    ///
    /// A small latency makes workers overlap reliably in race tests.
    pub fn set_io_latency(&self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.inner.io_latency_us.store(micros, Ordering::Relaxed);
    }

    /// Live handle counts
    pub fn stats(&self) -> ClusterStats {
        ClusterStats {
            clients: self.inner.clients.load(Ordering::Acquire),
            io_contexts: self.inner.io_contexts.load(Ordering::Acquire),
            stripers: self.inner.stripers.load(Ordering::Acquire),
            pending_aio: self.inner.pending_aio.load(Ordering::Acquire),
            pools: self.inner.pools.len(),
            total_connects: self.inner.total_connects.load(Ordering::Acquire),
        }
    }

    /// True if `pool` exists
    pub fn pool_exists(&self, pool: &str) -> bool {
        self.inner.pools.contains_key(pool)
    }

    /// Look up a pool
    pub fn pool(&self, pool: &str) -> Option<Arc<PoolState>> {
        self.inner.pools.get(pool).map(|p| Arc::clone(p.value()))
    }

    /// Look up a striped object
    pub fn object(&self, pool: &str, oid: &str) -> Option<Arc<StripedObject>> {
        self.pool(pool).and_then(|p| p.object(oid))
    }

    /// Sorted names of existing pools
    pub fn pool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.pools.iter().map(|p| p.key().clone()).collect();
        names.sort();
        names
    }

    fn simulate_latency(&self) {
        let latency = self.inner.io_latency();
        if !latency.is_zero() {
            thread::sleep(latency);
        }
    }

    /// Common argument checks for every I/O call
    fn check_io(striper: &MemStriper, buf: &SharedBuffer, len: usize) -> Result<(), Status> {
        if len > buf.len() {
            return Err(to_status(errno::EINVAL));
        }
        if striper.pool.is_deleted() {
            return Err(to_status(errno::ENOENT));
        }
        Ok(())
    }

    /// Writes must end at or below `MAX_OBJECT_SIZE`
    fn check_write_extent(offset: u64, len: usize) -> Result<(), Status> {
        match offset.checked_add(len as u64) {
            Some(end) if end <= MAX_OBJECT_SIZE => Ok(()),
            _ => Err(to_status(errno::EFBIG)),
        }
    }

    /// Run `op` on a completion thread and signal `completion` with its status.
    ///
    /// Returns the submission status.
    fn submit<F>(&self, completion: &MemCompletion, op: F) -> Status
    where
        F: FnOnce() -> Status + Send + 'static,
    {
        let pending = HandleGuard::acquire(&self.inner, HandleKind::PendingAio);
        let completion = completion.clone();
        let latency = self.inner.io_latency();
        let spawned = thread::Builder::new()
            .name("mem-aio".to_string())
            .spawn(move || {
                if !latency.is_zero() {
                    thread::sleep(latency);
                }
                let status = op();
                drop(pending);
                completion.complete(status);
            });
        match spawned {
            Ok(_) => 0,
            Err(e) => {
                warn!(target: "striper::mem", error = %e, "Failed to start completion thread");
                to_status(errno::ENOMEM)
            }
        }
    }
}

fn read_into(obj: &StripedObject, buf: &SharedBuffer, len: usize, offset: u64) -> Status {
    obj.read_with(offset, len as u64, |at, src| {
        buf.store(at, src);
    }) as Status
}

impl StriperBackend for MemCluster {
    type Cluster = MemClusterHandle;
    type IoContext = MemIoContext;
    type Striper = MemStriper;
    type Completion = MemCompletion;

    fn connect(&self) -> StriperResult<MemClusterHandle> {
        if let Some(code) = self.inner.faults.take_connect() {
            debug!(target: "striper::mem", code, "Injected connect failure");
            return Err(StriperError::Connection { code });
        }
        let client_id = self.inner.next_client_id.fetch_add(1, Ordering::Relaxed);
        self.inner.total_connects.fetch_add(1, Ordering::Relaxed);
        Ok(MemClusterHandle::new(&self.inner, client_id))
    }

    fn bind_io_context(&self, cluster: &MemClusterHandle, pool: &str) -> StriperResult<MemIoContext> {
        if let Some(code) = self.inner.faults.take_bind() {
            debug!(target: "striper::mem", code, pool, "Injected bind failure");
            return Err(StriperError::Bind {
                pool: pool.to_string(),
                code,
            });
        }
        let state = self.pool(pool).ok_or_else(|| StriperError::Bind {
            pool: pool.to_string(),
            code: errno::ENOENT,
        })?;
        Ok(MemIoContext::new(&self.inner, cluster.client_id(), state))
    }

    fn create_striper(&self, ioctx: &MemIoContext) -> StriperResult<MemStriper> {
        if let Some(code) = self.inner.faults.take_striper() {
            debug!(target: "striper::mem", code, "Injected striper creation failure");
            return Err(StriperError::SessionCreation { code });
        }
        if ioctx.pool.is_deleted() {
            return Err(StriperError::SessionCreation {
                code: errno::ENOENT,
            });
        }
        Ok(MemStriper::new(&self.inner, ioctx))
    }

    fn set_layout(&self, striper: &mut MemStriper, layout: StripeLayout) -> StriperResult<()> {
        layout.validate()?;
        striper.layout = layout;
        Ok(())
    }

    fn read(
        &self,
        striper: &MemStriper,
        oid: &str,
        buf: &SharedBuffer,
        len: usize,
        offset: u64,
    ) -> Status {
        if let Err(status) = Self::check_io(striper, buf, len) {
            return status;
        }
        self.simulate_latency();
        match striper.pool.object(oid) {
            Some(obj) => read_into(&obj, buf, len, offset),
            None => to_status(errno::ENOENT),
        }
    }

    fn write(
        &self,
        striper: &MemStriper,
        oid: &str,
        buf: &SharedBuffer,
        len: usize,
        offset: u64,
    ) -> Status {
        if let Err(status) = Self::check_io(striper, buf, len) {
            return status;
        }
        if let Err(status) = Self::check_write_extent(offset, len) {
            return status;
        }
        self.simulate_latency();
        if len == 0 {
            return 0;
        }
        let obj = striper.pool.object_or_create(oid, striper.layout);
        // Source bytes are loaded chunk by chunk, straight from the shared buffer
        obj.write_with(offset, len as u64, |at, dst| {
            buf.load(at, dst);
        });
        len as Status
    }

    fn create_completion(&self) -> MemCompletion {
        MemCompletion::new()
    }

    fn aio_read(
        &self,
        striper: &MemStriper,
        oid: &str,
        completion: &MemCompletion,
        buf: &SharedBuffer,
        len: usize,
        offset: u64,
    ) -> Status {
        if let Err(status) = Self::check_io(striper, buf, len) {
            return status;
        }
        let pool = Arc::clone(&striper.pool);
        let oid = oid.to_string();
        let buf = buf.clone();
        self.submit(completion, move || match pool.object(&oid) {
            Some(obj) => read_into(&obj, &buf, len, offset),
            None => to_status(errno::ENOENT),
        })
    }

    fn aio_write(
        &self,
        striper: &MemStriper,
        oid: &str,
        completion: &MemCompletion,
        buf: &SharedBuffer,
        len: usize,
        offset: u64,
    ) -> Status {
        if let Err(status) = Self::check_io(striper, buf, len) {
            return status;
        }
        if let Err(status) = Self::check_write_extent(offset, len) {
            return status;
        }
        if len == 0 {
            completion.complete(0);
            return 0;
        }
        // Write payload is captured at submission
        let data = buf.read_range(0, len);
        let obj = striper.pool.object_or_create(oid, striper.layout);
        self.submit(completion, move || {
            obj.write_bytes(offset, &data);
            data.len() as Status
        })
    }

    fn wait_for_completion(&self, completion: &MemCompletion) {
        completion.wait();
    }

    fn completion_status(&self, completion: &MemCompletion) -> Option<Status> {
        completion.status()
    }

    fn release_completion(&self, completion: MemCompletion) {
        drop(completion);
    }
}

impl PoolLifecycle for MemCluster {
    fn create_pool(&self, pool: &str) -> StriperResult<MemClusterHandle> {
        let cluster = self.connect()?;
        match self.inner.pools.entry(pool.to_string()) {
            Entry::Occupied(_) => {
                return Err(StriperError::PoolExists {
                    pool: pool.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(PoolState::new(pool)));
            }
        }
        info!(target: "striper::mem", pool, "Pool created");
        Ok(cluster)
    }

    fn destroy_pool(&self, pool: &str, cluster: MemClusterHandle) -> StriperResult<()> {
        let (_, state) = self
            .inner
            .pools
            .remove(pool)
            .ok_or_else(|| StriperError::PoolNotFound {
                pool: pool.to_string(),
            })?;
        state.mark_deleted();
        drop(cluster);
        info!(target: "striper::mem", pool, objects = state.object_count(), "Pool destroyed");
        Ok(())
    }
}
