//! Client handles of the reference binding
//!
//! Every handle carries a [`HandleGuard`] that counts it in the owning
//! cluster's statistics while alive, so tests can verify that a harness
//! released everything it opened.

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use striper_core::StripeLayout;

use crate::cluster::ClusterInner;
use crate::pool::PoolState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HandleKind {
    Client,
    IoContext,
    Striper,
    PendingAio,
}

/// Counts one live handle of `kind` until dropped
pub(crate) struct HandleGuard {
    inner: Arc<ClusterInner>,
    kind: HandleKind,
}

impl HandleGuard {
    pub(crate) fn acquire(inner: &Arc<ClusterInner>, kind: HandleKind) -> Self {
        inner.counter(kind).fetch_add(1, Ordering::AcqRel);
        Self {
            inner: Arc::clone(inner),
            kind,
        }
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.inner.counter(self.kind).fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for HandleGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandleGuard({:?})", self.kind)
    }
}

/// A connection to a [`MemCluster`](crate::MemCluster)
#[derive(Debug)]
pub struct MemClusterHandle {
    client_id: u64,
    _guard: HandleGuard,
}

impl MemClusterHandle {
    pub(crate) fn new(inner: &Arc<ClusterInner>, client_id: u64) -> Self {
        Self {
            client_id,
            _guard: HandleGuard::acquire(inner, HandleKind::Client),
        }
    }

    /// Unique id of this connection
    pub fn client_id(&self) -> u64 {
        self.client_id
    }
}

/// An I/O context bound to one pool
#[derive(Debug)]
pub struct MemIoContext {
    client_id: u64,
    pub(crate) pool: Arc<PoolState>,
    _guard: HandleGuard,
}

impl MemIoContext {
    pub(crate) fn new(inner: &Arc<ClusterInner>, client_id: u64, pool: Arc<PoolState>) -> Self {
        Self {
            client_id,
            pool,
            _guard: HandleGuard::acquire(inner, HandleKind::IoContext),
        }
    }

    /// Connection this context was opened on
    pub fn client_id(&self) -> u64 {
        self.client_id
    }

    /// Name of the bound pool
    pub fn pool_name(&self) -> &str {
        self.pool.name()
    }
}

/// A striper bound to an I/O context's pool
#[derive(Debug)]
pub struct MemStriper {
    client_id: u64,
    pub(crate) pool: Arc<PoolState>,
    pub(crate) layout: StripeLayout,
    _guard: HandleGuard,
}

impl MemStriper {
    pub(crate) fn new(inner: &Arc<ClusterInner>, ioctx: &MemIoContext) -> Self {
        Self {
            client_id: ioctx.client_id,
            pool: Arc::clone(&ioctx.pool),
            layout: StripeLayout::default(),
            _guard: HandleGuard::acquire(inner, HandleKind::Striper),
        }
    }

    /// Connection this striper was opened on
    pub fn client_id(&self) -> u64 {
        self.client_id
    }

    /// Name of the bound pool
    pub fn pool_name(&self) -> &str {
        self.pool.name()
    }

    /// Layout used for objects this striper creates
    pub fn layout(&self) -> StripeLayout {
        self.layout
    }
}
