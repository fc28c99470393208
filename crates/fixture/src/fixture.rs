//! Per-test striper fixture
//!
//! Tests of a suite share one pool (see [`SuitePool`](crate::SuitePool)) but
//! each test gets a fresh I/O context and striper on the pool-creator
//! connection. The fixture holds its pool alive until it is dropped.

use std::fmt;
use std::sync::Arc;
use striper_core::{PoolLifecycle, SharedBuffer, Status, StripeLayout, StriperResult};
use tracing::debug;

use crate::cases::LayoutCase;
use crate::pool::TempPool;

/// I/O context and striper for one test
///
/// Fields drop in declaration order: striper, then I/O context, then the
/// test's share of the pool.
pub struct StriperFixture<B: PoolLifecycle> {
    striper: B::Striper,
    ioctx: B::IoContext,
    case: Option<LayoutCase>,
    pool: Arc<TempPool<B>>,
}

impl<B: PoolLifecycle> StriperFixture<B> {
    /// Bind an I/O context to `pool` and create a striper with the default layout.
    ///
    /// # Errors
    ///
    /// `PoolNotFound` if the pool was destroyed, or the bind / striper
    /// creation error.
    pub fn new(pool: &Arc<TempPool<B>>) -> StriperResult<Self> {
        Self::open(pool, None)
    }

    /// Like [`new`](Self::new), then apply the case's layout to the striper.
    ///
    /// # Errors
    ///
    /// As `new`, plus the layout error.
    pub fn with_layout(pool: &Arc<TempPool<B>>, case: LayoutCase) -> StriperResult<Self> {
        Self::open(pool, Some(case))
    }

    fn open(pool: &Arc<TempPool<B>>, case: Option<LayoutCase>) -> StriperResult<Self> {
        let backend = pool.backend();
        let ioctx = pool.with_admin(|admin| backend.bind_io_context(admin, pool.name()))??;
        let mut striper = backend.create_striper(&ioctx)?;
        if let Some(case) = case {
            backend.set_layout(&mut striper, case.layout)?;
        }
        debug!(target: "striper::suite", pool = %pool.name(), case = ?case, "Fixture set up");
        Ok(Self {
            striper,
            ioctx,
            case,
            pool: Arc::clone(pool),
        })
    }

    /// Shared pool
    pub fn pool(&self) -> &TempPool<B> {
        &self.pool
    }

    /// Pool name
    pub fn pool_name(&self) -> &str {
        self.pool.name()
    }

    /// Backend
    pub fn backend(&self) -> &B {
        self.pool.backend()
    }

    /// I/O context handle
    pub fn io_context(&self) -> &B::IoContext {
        &self.ioctx
    }

    /// Striper handle
    pub fn striper(&self) -> &B::Striper {
        &self.striper
    }

    /// Parameterized case, if created with [`with_layout`](Self::with_layout)
    pub fn case(&self) -> Option<LayoutCase> {
        self.case
    }

    /// Layout applied to the striper, if one was set explicitly
    pub fn layout(&self) -> Option<StripeLayout> {
        self.case.map(|c| c.layout)
    }

    /// Blocking striped read
    pub fn read(&self, oid: &str, buf: &SharedBuffer, len: usize, offset: u64) -> Status {
        self.backend().read(&self.striper, oid, buf, len, offset)
    }

    /// Blocking striped write
    pub fn write(&self, oid: &str, buf: &SharedBuffer, len: usize, offset: u64) -> Status {
        self.backend().write(&self.striper, oid, buf, len, offset)
    }
}

impl<B: PoolLifecycle> fmt::Debug for StriperFixture<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StriperFixture")
            .field("pool", &self.pool.name())
            .field("case", &self.case)
            .finish()
    }
}
