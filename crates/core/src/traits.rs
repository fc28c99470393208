//! Core traits for the striping client library and pool lifecycle
//!
//! These traits are the seam between the harness and whatever binding talks
//! to the cluster. The harness only ever goes through them, so a binding to a
//! live cluster and the in-process reference binding are interchangeable.
//!
//! Handles are owned values: dropping a handle releases it. A session's
//! handles are therefore released in reverse order of creation simply by
//! declaring them in that order.

use crate::buffer::SharedBuffer;
use crate::error::StriperResult;
use crate::layout::StripeLayout;
use crate::status::Status;

/// Capability interface of a striping client library
///
/// Thread safety: All methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync). Handles are `Send` so a worker
/// can hand its session to the coordinator.
///
/// I/O methods follow the client library convention and return a raw
/// [`Status`]: a negated errno on failure, otherwise bytes transferred
/// (blocking calls) or `0` for an accepted submission (asynchronous calls).
pub trait StriperBackend: Send + Sync {
    /// Connected cluster handle
    type Cluster: Send;
    /// I/O context bound to one pool
    type IoContext: Send;
    /// Striper handle bound to one I/O context
    type Striper: Send;
    /// Completion token for one asynchronous operation
    type Completion: Send;

    /// Open a new connection to the cluster
    ///
    /// # Errors
    ///
    /// Returns `StriperError::Connection` if the cluster cannot be reached.
    fn connect(&self) -> StriperResult<Self::Cluster>;

    /// Bind a new I/O context to `pool`
    ///
    /// # Errors
    ///
    /// Returns `StriperError::Bind` if the pool does not exist or the
    /// connection rejects the context.
    fn bind_io_context(&self, cluster: &Self::Cluster, pool: &str)
        -> StriperResult<Self::IoContext>;

    /// Create a striper handle on top of an I/O context
    ///
    /// # Errors
    ///
    /// Returns `StriperError::SessionCreation` on failure.
    fn create_striper(&self, ioctx: &Self::IoContext) -> StriperResult<Self::Striper>;

    /// Set the layout used for objects this striper creates
    ///
    /// # Errors
    ///
    /// Returns `StriperError::InvalidLayout` for an inconsistent layout.
    fn set_layout(&self, striper: &mut Self::Striper, layout: StripeLayout) -> StriperResult<()>;

    /// Blocking read of `len` bytes at `offset` of object `oid` into `buf`
    fn read(
        &self,
        striper: &Self::Striper,
        oid: &str,
        buf: &SharedBuffer,
        len: usize,
        offset: u64,
    ) -> Status;

    /// Blocking write of the first `len` bytes of `buf` at `offset` of object `oid`
    fn write(
        &self,
        striper: &Self::Striper,
        oid: &str,
        buf: &SharedBuffer,
        len: usize,
        offset: u64,
    ) -> Status;

    /// Create a completion token
    fn create_completion(&self) -> Self::Completion;

    /// Submit an asynchronous read; the completion fires once `buf` is filled
    fn aio_read(
        &self,
        striper: &Self::Striper,
        oid: &str,
        completion: &Self::Completion,
        buf: &SharedBuffer,
        len: usize,
        offset: u64,
    ) -> Status;

    /// Submit an asynchronous write
    fn aio_write(
        &self,
        striper: &Self::Striper,
        oid: &str,
        completion: &Self::Completion,
        buf: &SharedBuffer,
        len: usize,
        offset: u64,
    ) -> Status;

    /// Block until the operation tracked by `completion` has finished
    fn wait_for_completion(&self, completion: &Self::Completion);

    /// Return value of a finished operation, `None` while still in flight
    fn completion_status(&self, completion: &Self::Completion) -> Option<Status>;

    /// Release a completion token
    fn release_completion(&self, completion: Self::Completion);
}

/// Pool provisioning, consumed by fixtures and the coordinator teardown
pub trait PoolLifecycle: StriperBackend {
    /// Create `pool` and return the cluster handle that created it
    ///
    /// # Errors
    ///
    /// Returns `StriperError::PoolExists` if the name is taken, or the
    /// connection error if the cluster cannot be reached.
    fn create_pool(&self, pool: &str) -> StriperResult<Self::Cluster>;

    /// Destroy `pool` using the handle returned by [`create_pool`](Self::create_pool)
    ///
    /// # Errors
    ///
    /// Returns `StriperError::PoolNotFound` if the pool does not exist.
    fn destroy_pool(&self, pool: &str, cluster: Self::Cluster) -> StriperResult<()>;
}
