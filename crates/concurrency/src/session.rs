//! Session factory
//!
//! A session is one worker's private client stack: its own cluster
//! connection, an I/O context bound to the harness pool and a striper on top
//! of that context. Nothing is shared between sessions, so N sessions are N
//! independent clients as far as the cluster is concerned.

use std::fmt;
use std::sync::Arc;
use striper_core::errno;
use striper_core::{SharedBuffer, Status, StripeLayout, StriperBackend, StriperError, StriperResult};
use tracing::{debug, warn};

/// One worker's client stack
///
/// Fields drop in declaration order: the striper is released before the I/O
/// context, and the I/O context before the connection.
pub struct Session<B: StriperBackend> {
    striper: B::Striper,
    ioctx: B::IoContext,
    cluster: B::Cluster,
    backend: Arc<B>,
    pool: Arc<str>,
}

impl<B: StriperBackend> Session<B> {
    /// Backend the session was opened on
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Pool the session is bound to
    pub fn pool(&self) -> &str {
        &self.pool
    }

    /// Connection handle
    pub fn cluster(&self) -> &B::Cluster {
        &self.cluster
    }

    /// I/O context handle
    pub fn io_context(&self) -> &B::IoContext {
        &self.ioctx
    }

    /// Striper handle
    pub fn striper(&self) -> &B::Striper {
        &self.striper
    }

    /// Blocking striped read of `len` bytes at `offset` into `buf`
    pub fn read(&self, oid: &str, buf: &SharedBuffer, len: usize, offset: u64) -> Status {
        self.backend.read(&self.striper, oid, buf, len, offset)
    }

    /// Blocking striped write of the first `len` bytes of `buf` at `offset`
    pub fn write(&self, oid: &str, buf: &SharedBuffer, len: usize, offset: u64) -> Status {
        self.backend.write(&self.striper, oid, buf, len, offset)
    }

    /// Submit an asynchronous striped read tracked by `completion`
    pub fn aio_read(
        &self,
        oid: &str,
        completion: &B::Completion,
        buf: &SharedBuffer,
        len: usize,
        offset: u64,
    ) -> Status {
        self.backend
            .aio_read(&self.striper, oid, completion, buf, len, offset)
    }

    /// Submit an asynchronous striped write tracked by `completion`
    pub fn aio_write(
        &self,
        oid: &str,
        completion: &B::Completion,
        buf: &SharedBuffer,
        len: usize,
        offset: u64,
    ) -> Status {
        self.backend
            .aio_write(&self.striper, oid, completion, buf, len, offset)
    }
}

impl<B: StriperBackend> fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("pool", &self.pool).finish()
    }
}

/// Creates fully independent sessions bound to one pool
pub struct SessionFactory<B: StriperBackend> {
    backend: Arc<B>,
    pool: Arc<str>,
    layout: Option<StripeLayout>,
}

impl<B: StriperBackend> Clone for SessionFactory<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            pool: Arc::clone(&self.pool),
            layout: self.layout,
        }
    }
}

impl<B: StriperBackend> SessionFactory<B> {
    /// Create a factory for sessions on `pool`. The pool must already exist.
    pub fn new(backend: Arc<B>, pool: impl Into<String>) -> Self {
        let pool: String = pool.into();
        Self {
            backend,
            pool: Arc::from(pool),
            layout: None,
        }
    }

    /// Apply `layout` to the striper of every session created from now on
    pub fn with_layout(mut self, layout: StripeLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Pool sessions bind to
    pub fn pool(&self) -> &str {
        &self.pool
    }

    /// Layout applied to new sessions, if any
    pub fn layout(&self) -> Option<StripeLayout> {
        self.layout
    }

    /// Backend sessions are opened on
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Connect, bind and create a striper.
    ///
    /// On failure the error of the failing step is returned and every handle
    /// created by the earlier steps has already been released.
    ///
    /// # Errors
    ///
    /// `Connection`, `Bind` or `SessionCreation`, depending on the step.
    pub fn create_session(&self) -> StriperResult<Session<B>> {
        let cluster = self
            .backend
            .connect()
            .map_err(|e| self.setup_failed("connect", e))?;
        let ioctx = self
            .backend
            .bind_io_context(&cluster, &self.pool)
            .map_err(|e| self.setup_failed("bind", e))?;
        let mut striper = self
            .backend
            .create_striper(&ioctx)
            .map_err(|e| self.setup_failed("create_striper", e))?;

        if let Some(layout) = self.layout {
            self.backend
                .set_layout(&mut striper, layout)
                .map_err(|e| {
                    let code = e.code().unwrap_or(errno::EINVAL);
                    self.setup_failed("set_layout", StriperError::SessionCreation { code })
                })?;
        }

        debug!(target: "striper::session", pool = %self.pool, "Session created");
        Ok(Session {
            striper,
            ioctx,
            cluster,
            backend: Arc::clone(&self.backend),
            pool: Arc::clone(&self.pool),
        })
    }

    fn setup_failed(&self, step: &'static str, error: StriperError) -> StriperError {
        warn!(target: "striper::session", pool = %self.pool, step, error = %error, "Session setup failed");
        error
    }
}
