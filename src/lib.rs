//! Striper harness - Concurrent multi-client access harness for striped object storage
//!
//! The harness opens N fully independent clients against one pool, runs the
//! same striped read or write on all of them at once against one shared
//! object, and keeps every client open afterwards so tests can assert on the
//! collected outcomes and the resulting object state.
//!
//! # Quick Start
//!
//! ```ignore
//! use striper_harness::{MemCluster, ParallelAccess, SharedBuffer};
//! use std::sync::Arc;
//!
//! let cluster = Arc::new(MemCluster::new());
//! let access = ParallelAccess::with_temp_pool(cluster, "test-striper")?;
//!
//! let buf = SharedBuffer::filled(4096, 0xab);
//! access.sync_write(&buf, 4096, 4);
//! assert!(access.results().iter().all(|r| r.status() == Some(4096)));
//! ```
//!
//! # Architecture
//!
//! - `striper-core`: statuses, errors, layouts, the client-library traits
//! - `striper-storage`: in-memory reference binding (`MemCluster`)
//! - `striper-concurrency`: session factory and parallel access coordinator
//! - `striper-fixture`: temporary pools, suite sharing, config, test logging

pub use striper_concurrency::{
    AccessSummary, ParallelAccess, Session, SessionArena, SessionFactory, SessionId, WorkerRecord,
};
pub use striper_core::{
    errno, AccessResult, ChunkExtent, PoolLifecycle, SharedBuffer, Status, StripeLayout,
    StriperBackend, StriperError, StriperResult,
};
pub use striper_fixture::{
    init_test_tracing, layout_cases, temp_pool_name, HarnessConfig, LayoutCase, StriperFixture,
    SuitePool, TempPool,
};
pub use striper_storage::{ClusterStats, MemCluster};
