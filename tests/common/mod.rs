//! Shared test utilities for the integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use once_cell::sync::Lazy;
use rand::Rng;
use std::sync::Arc;
pub use striper_harness::{
    errno, init_test_tracing, layout_cases, AccessResult, ClusterStats, HarnessConfig, LayoutCase,
    MemCluster, ParallelAccess, PoolLifecycle, SharedBuffer, Status, StripeLayout,
    StriperBackend, StriperError, StriperFixture, SuitePool, TempPool,
};

/// Prefix for every pool created by the integration suites
pub const POOL_PREFIX: &str = "test-striper";

// ============================================================================
// Clusters and coordinators
// ============================================================================

/// Fresh cluster with no pools and no clients.
///
/// Use a private cluster whenever a test asserts on handle counters.
pub fn fresh_cluster() -> Arc<MemCluster> {
    init_test_tracing();
    Arc::new(MemCluster::new())
}

/// Coordinator owning a new temporary pool on `cluster`
pub fn temp_access(cluster: &Arc<MemCluster>) -> ParallelAccess<MemCluster> {
    ParallelAccess::with_temp_pool(Arc::clone(cluster), POOL_PREFIX)
        .expect("Failed to create temporary pool")
}

/// Fresh cluster plus a coordinator owning a pool on it
pub fn setup() -> (Arc<MemCluster>, ParallelAccess<MemCluster>) {
    let cluster = fresh_cluster();
    let access = temp_access(&cluster);
    (cluster, access)
}

static SUITE_CLUSTER: Lazy<Arc<MemCluster>> = Lazy::new(|| Arc::new(MemCluster::new()));

/// Pool shared by every test of `suite`, on a process-wide cluster.
///
/// Counters of the shared cluster move with every test running in parallel;
/// do not assert on them.
pub fn suite_pool(suite: &str) -> Arc<TempPool<MemCluster>> {
    init_test_tracing();
    SuitePool::acquire(suite, || {
        TempPool::create(Arc::clone(&SUITE_CLUSTER), POOL_PREFIX)
    })
    .expect("Failed to acquire suite pool")
}

// ============================================================================
// Buffers
// ============================================================================

/// Buffer of `len` random bytes
pub fn random_buffer(len: usize) -> SharedBuffer {
    let mut rng = rand::thread_rng();
    let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
    SharedBuffer::from_slice(&data)
}

// ============================================================================
// Assertions
// ============================================================================

/// Every result is `Completed(expected)`
pub fn assert_all_completed(results: &[AccessResult], expected: Status) {
    for (i, result) in results.iter().enumerate() {
        assert_eq!(
            *result,
            AccessResult::Completed(expected),
            "record {} has unexpected outcome",
            i
        );
    }
}

/// No client, I/O context, striper or in-flight operation is left
pub fn assert_quiescent(cluster: &MemCluster) {
    let stats = cluster.stats();
    assert!(stats.is_quiescent(), "leaked handles: {:?}", stats);
}

/// Bytes of `oid` in `pool` as stored by the cluster
pub fn object_bytes(cluster: &MemCluster, pool: &str, oid: &str) -> Vec<u8> {
    let obj = cluster
        .object(pool, oid)
        .expect("object should exist");
    obj.read_bytes(0, obj.size())
}
