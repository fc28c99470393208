//! Coordinator teardown releases every handle and the owned pool

use crate::common::*;

#[test]
fn teardown_leaves_cluster_quiescent_and_pool_gone() {
    let (cluster, access) = setup();
    let pool = access.pool().to_string();
    let buf = SharedBuffer::filled(1024, 3);

    access.sync_write(&buf, 1024, 4);
    access.async_read(&buf, 1024, 4);
    access.sync_read(&buf, 1024, 4);
    assert_eq!(access.stale_count(), 8);

    access.teardown().unwrap();

    assert_quiescent(&cluster);
    assert!(!cluster.pool_exists(&pool));
    assert_eq!(access.session_count(), 0);
    assert_eq!(access.stale_count(), 0);
}

#[test]
fn drop_tears_down() {
    let (cluster, access) = setup();
    access.sync_write(&SharedBuffer::zeroed(64), 64, 5);
    drop(access);

    assert_quiescent(&cluster);
    assert_eq!(cluster.stats().pools, 0);
}

#[test]
fn teardown_is_idempotent() {
    let (cluster, access) = setup();
    access.access(|_| 0, 2);
    access.teardown().unwrap();
    access.teardown().unwrap();
    drop(access);
    assert_quiescent(&cluster);
}

#[test]
fn pool_outlives_every_session() {
    let (cluster, access) = setup();
    let pool = access.pool().to_string();
    access.access(|_| 0, 3);

    // Draining stale records leaves the live sessions and the pool alone
    access.access(|_| 0, 3);
    access.drain_stale();
    assert!(cluster.pool_exists(&pool));
    assert_eq!(cluster.stats().stripers, 3);
}

#[test]
fn teardown_reports_pool_destruction_errors() {
    let (cluster, access) = setup();
    let pool = access.pool().to_string();
    // Someone else destroys the pool first
    let other = cluster.connect().unwrap();
    cluster.destroy_pool(&pool, other).unwrap();

    assert_eq!(
        access.teardown().unwrap_err(),
        StriperError::PoolNotFound { pool }
    );
    assert_quiescent(&cluster);
}

#[test]
fn config_built_coordinator_tears_down() {
    let cluster = fresh_cluster();
    let config = HarnessConfig {
        threads: 3,
        buffer_size: 512,
        ..HarnessConfig::default()
    };
    let access = config.parallel_access(std::sync::Arc::clone(&cluster)).unwrap();
    let pool = access.pool().to_string();
    assert!(pool.starts_with(&config.pool_prefix));

    access.sync_write(&config.buffer(), config.buffer_size, config.threads);
    assert_all_completed(&access.results(), 512);
    drop(access);

    assert!(!cluster.pool_exists(&pool));
    assert_quiescent(&cluster);
}
