//! Session setup failures are tagged outcomes, isolated per worker

use crate::common::*;

#[test]
fn connect_failures_are_recorded_and_siblings_complete() {
    let (cluster, access) = setup();
    cluster.faults().fail_connects(3, errno::ENOTCONN);
    let buf = SharedBuffer::filled(128, 1);

    access.sync_write(&buf, 128, 8);

    let summary = access.summary();
    assert_eq!(summary.workers, 8);
    assert_eq!(summary.setup_failures, 3);
    assert_eq!(summary.succeeded, 5);
    assert_eq!(access.session_count(), 5);
    assert_eq!(
        access.setup_failures(),
        vec![StriperError::Connection { code: errno::ENOTCONN }; 3]
    );
    // Failed workers hold nothing
    assert_eq!(cluster.stats().clients, 1 + 5);
}

#[test]
fn bind_failures_release_the_connection() {
    let (cluster, access) = setup();
    cluster.faults().fail_binds(2, errno::EIO);

    access.access(|_| 0, 4);

    let failures = access.setup_failures();
    assert_eq!(failures.len(), 2);
    for failure in &failures {
        assert!(matches!(failure, StriperError::Bind { code, .. } if *code == errno::EIO));
        assert!(failure.is_setup_failure());
    }
    let stats = cluster.stats();
    assert_eq!(stats.clients, 1 + 2);
    assert_eq!(stats.io_contexts, 2);
}

#[test]
fn striper_creation_failures_release_context_and_connection() {
    let (cluster, access) = setup();
    cluster.faults().fail_striper_creates(1, errno::ENOMEM);

    access.access(|_| 0, 3);

    assert_eq!(
        access.setup_failures(),
        vec![StriperError::SessionCreation { code: errno::ENOMEM }]
    );
    let stats = cluster.stats();
    assert_eq!(stats.io_contexts, 2);
    assert_eq!(stats.stripers, 2);
}

#[test]
fn setup_failed_worker_never_runs_the_operation() {
    let (cluster, access) = setup();
    cluster.faults().fail_connects(2, errno::ETIMEDOUT);
    let ran = std::sync::atomic::AtomicUsize::new(0);

    access.access(
        |_| {
            ran.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            0
        },
        6,
    );

    assert_eq!(ran.into_inner(), 4);
    access.with_records(|records| {
        for record in records {
            assert_eq!(record.session().is_some(), record.status().is_some());
        }
    });
}

#[test]
fn missing_pool_fails_every_bind() {
    let cluster = fresh_cluster();
    let access = ParallelAccess::for_pool(std::sync::Arc::clone(&cluster), "no-such-pool");

    access.sync_read(&SharedBuffer::zeroed(8), 8, 3);

    assert_eq!(
        access.setup_failures(),
        vec![
            StriperError::Bind {
                pool: "no-such-pool".to_string(),
                code: errno::ENOENT
            };
            3
        ]
    );
    assert_eq!(access.session_count(), 0);
    assert_quiescent(&cluster);
}

#[test]
fn invalid_layout_is_session_creation_failure() {
    let cluster = fresh_cluster();
    let bad = StripeLayout {
        stripe_unit: 4096,
        stripe_count: 2,
        object_size: 6000,
    };
    let access = temp_access(&cluster).with_layout(bad);

    access.sync_write(&SharedBuffer::zeroed(10), 10, 2);

    assert_eq!(
        access.setup_failures(),
        vec![StriperError::SessionCreation { code: errno::EINVAL }; 2]
    );
    assert_eq!(cluster.stats().stripers, 0);
}

#[test]
fn setup_error_is_distinct_from_operation_error() {
    let (cluster, access) = setup();
    cluster.faults().fail_connects(1, errno::ENOTCONN);

    access.sync_read(&SharedBuffer::zeroed(16), 16, 2);

    let results = access.results();
    let setup: Vec<_> = results.iter().filter(|r| r.setup_error().is_some()).collect();
    let operation: Vec<_> = results.iter().filter_map(|r| r.operation_error()).collect();
    assert_eq!(setup.len(), 1);
    // The surviving worker read a missing object
    assert_eq!(
        operation,
        vec![StriperError::Operation {
            status: errno::to_status(errno::ENOENT)
        }]
    );
}
