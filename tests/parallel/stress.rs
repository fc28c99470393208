//! Stress Tests
//!
//! Heavy-workload tests for the coordinator. All marked #[ignore] for opt-in execution.
//! Run with: cargo test --test parallel stress -- --ignored

use crate::common::*;
use std::time::{Duration, Instant};

/// Many workers, many rounds, mixed sync and async
#[test]
#[ignore]
fn stress_mixed_rounds() {
    let (cluster, access) = setup();
    let size = 64 * 1024;
    let buf = random_buffer(size);
    let start = Instant::now();

    for round in 0..50 {
        match round % 4 {
            0 => access.sync_write(&buf, size, 32),
            1 => access.async_write(&buf, size, 32),
            2 => access.sync_read(&SharedBuffer::zeroed(size), size, 32),
            _ => access.async_read(&SharedBuffer::zeroed(size), size, 32),
        }
        assert_eq!(access.results().len(), 32);
        assert_eq!(access.summary().setup_failures, 0);
        if round % 10 == 9 {
            access.drain_stale();
        }
    }

    println!("50 rounds x 32 workers in {:?}", start.elapsed());
    access.teardown().unwrap();
    assert_quiescent(&cluster);
}

/// Slow backend: every worker still finishes and nothing leaks
#[test]
#[ignore]
fn stress_slow_backend_async() {
    let (cluster, access) = setup();
    cluster.set_io_latency(Duration::from_millis(20));
    let buf = SharedBuffer::filled(4096, 5);

    access.async_write(&buf, 4096, 64);
    assert_all_completed(&access.results(), 0);
    assert_eq!(cluster.stats().pending_aio, 0);

    access.teardown().unwrap();
    assert_quiescent(&cluster);
}

/// Session churn with intermittent setup faults
#[test]
#[ignore]
fn stress_churn_with_faults() {
    let (cluster, access) = setup();
    let buf = SharedBuffer::filled(256, 1);

    for round in 0..200 {
        if round % 7 == 0 {
            cluster.faults().fail_connects(2, errno::ENOTCONN);
        }
        access.sync_write(&buf, 256, 8);
        let summary = access.summary();
        assert_eq!(summary.workers, 8);
        assert_eq!(summary.succeeded + summary.setup_failures, 8);
        access.drain_stale();
    }

    access.teardown().unwrap();
    assert_quiescent(&cluster);
}
