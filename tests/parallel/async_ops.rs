//! Asynchronous variants: submit, wait on own completion, report submission

use crate::common::*;
use std::time::Duration;

#[test]
fn async_read_before_any_write_never_hangs() {
    let (cluster, access) = setup();
    let buf = SharedBuffer::zeroed(4096);

    access.async_read(&buf, 4096, 8);

    let results = access.results();
    assert_eq!(results.len(), 8);
    let enoent = errno::to_status(errno::ENOENT);
    for result in &results {
        let status = result.status().unwrap();
        assert!(status >= 0 || status == enoent, "unexpected status {}", status);
    }
    assert_eq!(cluster.stats().pending_aio, 0);
}

#[test]
fn async_write_then_async_read_round_trips() {
    let (_cluster, access) = setup();
    let size = 3000;
    let out = random_buffer(size);

    access.async_write(&out, size, 1);
    assert_all_completed(&access.results(), 0);

    let back = SharedBuffer::zeroed(size);
    access.async_read(&back, size, 1);
    assert_all_completed(&access.results(), 0);
    // The completion fired only after the data was stored
    assert_eq!(back.to_vec(), out.to_vec());
}

#[test]
fn each_worker_waits_for_its_own_completion() {
    let (cluster, access) = setup();
    cluster.set_io_latency(Duration::from_millis(5));
    let buf = SharedBuffer::filled(512, 9);

    access.async_write(&buf, 512, 6);

    assert_all_completed(&access.results(), 0);
    assert_eq!(cluster.stats().pending_aio, 0);
    let data = object_bytes(&cluster, access.pool(), access.object_name());
    assert_eq!(data, vec![9u8; 512]);
}

#[test]
fn rejected_submission_is_reported_and_not_awaited() {
    let (_cluster, access) = setup();
    let buf = SharedBuffer::zeroed(8);
    access.async_write(&buf, 64, 4);
    assert_all_completed(&access.results(), errno::to_status(errno::EINVAL));
}

#[test]
fn async_io_on_destroyed_pool_is_enoent() {
    let cluster = fresh_cluster();
    let pool = TempPool::create(std::sync::Arc::clone(&cluster), POOL_PREFIX).unwrap();
    let access = pool.parallel_access();
    access.access(|_| 0, 2);

    // Pool vanishes while the sessions are still open
    let name = pool.name().to_string();
    pool.destroy().unwrap();
    assert!(!cluster.pool_exists(&name));

    let buf = SharedBuffer::zeroed(32);
    let oid = access.object_name().to_string();
    let statuses: Vec<Status> = access.with_records(|records| {
        records
            .iter()
            .map(|r| {
                let session = r.session().unwrap();
                let completion = session.backend().create_completion();
                let status = session.aio_read(&oid, &completion, &buf, 32, 0);
                session.backend().release_completion(completion);
                status
            })
            .collect()
    });
    assert_eq!(statuses, vec![errno::to_status(errno::ENOENT); 2]);
}
