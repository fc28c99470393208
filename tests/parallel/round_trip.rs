//! Sync and async data paths through the coordinator

use crate::common::*;

#[test]
fn sync_write_then_sync_read_round_trips() {
    let (_cluster, access) = setup();
    let size = 10_000;
    let out = random_buffer(size);

    access.sync_write(&out, size, 1);
    assert_all_completed(&access.results(), size as Status);

    let back = SharedBuffer::zeroed(size);
    access.sync_read(&back, size, 1);
    assert_all_completed(&access.results(), size as Status);
    assert_eq!(back.to_vec(), out.to_vec());
}

#[test]
fn four_writers_of_4096_bytes() {
    let (cluster, access) = setup();
    let buf = SharedBuffer::filled(4096, 0xab);

    access.sync_write(&buf, 4096, 4);

    assert_eq!(access.session_count(), 4);
    assert_all_completed(&access.results(), 4096);
    let data = object_bytes(&cluster, access.pool(), access.object_name());
    assert_eq!(data.len(), 4096);
    assert!(data.iter().all(|b| *b == 0xab));
}

#[test]
fn parallel_readers_share_one_buffer() {
    let (_cluster, access) = setup();
    let size = 8192;
    access.sync_write(&SharedBuffer::filled(size, 0x42), size, 1);

    // Every reader stores the same bytes, so the race is benign here
    let shared = SharedBuffer::zeroed(size);
    access.sync_read(&shared, size, 8);

    assert_all_completed(&access.results(), size as Status);
    assert!(shared.to_vec().iter().all(|b| *b == 0x42));
}

#[test]
fn concurrent_writers_of_distinct_patterns_leave_one_pattern_per_unit() {
    let cluster = fresh_cluster();
    let layout = StripeLayout::new(256, 4, 1024).unwrap();
    let access = temp_access(&cluster).with_layout(layout);
    let size = 4096;
    let buffers: Vec<SharedBuffer> = (0..6u8).map(|i| SharedBuffer::filled(size, i + 1)).collect();
    let oid = access.object_name().to_string();

    access.access(
        |session| {
            let me = std::thread::current()
                .name()
                .and_then(|n| n.strip_prefix("striper-worker-"))
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(0);
            session.write(&oid, &buffers[me], size, 0)
        },
        buffers.len(),
    );

    assert_all_completed(&access.results(), size as Status);
    let data = object_bytes(&cluster, access.pool(), access.object_name());
    for unit in data.chunks(layout.stripe_unit as usize) {
        assert!((1..=6).contains(&unit[0]));
        assert!(unit.iter().all(|b| *b == unit[0]), "torn stripe unit");
    }
}

#[test]
fn async_write_race_then_sync_read() {
    let (_cluster, access) = setup();
    let size = 4096;
    let buf = random_buffer(size);

    access.async_write(&buf, size, 8);
    assert_all_completed(&access.results(), 0);

    // Every writer sent the same bytes, so the racing writes agree
    let back = SharedBuffer::zeroed(size);
    access.sync_read(&back, size, 1);
    assert_all_completed(&access.results(), size as Status);
    assert_eq!(back.to_vec(), buf.to_vec());
}

#[test]
fn short_read_past_end_of_object() {
    let (_cluster, access) = setup();
    access.sync_write(&SharedBuffer::filled(100, 1), 100, 1);

    let back = SharedBuffer::zeroed(400);
    access.sync_read(&back, 400, 2);
    assert_all_completed(&access.results(), 100);
}

#[test]
fn size_larger_than_buffer_is_einval() {
    let (_cluster, access) = setup();
    let buf = SharedBuffer::zeroed(16);
    access.sync_write(&buf, 32, 3);
    assert_all_completed(&access.results(), errno::to_status(errno::EINVAL));
    assert_eq!(access.summary().operation_failures, 3);
}

#[test]
fn zero_length_write_leaves_object_absent() {
    let (cluster, access) = setup();

    access.sync_write(&SharedBuffer::zeroed(0), 0, 1);
    assert_all_completed(&access.results(), 0);
    access.async_write(&SharedBuffer::zeroed(0), 0, 2);
    assert_all_completed(&access.results(), 0);
    assert!(cluster.object(access.pool(), access.object_name()).is_none());

    access.sync_read(&SharedBuffer::zeroed(8), 8, 1);
    assert_all_completed(&access.results(), errno::to_status(errno::ENOENT));
}

#[test]
fn write_at_overflowing_offset_is_efbig() {
    let (cluster, access) = setup();
    let buf = SharedBuffer::filled(8, 1);
    let oid = access.object_name().to_string();

    access.access(|session| session.write(&oid, &buf, 8, u64::MAX - 2), 2);

    assert_all_completed(&access.results(), errno::to_status(errno::EFBIG));
    assert!(cluster.object(access.pool(), &oid).is_none());
}
