//! Layout-parameterized tests on a suite-shared pool

use crate::common::*;

const SUITE: &str = "parallel::layouts";

#[test]
fn fixture_round_trip_for_every_case() {
    let pool = suite_pool(SUITE);
    for (i, case) in layout_cases().into_iter().enumerate() {
        let fixture = StriperFixture::with_layout(&pool, case).unwrap();
        let oid = format!("fixture-case-{}", i);
        let out = random_buffer(case.size);

        assert_eq!(fixture.write(&oid, &out, case.size, 0), case.size as Status, "case {}", case);
        let back = SharedBuffer::zeroed(case.size);
        assert_eq!(fixture.read(&oid, &back, case.size, 0), case.size as Status, "case {}", case);
        assert_eq!(back.to_vec(), out.to_vec(), "case {}", case);

        let obj = pool.backend().object(pool.name(), &oid).unwrap();
        assert_eq!(obj.layout(), case.layout);
        assert_eq!(obj.chunk_count(), case.chunks_touched(), "case {}", case);
    }
}

#[test]
fn parallel_writers_for_every_case() {
    let pool = suite_pool(SUITE);
    for case in layout_cases() {
        // A coordinator per case so every case gets its own object layout
        let access = ParallelAccess::new(
            pool.session_factory().with_layout(case.layout),
        );
        let buf = SharedBuffer::filled(case.size, 0x7e);
        let oid = format!("parallel-case-{}", case);

        access.access(|session| session.write(&oid, &buf, case.size, 0), 4);
        assert_all_completed(&access.results(), case.size as Status);

        let back = SharedBuffer::zeroed(case.size);
        access.access(|session| session.read(&oid, &back, case.size, 0), 1);
        assert_all_completed(&access.results(), case.size as Status);
        assert!(back.to_vec().iter().all(|b| *b == 0x7e), "case {}", case);
    }
}

#[test]
fn offset_writes_across_object_sets() {
    let pool = suite_pool(SUITE);
    let case = LayoutCase::new(512, 3, 1536, 4608);
    let fixture = StriperFixture::with_layout(&pool, case).unwrap();
    let oid = "offset-object";

    let head = SharedBuffer::filled(1000, 1);
    let tail = SharedBuffer::filled(1000, 2);
    assert_eq!(fixture.write(oid, &head, 1000, 0), 1000);
    assert_eq!(fixture.write(oid, &tail, 1000, 4000), 1000);

    let back = SharedBuffer::zeroed(5000);
    assert_eq!(fixture.read(oid, &back, 5000, 0), 5000);
    let data = back.to_vec();
    assert!(data[..1000].iter().all(|b| *b == 1));
    // Holes read as zeros
    assert!(data[1000..4000].iter().all(|b| *b == 0));
    assert!(data[4000..].iter().all(|b| *b == 2));
}

#[test]
fn suite_tests_share_the_pool() {
    let a = suite_pool(SUITE);
    let b = suite_pool(SUITE);
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert!(SuitePool::is_active(SUITE));
}
