//! Fault injection for session setup
//!
//! Each setup step (connect, bind, striper creation) has a slot holding a
//! number of upcoming calls that must fail and the errno they fail with.

use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct FaultSlot {
    remaining: AtomicUsize,
    code: AtomicI32,
}

impl FaultSlot {
    fn arm(&self, count: usize, code: i32) {
        self.code.store(code.abs(), Ordering::Release);
        self.remaining.store(count, Ordering::Release);
    }

    /// Consume one pending failure, if any
    fn take(&self) -> Option<i32> {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .ok()
            .map(|_| self.code.load(Ordering::Acquire))
    }
}

/// Pending setup failures
#[derive(Debug, Default)]
pub struct FaultInjector {
    connect: FaultSlot,
    bind: FaultSlot,
    striper: FaultSlot,
}

impl FaultInjector {
    /// Make the next `count` connects fail with `code`
    pub fn fail_connects(&self, count: usize, code: i32) {
        self.connect.arm(count, code);
    }

    /// Make the next `count` I/O context binds fail with `code`
    pub fn fail_binds(&self, count: usize, code: i32) {
        self.bind.arm(count, code);
    }

    /// Make the next `count` striper creations fail with `code`
    pub fn fail_striper_creates(&self, count: usize, code: i32) {
        self.striper.arm(count, code);
    }

    /// Disarm every slot
    pub fn clear(&self) {
        self.connect.arm(0, 0);
        self.bind.arm(0, 0);
        self.striper.arm(0, 0);
    }

    pub(crate) fn take_connect(&self) -> Option<i32> {
        self.connect.take()
    }

    pub(crate) fn take_bind(&self) -> Option<i32> {
        self.bind.take()
    }

    pub(crate) fn take_striper(&self) -> Option<i32> {
        self.striper.take()
    }
}
