//! Caller-owned byte region shared by every worker of a parallel access
//!
//! The harness exercises real races: several workers read into, or write
//! out of, the same region at the same time. `SharedBuffer` keeps that sound
//! without adding synchronization. Every byte is an `AtomicU8` accessed with
//! `Relaxed` ordering, so concurrent readers and writers never tear a byte
//! but the combined content of a racy run is unspecified.
//!
//! The region is reference counted: a clone is another handle to the same
//! bytes, and the bytes stay valid for as long as any worker (or pending
//! asynchronous operation) holds a handle.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Reference-counted, unsynchronized byte region
#[derive(Clone)]
pub struct SharedBuffer {
    bytes: Arc<[AtomicU8]>,
}

impl SharedBuffer {
    /// Create a zero-filled buffer of `len` bytes
    pub fn zeroed(len: usize) -> Self {
        let bytes: Arc<[AtomicU8]> = (0..len).map(|_| AtomicU8::new(0)).collect();
        SharedBuffer { bytes }
    }

    /// Create a buffer holding a copy of `data`
    pub fn from_slice(data: &[u8]) -> Self {
        let bytes: Arc<[AtomicU8]> = data.iter().map(|b| AtomicU8::new(*b)).collect();
        SharedBuffer { bytes }
    }

    /// Create a buffer of `len` bytes all set to `value`
    pub fn filled(len: usize, value: u8) -> Self {
        let bytes: Arc<[AtomicU8]> = (0..len).map(|_| AtomicU8::new(value)).collect();
        SharedBuffer { bytes }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-length buffer
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copy `src` into the buffer starting at `offset`.
    ///
    /// Returns the number of bytes stored (truncated at the buffer end).
    pub fn store(&self, offset: usize, src: &[u8]) -> usize {
        if offset >= self.bytes.len() {
            return 0;
        }
        let dst = &self.bytes[offset..];
        let n = src.len().min(dst.len());
        for (slot, b) in dst.iter().zip(&src[..n]) {
            slot.store(*b, Ordering::Relaxed);
        }
        n
    }

    /// Copy bytes starting at `offset` into `dst`.
    ///
    /// Returns the number of bytes loaded (truncated at the buffer end).
    pub fn load(&self, offset: usize, dst: &mut [u8]) -> usize {
        if offset >= self.bytes.len() {
            return 0;
        }
        let src = &self.bytes[offset..];
        let n = dst.len().min(src.len());
        for (b, slot) in dst[..n].iter_mut().zip(src) {
            *b = slot.load(Ordering::Relaxed);
        }
        n
    }

    /// Copy `len` bytes starting at `offset` into a new vector
    pub fn read_range(&self, offset: usize, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len.min(self.len().saturating_sub(offset))];
        self.load(offset, &mut out);
        out
    }

    /// Copy the whole buffer into a new vector
    pub fn to_vec(&self) -> Vec<u8> {
        self.read_range(0, self.len())
    }

    /// Set every byte to `value`
    pub fn fill(&self, value: u8) {
        for slot in self.bytes.iter() {
            slot.store(value, Ordering::Relaxed);
        }
    }

    /// True when both handles refer to the same region
    pub fn same_region(&self, other: &SharedBuffer) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.len())
            .field("handles", &Arc::strong_count(&self.bytes))
            .finish()
    }
}
