//! Striped object storage
//!
//! A striped object is a layout, a logical size and a sparse set of chunk
//! objects. Logical extents are mapped onto chunks with
//! [`StripeLayout::map_extents`]; bytes never written read back as zeros.

use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use striper_core::{chunk_object_name, StripeLayout};

type ChunkMap = DashMap<u64, Arc<Mutex<Vec<u8>>>, BuildHasherDefault<FxHasher>>;

/// One logical object stored as chunk objects
#[derive(Debug)]
pub struct StripedObject {
    layout: StripeLayout,
    /// Logical size (highest byte ever written + 1)
    size: AtomicU64,
    chunks: ChunkMap,
}

impl StripedObject {
    /// Create an empty object with a fixed layout
    pub fn new(layout: StripeLayout) -> Self {
        Self {
            layout,
            size: AtomicU64::new(0),
            chunks: DashMap::with_hasher(Default::default()),
        }
    }

    /// Layout the object was created with
    pub fn layout(&self) -> StripeLayout {
        self.layout
    }

    /// Logical size in bytes
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Acquire)
    }

    /// Number of chunk objects that hold data
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Sorted names of the chunk objects backing `oid`
    pub fn chunk_names(&self, oid: &str) -> Vec<String> {
        let mut numbers: Vec<u64> = self.chunks.iter().map(|e| *e.key()).collect();
        numbers.sort_unstable();
        numbers
            .into_iter()
            .map(|n| chunk_object_name(oid, n))
            .collect()
    }

    fn chunk(&self, object_no: u64) -> Arc<Mutex<Vec<u8>>> {
        // Clone the Arc out so the map shard is unlocked before the chunk lock
        Arc::clone(self.chunks.entry(object_no).or_insert_with(Default::default).value())
    }

    /// Write `len` bytes at logical `offset`.
    ///
    /// `fill(buffer_offset, dst)` must fill `dst` with the source bytes that
    /// start at `buffer_offset`. Chunks are locked one at a time.
    pub fn write_with<F>(&self, offset: u64, len: u64, fill: F)
    where
        F: Fn(usize, &mut [u8]),
    {
        let end = match offset.checked_add(len) {
            Some(end) if len > 0 => end,
            _ => return,
        };
        for ext in self.layout.map_extents(offset, len) {
            let chunk = self.chunk(ext.object_no);
            let mut data = chunk.lock();
            let start = ext.object_offset as usize;
            let end = start + ext.length as usize;
            if data.len() < end {
                data.resize(end, 0);
            }
            fill(ext.buffer_offset as usize, &mut data[start..end]);
        }
        self.size.fetch_max(end, Ordering::AcqRel);
    }

    /// Read up to `len` bytes at logical `offset`.
    ///
    /// `sink(buffer_offset, src)` receives each piece in logical order.
    /// Returns the number of bytes delivered, which is short (possibly 0)
    /// when the range extends past the logical size.
    pub fn read_with<F>(&self, offset: u64, len: u64, mut sink: F) -> u64
    where
        F: FnMut(usize, &[u8]),
    {
        let size = self.size();
        if offset >= size {
            return 0;
        }
        let len = len.min(size - offset);

        for ext in self.layout.map_extents(offset, len) {
            let start = ext.object_offset as usize;
            let want = ext.length as usize;
            let chunk = self.chunks.get(&ext.object_no).map(|c| Arc::clone(c.value()));
            match chunk {
                Some(chunk) => {
                    let data = chunk.lock();
                    let have = data.len().saturating_sub(start).min(want);
                    if have > 0 {
                        sink(ext.buffer_offset as usize, &data[start..start + have]);
                    }
                    if have < want {
                        // Hole inside a chunk
                        sink(ext.buffer_offset as usize + have, &vec![0u8; want - have]);
                    }
                }
                None => sink(ext.buffer_offset as usize, &vec![0u8; want]),
            }
        }
        len
    }

    /// Convenience: write a byte slice at `offset`
    pub fn write_bytes(&self, offset: u64, data: &[u8]) {
        self.write_with(offset, data.len() as u64, |at, dst| {
            dst.copy_from_slice(&data[at..at + dst.len()]);
        });
    }

    /// Convenience: read `len` bytes at `offset` into a vector
    pub fn read_bytes(&self, offset: u64, len: u64) -> Vec<u8> {
        let mut out = Vec::new();
        self.read_with(offset, len, |_, src| out.extend_from_slice(src));
        out
    }
}
