//! Stripe layout and logical-to-chunk extent mapping
//!
//! A striped object is stored as a set of chunk objects. The logical byte
//! stream is cut into `stripe_unit`-sized blocks which are dealt round-robin
//! across `stripe_count` chunks; once every chunk of an object set holds
//! `object_size` bytes the next object set begins.

use crate::error::{StriperError, StriperResult};
use serde::{Deserialize, Serialize};

/// Default stripe unit (4 MiB)
pub const DEFAULT_STRIPE_UNIT: u32 = 1 << 22;
/// Default stripe count
pub const DEFAULT_STRIPE_COUNT: u32 = 1;
/// Default chunk object size (4 MiB)
pub const DEFAULT_OBJECT_SIZE: u32 = 1 << 22;

/// Layout of a striped object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StripeLayout {
    /// Bytes written to one chunk before moving to the next
    pub stripe_unit: u32,
    /// Number of chunks a stripe spans
    pub stripe_count: u32,
    /// Maximum size of one chunk object
    pub object_size: u32,
}

impl Default for StripeLayout {
    fn default() -> Self {
        StripeLayout {
            stripe_unit: DEFAULT_STRIPE_UNIT,
            stripe_count: DEFAULT_STRIPE_COUNT,
            object_size: DEFAULT_OBJECT_SIZE,
        }
    }
}

/// One contiguous piece of a logical extent, located inside a chunk object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkExtent {
    /// Chunk object number
    pub object_no: u64,
    /// Offset inside the chunk object
    pub object_offset: u64,
    /// Offset inside the caller's buffer
    pub buffer_offset: u64,
    /// Length in bytes
    pub length: u64,
}

impl StripeLayout {
    /// Create a layout, validating it
    pub fn new(stripe_unit: u32, stripe_count: u32, object_size: u32) -> StriperResult<Self> {
        let layout = StripeLayout {
            stripe_unit,
            stripe_count,
            object_size,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Check that all sizes are non-zero and the object size is a whole
    /// number of stripe units.
    pub fn validate(&self) -> StriperResult<()> {
        if self.stripe_unit == 0 || self.stripe_count == 0 || self.object_size == 0 {
            return Err(StriperError::InvalidLayout(format!(
                "stripe_unit, stripe_count and object_size must be non-zero (got {}/{}/{})",
                self.stripe_unit, self.stripe_count, self.object_size
            )));
        }
        if self.object_size % self.stripe_unit != 0 {
            return Err(StriperError::InvalidLayout(format!(
                "object_size {} is not a multiple of stripe_unit {}",
                self.object_size, self.stripe_unit
            )));
        }
        Ok(())
    }

    /// Bytes covered by one full object set
    pub fn object_set_size(&self) -> u64 {
        self.object_size as u64 * self.stripe_count as u64
    }

    /// Map the logical range `[offset, offset + len)` onto chunk extents.
    ///
    /// Extents are returned in logical order; their `buffer_offset`s are
    /// contiguous starting at 0. The layout must be valid. A range whose end
    /// does not fit in a `u64` maps to no extents.
    pub fn map_extents(&self, offset: u64, len: u64) -> Vec<ChunkExtent> {
        let su = self.stripe_unit as u64;
        let sc = self.stripe_count as u64;
        let stripes_per_object = self.object_size as u64 / su;

        let mut extents = Vec::new();
        let end = match offset.checked_add(len) {
            Some(end) => end,
            None => return extents,
        };
        let mut cur = offset;
        while cur < end {
            let block_no = cur / su;
            let stripe_no = block_no / sc;
            let stripe_pos = block_no % sc;
            let object_set_no = stripe_no / stripes_per_object;
            let block_off = cur % su;
            let length = (su - block_off).min(end - cur);

            extents.push(ChunkExtent {
                object_no: object_set_no * sc + stripe_pos,
                object_offset: (stripe_no % stripes_per_object) * su + block_off,
                buffer_offset: cur - offset,
                length,
            });
            cur += length;
        }
        extents
    }
}
