//! Layout cases for parameterized tests

use std::fmt;
use striper_core::StripeLayout;

/// One parameterized case: a layout and an I/O size to run under it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutCase {
    /// Striping layout applied to the striper
    pub layout: StripeLayout,
    /// Bytes to read or write
    pub size: usize,
}

impl LayoutCase {
    /// Build a case from raw layout numbers
    pub const fn new(stripe_unit: u32, stripe_count: u32, object_size: u32, size: usize) -> Self {
        Self {
            layout: StripeLayout {
                stripe_unit,
                stripe_count,
                object_size,
            },
            size,
        }
    }

    /// Number of chunk objects a write of `size` bytes at offset 0 touches
    pub fn chunks_touched(&self) -> usize {
        let mut objects: Vec<u64> = self
            .layout
            .map_extents(0, self.size as u64)
            .into_iter()
            .map(|e| e.object_no)
            .collect();
        objects.sort_unstable();
        objects.dedup();
        objects.len()
    }
}

impl fmt::Display for LayoutCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "su={} sc={} os={} size={}",
            self.layout.stripe_unit, self.layout.stripe_count, self.layout.object_size, self.size
        )
    }
}

/// Layouts covering single-object, multi-stripe and multi-object-set I/O
pub fn layout_cases() -> Vec<LayoutCase> {
    vec![
        // Default layout, I/O well inside the first stripe unit
        LayoutCase::new(4 << 20, 1, 4 << 20, 4096),
        // Small units, one object per set
        LayoutCase::new(512, 1, 512, 1500),
        // Two objects per set, one full set
        LayoutCase::new(512, 2, 1024, 2048),
        // Crosses object sets with a partial last unit
        LayoutCase::new(512, 3, 1536, 10_000),
        // Object size a multiple of the unit
        LayoutCase::new(4096, 5, 8192, 100_000),
        // Wide stripe, I/O shorter than one stripe
        LayoutCase::new(65536, 8, 262_144, 300_000),
    ]
}
