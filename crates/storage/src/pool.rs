//! Pool state

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use striper_core::StripeLayout;

use crate::object::StripedObject;

/// A pool: a namespace of striped objects
///
/// I/O contexts and stripers keep the pool alive through an `Arc`; once the
/// pool is destroyed they observe `is_deleted()` and fail with `-ENOENT`.
#[derive(Debug)]
pub struct PoolState {
    name: String,
    deleted: AtomicBool,
    objects: DashMap<String, Arc<StripedObject>>,
}

impl PoolState {
    /// Create an empty pool
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deleted: AtomicBool::new(false),
            objects: DashMap::new(),
        }
    }

    /// Pool name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the pool was destroyed
    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    pub(crate) fn mark_deleted(&self) {
        self.deleted.store(true, Ordering::Release);
    }

    /// Look up an existing object
    pub fn object(&self, oid: &str) -> Option<Arc<StripedObject>> {
        self.objects.get(oid).map(|o| Arc::clone(o.value()))
    }

    /// Look up an object, creating it with `layout` if missing.
    ///
    /// An existing object keeps the layout it was created with.
    pub fn object_or_create(&self, oid: &str, layout: StripeLayout) -> Arc<StripedObject> {
        if let Some(obj) = self.object(oid) {
            return obj;
        }
        Arc::clone(
            self.objects
                .entry(oid.to_string())
                .or_insert_with(|| Arc::new(StripedObject::new(layout)))
                .value(),
        )
    }

    /// Number of striped objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
