//! Pool and object naming

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static POOL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a temporary pool name unique within and across processes.
///
/// Format: `{prefix}-{pid}-{counter}-{uuid8}`
pub fn temp_pool_name(prefix: &str) -> String {
    let n = POOL_COUNTER.fetch_add(1, Ordering::Relaxed);
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}-{}", prefix, std::process::id(), n, &id[..8])
}

/// Name of chunk object `object_no` of striped object `oid`
pub fn chunk_object_name(oid: &str, object_no: u64) -> String {
    format!("{}.{:016x}", oid, object_no)
}
