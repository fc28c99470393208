//! Errno codes used in statuses
//!
//! Client-library calls report failure as a negated errno (`-ENOENT`, ...).
//! Only the codes the harness and the reference binding produce are listed.

/// No such object or pool
pub const ENOENT: i32 = 2;
/// Generic I/O failure
pub const EIO: i32 = 5;
/// Out of memory / resources
pub const ENOMEM: i32 = 12;
/// Object or pool already exists
pub const EEXIST: i32 = 17;
/// Invalid argument
pub const EINVAL: i32 = 22;
/// Object would grow past the maximum object size
pub const EFBIG: i32 = 27;
/// Transport endpoint is not connected
pub const ENOTCONN: i32 = 107;
/// Connection timed out
pub const ETIMEDOUT: i32 = 110;

/// Short symbolic name for a (positive) errno, for log and error messages.
pub fn name(code: i32) -> &'static str {
    match code {
        ENOENT => "ENOENT",
        EIO => "EIO",
        ENOMEM => "ENOMEM",
        EEXIST => "EEXIST",
        EINVAL => "EINVAL",
        EFBIG => "EFBIG",
        ENOTCONN => "ENOTCONN",
        ETIMEDOUT => "ETIMEDOUT",
        _ => "EUNKNOWN",
    }
}

/// Convert a positive errno into the negative status a library call returns.
#[inline]
pub fn to_status(code: i32) -> i64 {
    -(code.abs() as i64)
}
