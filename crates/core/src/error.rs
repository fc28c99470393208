//! Error types for the striper harness
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Errors are `Clone` because a worker's setup failure is recorded in the
//! coordinator's retained set and handed back to callers by value.

use crate::errno;
use crate::status::Status;
use std::io;
use thiserror::Error;

/// Result type alias for harness operations
pub type StriperResult<T> = std::result::Result<T, StriperError>;

/// Error types for the striper harness
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StriperError {
    /// Cluster connect failed
    #[error("Cluster connection failed: {} ({code})", errno_name(.code))]
    Connection {
        /// Positive errno reported by the client library
        code: i32,
    },

    /// I/O context binding failed
    #[error("Failed to bind I/O context to pool '{pool}': {} ({code})", errno_name(.code))]
    Bind {
        /// Pool the context was bound to
        pool: String,
        /// Positive errno reported by the client library
        code: i32,
    },

    /// Striper handle creation (or layout configuration) failed
    #[error("Striper session creation failed: {} ({code})", errno_name(.code))]
    SessionCreation {
        /// Positive errno reported by the client library
        code: i32,
    },

    /// Read or write returned a negative status
    #[error("Striped operation failed with status {status}")]
    Operation {
        /// Negative status returned by the operation
        status: Status,
    },

    /// Pool creation found an existing pool
    #[error("Pool already exists: {pool}")]
    PoolExists {
        /// Pool name
        pool: String,
    },

    /// Pool removal or lookup found no such pool
    #[error("Pool not found: {pool}")]
    PoolNotFound {
        /// Pool name
        pool: String,
    },

    /// Stripe layout parameters are inconsistent
    #[error("Invalid stripe layout: {0}")]
    InvalidLayout(String),

    /// Configuration could not be parsed or failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (file operations, thread spawn)
    #[error("I/O error: {0}")]
    Io(String),
}

fn errno_name(code: &i32) -> &'static str {
    errno::name(*code)
}

impl StriperError {
    /// Positive errno for errors that carry one.
    pub fn code(&self) -> Option<i32> {
        match self {
            StriperError::Connection { code }
            | StriperError::Bind { code, .. }
            | StriperError::SessionCreation { code } => Some(*code),
            StriperError::Operation { status } => Some(status.unsigned_abs() as i32),
            StriperError::PoolExists { .. } => Some(errno::EEXIST),
            StriperError::PoolNotFound { .. } => Some(errno::ENOENT),
            StriperError::InvalidLayout(_) => Some(errno::EINVAL),
            StriperError::InvalidConfig(_) | StriperError::Io(_) => None,
        }
    }

    /// True for the three session-setup failures.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            StriperError::Connection { .. }
                | StriperError::Bind { .. }
                | StriperError::SessionCreation { .. }
        )
    }
}

impl From<io::Error> for StriperError {
    fn from(e: io::Error) -> Self {
        StriperError::Io(e.to_string())
    }
}
