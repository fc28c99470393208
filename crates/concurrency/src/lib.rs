//! Concurrency layer for the striper harness
//!
//! This crate implements the concurrent multi-client access harness:
//! - SessionFactory: Builds independent (connection, I/O context, striper) sessions
//! - SessionArena: Retained worker records keyed by opaque SessionId
//! - ParallelAccess: Spawns N workers against one shared striped object,
//!   records each outcome under a single lock, joins them all
//!
//! Sessions outlive the access call that created them so assertions can run
//! against live state; they are released when the coordinator is torn down.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod access;
pub mod arena;
pub mod session;

pub use access::ParallelAccess;
pub use arena::{AccessSummary, SessionArena, SessionId, WorkerRecord};
pub use session::{Session, SessionFactory};
