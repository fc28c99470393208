//! In-process reference binding for the striper harness
//!
//! This crate implements the client-library and pool-lifecycle traits
//! entirely in memory so the harness can run without a live cluster:
//! - MemCluster: pool registry, handle accounting, fault injection
//! - Handles: cluster connections, I/O contexts, stripers (RAII-counted)
//! - StripedObject: logical object stored as per-chunk locked objects
//! - MemCompletion: completion tokens for asynchronous operations
//!
//! # Concurrency
//!
//! Every chunk object has its own lock and a striped write locks one chunk
//! at a time, so concurrent writers to the same object may interleave at
//! chunk granularity exactly as they may against a real cluster.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cluster;
pub mod completion;
pub mod fault;
pub mod handles;
pub mod object;
pub mod pool;

pub use cluster::{ClusterStats, MemCluster, MAX_OBJECT_SIZE};
pub use completion::MemCompletion;
pub use fault::FaultInjector;
pub use handles::{MemClusterHandle, MemIoContext, MemStriper};
pub use object::StripedObject;
pub use pool::PoolState;
