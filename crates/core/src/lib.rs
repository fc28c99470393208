//! Core types and traits for the striper harness
//!
//! This crate defines the foundational types used throughout the system:
//! - StriperError: Error taxonomy (connection, bind, session creation, operation, pool)
//! - errno: Negated errno codes carried in statuses
//! - Status / AccessResult: Per-worker operation outcomes
//! - StripeLayout: Stripe unit / count / object size and extent mapping
//! - SharedBuffer: Unsynchronized byte region shared across workers
//! - Traits: Client-library capability (StriperBackend) and PoolLifecycle
//! - Naming: Temporary pool names and chunk object names

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod errno;
pub mod error;
pub mod layout;
pub mod naming;
pub mod status;
pub mod traits;

pub use buffer::SharedBuffer;
pub use error::{StriperError, StriperResult};
pub use layout::{ChunkExtent, StripeLayout};
pub use naming::{chunk_object_name, temp_pool_name};
pub use status::{AccessResult, Status};
pub use traits::{PoolLifecycle, StriperBackend};
