//! Parallel Access Integration Tests
//!
//! N independent clients hammering one striped object through the
//! coordinator, against the in-memory reference binding.

#[path = "../common/mod.rs"]
mod common;

mod async_ops;
mod layouts;
mod round_trip;
mod setup_failures;
mod stress;
mod teardown;
