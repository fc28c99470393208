//! Test fixtures for the striper harness
//!
//! This crate provides the scaffolding test suites build on:
//! - TempPool: A uniquely named pool created on construction, destroyed on drop
//! - SuitePool: One TempPool shared by every test of a suite
//! - StriperFixture: Per-test I/O context and striper on a shared pool
//! - LayoutCase: Layout/size table for parameterized tests
//! - HarnessConfig: `striper-harness.toml` settings
//! - init_test_tracing: Idempotent log capture for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cases;
pub mod config;
pub mod fixture;
pub mod logging;
pub mod pool;
pub mod suite;

pub use cases::{layout_cases, LayoutCase};
pub use config::{HarnessConfig, CONFIG_FILE_NAME};
pub use fixture::StriperFixture;
pub use logging::init_test_tracing;
pub use pool::TempPool;
pub use striper_core::temp_pool_name;
pub use suite::SuitePool;
