//! Log capture for tests
//!
//! `RUST_LOG` selects what is shown; the default shows harness info and
//! warnings from everything else. Output goes through the test writer so it
//! is captured per test like `println!`.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "striper=info,warn";

/// Install the global fmt subscriber once per process.
///
/// Safe to call from every test. If another subscriber is already installed
/// it is left in place.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_names(true)
            .try_init();
    });
}
