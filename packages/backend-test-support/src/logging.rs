//! Test logging shared by unit and integration tests.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

/// Used when neither `TEST_LOG` nor `RUST_LOG` is set. Pool chatter stays at error.
pub const DEFAULT_TEST_FILTER: &str = "warn,sqlx=error,sea_orm=error";

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Pick the filter directives: `TEST_LOG`, then `RUST_LOG`, then [`DEFAULT_TEST_FILTER`].
/// Blank values are skipped.
pub fn filter_directives(test_log: Option<&str>, rust_log: Option<&str>) -> String {
    [test_log, rust_log]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(DEFAULT_TEST_FILTER)
        .to_string()
}

/// Install the test subscriber once per process; later calls are no-ops.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let directives = filter_directives(
            std::env::var("TEST_LOG").ok().as_deref(),
            std::env::var("RUST_LOG").ok().as_deref(),
        );
        let filter = EnvFilter::try_new(&directives)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));

        // another harness may have installed a subscriber first
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .with_target(false)
            .try_init();
    });
}
