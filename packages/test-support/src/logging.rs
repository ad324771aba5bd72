//! Logging for test binaries.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

/// Quiet by default; driver statements only when they fail.
pub const DEFAULT_FILTER: &str = "warn,sqlx=error";

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Directives from `TEST_LOG`, falling back to `RUST_LOG` and then
/// [`DEFAULT_FILTER`]. Blank values are skipped.
pub fn filter_directives() -> String {
    ["TEST_LOG", "RUST_LOG"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install a test-writer subscriber once per process. Safe to call from
/// every test and from `ctor` hooks; a subscriber installed elsewhere wins.
pub fn init() {
    INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_new(filter_directives())
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_can_be_called_repeatedly() {
        init();
        init();
    }

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
