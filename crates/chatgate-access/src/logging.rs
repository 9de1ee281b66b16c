//! Logging setup for host applications.

use tracing_subscriber::EnvFilter;

/// Initialise tracing-based logging.
///
/// Uses the `RUST_LOG` env var if set, otherwise defaults based on the
/// verbosity flags. Log records from the `log` facade (used by the core and
/// store crates) are captured as well.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(default_level(verbose, quiet))
    };

    // Ignore error if a subscriber is already set (e.g. in tests).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn default_level(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false, false), "info");
        assert_eq!(default_level(true, false), "debug");
        assert_eq!(default_level(false, true), "warn");
        assert_eq!(default_level(true, true), "warn");
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(false, true);
        init_logging(true, false);
        tracing::info!("still alive");
    }
}
