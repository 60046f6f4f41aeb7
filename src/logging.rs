//! Diagnostic logging for the brn CLI.
//!
//! Logs go to stderr so stdout stays reserved for command output. The filter
//! comes from `BRN_LOG` (standard `EnvFilter` syntax) and otherwise defaults
//! to `warn`, or `brn=debug` when `--verbose` is given.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "BRN_LOG";

/// Build the filter for this invocation.
pub fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("brn=debug")
        } else {
            EnvFilter::new("warn")
        }
    })
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init(false);
        init(true);
        tracing::debug!("still alive");
    }
}
