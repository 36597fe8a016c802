//! Log output for tests and embedding applications.
//!
//! The crate only emits `tracing` events. Nothing is printed unless a
//! subscriber is installed, either by the application or by calling
//! [`enable_debug_logging`].

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub const DEBUG_FILTER: &str = "pythainlp_sidecar=debug";

/// Install a `fmt` subscriber writing to stderr, filtered by `RUST_LOG` or
/// [`DEBUG_FILTER`]. Returns `false` if a global subscriber already exists.
pub fn enable_debug_logging() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEBUG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_rejected() {
        enable_debug_logging();
        assert!(!enable_debug_logging());
    }
}
