//! Log output for diagnos sessions and planner runs.
//!
//! All crates emit structured `tracing` events (`event = "search_end"`,
//! `steps = ..`). [`init`] installs a subscriber that prints them.

use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVE: &str = "diagnos=info";

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes log output.
///
/// Safe to call multiple times - only the first call has effect. Does
/// nothing if the application already installed a global subscriber.
pub fn init() {
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::registry()
            .with(filter())
            .with(fmt::layer().with_target(true))
            .try_init();
    });
}

/// Returns true once [`init`] ran.
pub fn is_initialized() -> bool {
    INIT.get().is_some()
}

fn filter() -> EnvFilter {
    // Targets match by prefix, so the default covers every `diagnos_*` crate.
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        assert!(is_initialized());
    }
}
