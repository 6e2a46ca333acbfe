//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default directives used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "server=info,services=info,db=info,tower_http=warn";

/// Install the global subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`].
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();

    tracing::debug!(default_filter = DEFAULT_FILTER, "Tracing initialized");
}
