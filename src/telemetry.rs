//! Logging initialization.
//!
//! Diagnostics go through `tracing`, separate from the user-facing progress
//! output on stdout. The filter comes from `RUST_LOG` (default `warn`);
//! `FORGESYNC_LOG_FORMAT=json` switches the stderr writer to the JSON
//! formatter for log shippers.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let json = std::env::var("FORGESYNC_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
