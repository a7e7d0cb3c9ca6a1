// Tracing setup shared by the command-line tools

use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Install a fmt subscriber filtered by RUST_LOG, falling back to `default_level`
pub fn init(default_level: &str) {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .try_init();
}
