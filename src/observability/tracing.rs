use tracing::Span;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// configured filter.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

pub fn trace_refresh(job: &str) -> Span {
    tracing::info_span!(
        "refresh",
        job = %job,
    )
}
