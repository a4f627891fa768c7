use lazy_static::lazy_static;
use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use crate::error::{Error, Result};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Refresh cycle metrics
    pub static ref REFRESH_SUCCESS: IntCounterVec = IntCounterVec::new(
        Opts::new("refresh_success_total", "Refresh cycles that committed new data"),
        &["job"]
    ).expect("valid metric definition");

    pub static ref REFRESH_FAILURE: IntCounterVec = IntCounterVec::new(
        Opts::new("refresh_failure_total", "Refresh cycles that kept the previous data"),
        &["job"]
    ).expect("valid metric definition");

    pub static ref REFRESH_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "refresh_duration_seconds",
            "Wall time of one refresh cycle"
        ).buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["job"]
    ).expect("valid metric definition");

    // Snapshot metrics
    pub static ref REGISTRY_TOKENS: IntGauge = IntGauge::new(
        "registry_tokens",
        "Tokens in the committed registry"
    ).expect("valid metric definition");

    pub static ref PRICED_TOKENS: IntGauge = IntGauge::new(
        "priced_tokens",
        "Tokens in the committed price table"
    ).expect("valid metric definition");

    pub static ref REFERENCE_ASSET_PRICE: Gauge = Gauge::new(
        "reference_asset_price_usd",
        "Last committed reference asset price"
    ).expect("valid metric definition");

    // Query metrics
    pub static ref TOKEN_LOOKUPS: IntCounter = IntCounter::new(
        "token_lookups_total",
        "Token price lookups served"
    ).expect("valid metric definition");
}

pub fn register_metrics() -> Result<()> {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(REFRESH_SUCCESS.clone()),
        Box::new(REFRESH_FAILURE.clone()),
        Box::new(REFRESH_DURATION.clone()),
        Box::new(REGISTRY_TOKENS.clone()),
        Box::new(PRICED_TOKENS.clone()),
        Box::new(REFERENCE_ASSET_PRICE.clone()),
        Box::new(TOKEN_LOOKUPS.clone()),
    ];

    for collector in collectors {
        REGISTRY
            .register(collector)
            .map_err(|e| Error::ConfigError(format!("metric registration failed: {}", e)))?;
    }
    Ok(())
}

/// Renders the registry in the prometheus text exposition format.
pub fn render() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
