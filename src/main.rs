use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use tokenfeed::TokenPriceService;
use tokenfeed::api::rest::create_router;
use tokenfeed::config::AppConfig;
use tokenfeed::observability::metrics::register_metrics;
use tokenfeed::observability::tracing::init_tracing;

const HEALTH_CHECK_EVERY: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("TOKENFEED_ENV").unwrap_or_else(|_| "production".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(&config.logging);
    register_metrics().context("registering metrics")?;
    info!("Starting tokenfeed ({})", env);

    let service = Arc::new(TokenPriceService::from_config(&config).context("building sources")?);
    let mut supervisor = service.scheduler(&config.schedule).start();

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    info!("Serving on {}", config.server.bind);

    let router = create_router(Arc::clone(&service));
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("REST server stopped: {}", e);
        }
    });

    let mut health = tokio::time::interval(HEALTH_CHECK_EVERY);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
            _ = health.tick() => {
                if let Err(e) = supervisor.check_health() {
                    error!("Supervisor health check failed: {}", e);
                }
            }
        }
    }

    supervisor.shutdown_all().await;
    server.abort();
    Ok(())
}
