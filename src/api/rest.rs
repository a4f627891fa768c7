use axum::{
    Router,
    extract::{Json, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;

use crate::core::price_service::TokenPriceService;
use crate::interfaces::balance_provider::TokenBalance;
use crate::observability::metrics;
use crate::types::quote::ReferenceAssetPrice;
use crate::types::token::{PriceTable, TokenPrice, TokenRegistry};

pub fn create_router(service: Arc<TokenPriceService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/tokens", get(get_tokens))
        .route("/prices", get(get_prices))
        .route("/tokens/:address/price", get(get_token_price))
        .route("/reference-price", get(get_reference_price))
        .route("/wallets/:address/balances", get(get_balances))
        .route("/metrics", get(get_metrics))
        .with_state(service)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn get_tokens(State(service): State<Arc<TokenPriceService>>) -> Json<TokenRegistry> {
    Json(service.store().current_registry())
}

async fn get_prices(State(service): State<Arc<TokenPriceService>>) -> Json<PriceTable> {
    Json(service.store().current_price_table())
}

async fn get_token_price(
    State(service): State<Arc<TokenPriceService>>,
    Path(address): Path<String>,
) -> Result<Json<TokenPrice>, StatusCode> {
    service
        .token_price(&address)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_reference_price(
    State(service): State<Arc<TokenPriceService>>,
) -> Result<Json<ReferenceAssetPrice>, StatusCode> {
    service
        .reference_price()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_balances(
    State(service): State<Arc<TokenPriceService>>,
    Path(address): Path<String>,
) -> Result<Json<Vec<TokenBalance>>, StatusCode> {
    // Provider absent or failed
    service
        .token_balances(&address)
        .await
        .map(Json)
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)
}

async fn get_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}
