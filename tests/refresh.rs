use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tokenfeed::TokenPriceService;
use tokenfeed::api::rest::create_router;
use tokenfeed::config::AppConfig;
use tokenfeed::types::address::Address;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn upstreams() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/all.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tokens": [
                { "address": "0xAAA", "name": "Token A", "symbol": "TKA", "decimals": 18 },
                { "address": "0xaaa", "name": "Duplicate", "symbol": "DUP", "decimals": 18 },
                { "address": "0xBBB", "name": "Token B", "symbol": "TKB", "decimals": 8 }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "platform": { "id": 1027, "token_address": "0xaaa" },
                    "quote": { "USD": { "price": 1.5, "percent_change_1h": 0.5, "percent_change_24h": 1.0 } }
                },
                {
                    "platform": { "id": 1839, "token_address": "0xbbb" },
                    "quote": { "USD": { "price": 9.0 } }
                }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ethereum": { "usd": 3000.0, "usd_24h_change": -0.5 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/subgraph"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": { "derivedETH": "0.002" } }
        })))
        .mount(&server)
        .await;

    server
}

fn config(base: &str) -> AppConfig {
    AppConfig::from_toml_str(&format!(
        r#"
        [synthetic_token]
        address = "0xENB"

        [sources]
        token_list_url = "{base}/all.json"
        market_listings_url = "{base}/listings"
        market_api_key = "test-key"
        reference_price_url = "{base}/simple/price"
        dex_graph_url = "{base}/subgraph"
        request_timeout_secs = 5
        "#
    ))
    .unwrap()
}

#[tokio::test]
async fn full_refresh_prices_listed_and_synthetic_tokens() {
    let server = upstreams().await;
    let service = TokenPriceService::from_config(&config(&server.uri())).unwrap();

    service.refresh_token_list().await.unwrap();
    service.refresh_reference_price().await.unwrap();
    service.refresh_market_prices().await.unwrap();

    let registry = service.store().current_registry();
    let symbols: Vec<&str> = registry.iter().map(|t| t.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["ENB", "TKA"]);

    let table = service.store().current_price_table();
    assert_eq!(table.len(), 2);
    assert!((table.get(&Address::new("0xenb")).unwrap().usd - 6.0).abs() < 1e-9);
    let tka = table.get(&Address::new("0xaaa")).unwrap();
    assert_eq!(tka.usd, 1.5);
    assert_eq!(tka.percent_change_1h, 0.5);
    assert_eq!(tka.percent_change_7d, None);

    // Listed on another platform only
    assert!(service.token_price("0xBBB").is_none());
    assert_eq!(service.token_price("0xAAA").unwrap().token.name, "Token A");
}

#[tokio::test]
async fn market_outage_keeps_last_committed_prices() {
    let server = upstreams().await;
    let service = TokenPriceService::from_config(&config(&server.uri())).unwrap();

    service.refresh_token_list().await.unwrap();
    service.refresh_market_prices().await.unwrap();
    let committed = service.store().snapshot();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(service.refresh_market_prices().await.is_err());
    assert!(service.refresh_token_list().await.is_err());

    assert_eq!(*service.store().snapshot(), *committed);
    assert_eq!(service.store().catalog().len(), 3);
    assert_eq!(service.token_price("0xaaa").unwrap().price.usd, 1.5);
}

#[tokio::test]
async fn rest_api_serves_refreshed_prices() {
    let server = upstreams().await;
    let service = Arc::new(TokenPriceService::from_config(&config(&server.uri())).unwrap());
    service.refresh_token_list().await.unwrap();
    service.refresh_reference_price().await.unwrap();
    service.refresh_market_prices().await.unwrap();

    let response = create_router(Arc::clone(&service))
        .oneshot(
            Request::builder()
                .uri("/tokens/0xENB/price")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["symbol"], "ENB");
    assert_eq!(body["address"], "0xenb");
    assert!((body["price"]["usd"].as_f64().unwrap() - 6.0).abs() < 1e-9);
}
