use serde::Deserialize;
use std::time::Duration;

pub const ETHEREUM_PLATFORM_ID: u32 = 1027;

/// Upstream endpoints and request parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub token_list_url: String,
    pub market_listings_url: String,
    pub market_api_key: String,
    pub reference_price_url: String,
    pub reference_asset_id: String,
    pub dex_graph_url: String,
    pub platform_id: u32,
    pub convert: String,
    pub listing_limit: u32,
    pub request_timeout_secs: u64,
}

impl SourcesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            token_list_url: "https://tokens.coingecko.com/uniswap/all.json".to_string(),
            market_listings_url:
                "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest".to_string(),
            market_api_key: String::new(),
            reference_price_url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
            reference_asset_id: "ethereum".to_string(),
            dex_graph_url: "https://api.thegraph.com/subgraphs/name/uniswap/uniswap-v2"
                .to_string(),
            platform_id: ETHEREUM_PLATFORM_ID,
            convert: "USD".to_string(),
            listing_limit: 5000,
            request_timeout_secs: 10,
        }
    }
}
