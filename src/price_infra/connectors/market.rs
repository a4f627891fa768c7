use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::config::sources::SourcesConfig;
use crate::error::{Error, Result};
use crate::price_infra::connectors::{MarketPriceSource, decode_rows};
use crate::price_infra::connectors::http::HttpDataSource;
use crate::price_infra::{MarketEntry, MarketQuote};
use crate::types::address::Address;

const SOURCE_ID: &str = "market_listings";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// CoinMarketCap `/cryptocurrency/listings/latest` restricted to tokens.
pub struct MarketPriceFetcher {
    http: HttpDataSource,
    api_key: String,
    convert: String,
    limit: u32,
}

impl MarketPriceFetcher {
    pub fn new(http: HttpDataSource, api_key: &str, convert: &str, limit: u32) -> Self {
        MarketPriceFetcher {
            http,
            api_key: api_key.to_string(),
            convert: convert.to_string(),
            limit,
        }
    }

    pub fn from_config(sources: &SourcesConfig) -> Result<Self> {
        let http = HttpDataSource::new(
            SOURCE_ID,
            &sources.market_listings_url,
            sources.request_timeout(),
        )?;
        Ok(Self::new(
            http,
            &sources.market_api_key,
            &sources.convert,
            sources.listing_limit,
        ))
    }

    fn project(&self, listing: Listing) -> MarketEntry {
        let (platform_id, token_address) = match listing.platform {
            Some(platform) => (
                platform.id,
                platform.token_address.as_deref().map(Address::new),
            ),
            None => (None, None),
        };

        MarketEntry {
            platform_id,
            token_address,
            quote: listing.quote.get(&self.convert).copied(),
        }
    }
}

#[async_trait]
impl MarketPriceSource for MarketPriceFetcher {
    async fn fetch_listings(&self) -> Result<Vec<MarketEntry>> {
        let query = [
            ("start", "1".to_string()),
            ("limit", self.limit.to_string()),
            ("convert", self.convert.clone()),
            ("cryptocurrency_type", "tokens".to_string()),
        ];
        let headers = [(API_KEY_HEADER, self.api_key.as_str())];

        let response: ListingsResponse = self.http.get_json(&query, &headers).await?;

        let listings = response
            .data
            .ok_or_else(|| Error::malformed(SOURCE_ID, "missing `data` array"))?;

        Ok(decode_rows::<Listing>(SOURCE_ID, listings)
            .into_iter()
            .map(|l| self.project(l))
            .collect())
    }
}

#[derive(Deserialize)]
struct ListingsResponse {
    data: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    platform: Option<Platform>,
    #[serde(default)]
    quote: HashMap<String, MarketQuote>,
}

#[derive(Deserialize)]
struct Platform {
    id: Option<u32>,
    token_address: Option<String>,
}
