use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::sources::SourcesConfig;
use crate::error::{Error, Result};
use crate::price_infra::connectors::ReferencePriceSource;
use crate::price_infra::connectors::http::HttpDataSource;
use crate::types::quote::ReferenceAssetPrice;

const SOURCE_ID: &str = "reference_price";

/// CoinGecko `/simple/price` for a single asset id.
pub struct ReferenceAssetPriceFetcher {
    http: HttpDataSource,
    asset_id: String,
}

impl ReferenceAssetPriceFetcher {
    pub fn new(http: HttpDataSource, asset_id: &str) -> Self {
        ReferenceAssetPriceFetcher {
            http,
            asset_id: asset_id.to_string(),
        }
    }

    pub fn from_config(sources: &SourcesConfig) -> Result<Self> {
        let http = HttpDataSource::new(
            SOURCE_ID,
            &sources.reference_price_url,
            sources.request_timeout(),
        )?;
        Ok(Self::new(http, &sources.reference_asset_id))
    }
}

#[async_trait]
impl ReferencePriceSource for ReferenceAssetPriceFetcher {
    async fn fetch_reference_price(&self) -> Result<ReferenceAssetPrice> {
        let query = [
            ("ids", self.asset_id.clone()),
            ("include_24hr_change", "true".to_string()),
            ("vs_currencies", "usd".to_string()),
        ];

        // {"ethereum": {"usd": 3000.0, "usd_24h_change": 1.2}}
        let mut parsed: HashMap<String, SimplePrice> = self.http.get_json(&query, &[]).await?;

        let price = parsed
            .remove(&self.asset_id)
            .ok_or_else(|| Error::malformed(SOURCE_ID, format!("`{}` missing", self.asset_id)))?;

        if !price.usd.is_finite() {
            return Err(Error::malformed(SOURCE_ID, "non-finite usd price"));
        }

        Ok(ReferenceAssetPrice {
            usd: price.usd,
            percent_change_24h: price.usd_24h_change.unwrap_or(0.0),
        })
    }
}

#[derive(Deserialize)]
struct SimplePrice {
    usd: f64,
    usd_24h_change: Option<f64>,
}
