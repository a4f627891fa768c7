pub mod dex_graph;
pub mod http;
pub mod market;
pub mod reference;
pub mod token_list;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::price_infra::MarketEntry;
use crate::types::address::Address;
use crate::types::quote::ReferenceAssetPrice;
use crate::types::token::TokenIdentity;

/// Decodes each row on its own, dropping the ones that do not fit `T`.
pub fn decode_rows<T: DeserializeOwned>(source_id: &str, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect();

    let skipped = total - decoded.len();
    if skipped > 0 {
        tracing::warn!("{}: skipped {} of {} malformed rows", source_id, skipped, total);
    }
    decoded
}

/// Canonical token list, fetched daily.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenListSource: Send + Sync {
    async fn fetch_tokens(&self) -> Result<Vec<TokenIdentity>>;
}

/// Bulk market listings for the whole token universe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketPriceSource: Send + Sync {
    async fn fetch_listings(&self) -> Result<Vec<MarketEntry>>;
}

/// Spot price of the reference asset.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferencePriceSource: Send + Sync {
    async fn fetch_reference_price(&self) -> Result<ReferenceAssetPrice>;
}

/// Price of a token expressed in the reference asset, as reported by a DEX
/// pricing graph. `Ok(None)` means the graph does not know the token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DerivedRatioSource: Send + Sync {
    async fn query_derived_ratio(&self, token: &Address) -> Result<Option<f64>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: u8,
    }

    #[test]
    fn bad_rows_are_dropped_and_good_rows_kept() {
        let rows = vec![json!({"id": 1}), json!({"id": 300}), json!("x"), json!({"id": 2})];

        let decoded: Vec<Row> = decode_rows("test", rows);

        assert_eq!(decoded, vec![Row { id: 1 }, Row { id: 2 }]);
    }
}
