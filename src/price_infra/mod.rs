pub mod aggregator;
pub mod connectors;
pub mod store;
pub mod synthetic;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::address::Address;

/// Quote block of one bulk listing in the convert currency.
///
/// Fields accept numbers or numeric strings; anything else reads as absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct MarketQuote {
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub percent_change_1h: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub percent_change_24h: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub percent_change_7d: Option<f64>,
}

/// Finite `f64` from a JSON number or a numeric string.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_number))
}

/// One entry of the bulk market feed, projected to what the merge needs.
#[derive(Clone, Debug, PartialEq)]
pub struct MarketEntry {
    pub platform_id: Option<u32>,
    pub token_address: Option<Address>,
    pub quote: Option<MarketQuote>,
}

/// The synthetic token's derived price, shaped as a plain `usd` entry.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticQuote {
    pub address: Address,
    pub usd: f64,
}

/// A price-bearing entry after platform filtering: either a bulk listing with
/// a structured quote or the synthetic entry with a bare `usd` value.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceEntry {
    pub address: Address,
    pub quote: Option<MarketQuote>,
    pub usd: Option<f64>,
}

impl From<SyntheticQuote> for PriceEntry {
    fn from(synthetic: SyntheticQuote) -> Self {
        PriceEntry {
            address: synthetic.address,
            quote: None,
            usd: Some(synthetic.usd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_accept_strings_and_reject_garbage() {
        assert_eq!(parse_number(&json!("0.002")), Some(0.002));
        assert_eq!(parse_number(&json!(0.5)), Some(0.5));
        assert_eq!(parse_number(&json!("n/a")), None);
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!(null)), None);
        assert_eq!(parse_number(&json!({"v": 1})), None);
    }

    #[test]
    fn market_quote_reads_string_prices_and_drops_unusable_fields() {
        let quote: MarketQuote = serde_json::from_value(json!({
            "price": "1.0",
            "percent_change_1h": null,
            "percent_change_24h": [1],
            "volume_24h": 10
        }))
        .unwrap();

        assert_eq!(quote.price, Some(1.0));
        assert_eq!(quote.percent_change_1h, None);
        assert_eq!(quote.percent_change_24h, None);
        assert_eq!(quote.percent_change_7d, None);
    }
}
