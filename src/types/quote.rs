use serde::{Deserialize, Serialize};

/// Fiat quote for one token as committed into the price table.
///
/// `percent_change_7d` stays `None` when the bulk feed omits it, unlike the
/// 1h and 24h fields which fall back to zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub usd: f64,
    pub percent_change_1h: f64,
    pub percent_change_24h: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub percent_change_7d: Option<f64>,
}

impl PriceQuote {
    pub fn zero() -> Self {
        PriceQuote {
            usd: 0.0,
            percent_change_1h: 0.0,
            percent_change_24h: 0.0,
            percent_change_7d: None,
        }
    }

    pub fn from_usd(usd: f64) -> Self {
        PriceQuote {
            usd,
            ..PriceQuote::zero()
        }
    }
}

/// Spot price of the chain's native asset (ethereum).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceAssetPrice {
    pub usd: f64,
    pub percent_change_24h: f64,
}

/// The `price` member of a public token lookup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UsdPrice {
    pub usd: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_seven_day_change_is_omitted() {
        let value = serde_json::to_value(PriceQuote::from_usd(6.0)).unwrap();
        assert_eq!(
            value,
            json!({"usd": 6.0, "percentChange1h": 0.0, "percentChange24h": 0.0})
        );
    }

    #[test]
    fn present_seven_day_change_is_serialized() {
        let quote = PriceQuote {
            percent_change_7d: Some(-3.5),
            ..PriceQuote::from_usd(1.0)
        };
        let value = serde_json::to_value(quote).unwrap();
        assert_eq!(value["percentChange7d"], json!(-3.5));
    }
}
