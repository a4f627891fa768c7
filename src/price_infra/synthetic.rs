use std::sync::Arc;

use crate::price_infra::SyntheticQuote;
use crate::price_infra::connectors::DerivedRatioSource;
use crate::types::address::Address;
use crate::types::quote::ReferenceAssetPrice;

/// Prices the synthetic token as `derived_ratio * reference.usd`.
pub struct SyntheticTokenPriceResolver {
    token: Address,
    source: Arc<dyn DerivedRatioSource>,
}

impl SyntheticTokenPriceResolver {
    pub fn new(token: Address, source: Arc<dyn DerivedRatioSource>) -> Self {
        SyntheticTokenPriceResolver { token, source }
    }

    /// Never fails: a graph error or a missing operand yields a zero price so
    /// the merge pass can still run.
    pub async fn resolve(&self, reference: Option<&ReferenceAssetPrice>) -> SyntheticQuote {
        let ratio = match self.source.query_derived_ratio(&self.token).await {
            Ok(ratio) => ratio,
            Err(e) => {
                tracing::warn!("Synthetic token ratio unavailable for {}: {}", self.token, e);
                None
            }
        };

        SyntheticQuote {
            address: self.token.clone(),
            usd: synthetic_usd(ratio, reference.map(|r| r.usd)),
        }
    }
}

pub fn synthetic_usd(derived_ratio: Option<f64>, reference_usd: Option<f64>) -> f64 {
    match (derived_ratio, reference_usd) {
        (Some(ratio), Some(usd)) => {
            let price = ratio * usd;
            if price.is_finite() { price } else { 0.0 }
        }
        _ => 0.0,
    }
}
