use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::quote::{ReferenceAssetPrice, UsdPrice};
use crate::types::token::{PriceTable, TokenIdentity, TokenRegistry};

/// One wallet holding valued in fiat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    #[serde(flatten)]
    pub token: TokenIdentity,
    pub balance: f64,
    pub fiat_balance: UsdPrice,
}

/// Wallet-balance computation service fed with the current snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletBalanceProvider: Send + Sync {
    async fn fetch_balances(
        &self,
        registry: &TokenRegistry,
        wallet_address: &str,
        reference_price: Option<ReferenceAssetPrice>,
        prices: &PriceTable,
    ) -> Result<Vec<TokenBalance>>;
}
