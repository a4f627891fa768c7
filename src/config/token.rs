use serde::Deserialize;

use crate::types::token::TokenIdentity;

/// Identity of the platform token whose price is derived from the DEX graph.
/// The address has no default and must be configured.
#[derive(Clone, Debug, Deserialize)]
pub struct SyntheticTokenConfig {
    pub address: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_name() -> String {
    "Earnbase".to_string()
}

fn default_symbol() -> String {
    "ENB".to_string()
}

fn default_decimals() -> u8 {
    18
}

impl SyntheticTokenConfig {
    pub fn identity(&self) -> TokenIdentity {
        TokenIdentity::new(&self.address, &self.name, &self.symbol, self.decimals)
    }
}
