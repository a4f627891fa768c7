use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::sources::SourcesConfig;
use crate::error::{Error, Result};
use crate::price_infra::connectors::{TokenListSource, decode_rows};
use crate::price_infra::connectors::http::HttpDataSource;
use crate::types::token::TokenIdentity;

const SOURCE_ID: &str = "token_list";

/// Uniswap-format token list (`{"tokens": [...]}`), e.g. the CoinGecko mirror.
pub struct TokenListFetcher {
    http: HttpDataSource,
}

impl TokenListFetcher {
    pub fn new(http: HttpDataSource) -> Self {
        TokenListFetcher { http }
    }

    pub fn from_config(sources: &SourcesConfig) -> Result<Self> {
        Ok(Self::new(HttpDataSource::new(
            SOURCE_ID,
            &sources.token_list_url,
            sources.request_timeout(),
        )?))
    }
}

#[async_trait]
impl TokenListSource for TokenListFetcher {
    async fn fetch_tokens(&self) -> Result<Vec<TokenIdentity>> {
        let document: TokenListDocument = self.http.get_json(&[], &[]).await?;

        let tokens = document
            .tokens
            .ok_or_else(|| Error::malformed(SOURCE_ID, "missing `tokens` array"))?;

        Ok(decode_rows::<ListedToken>(SOURCE_ID, tokens)
            .into_iter()
            .filter(|t| !t.address.trim().is_empty())
            .map(|t| TokenIdentity::new(&t.address, &t.name, &t.symbol, t.decimals))
            .collect())
    }
}

#[derive(Deserialize)]
struct TokenListDocument {
    tokens: Option<Vec<Value>>,
}

// Only the projected fields; chainId, logoURI and the rest are ignored.
#[derive(Deserialize)]
struct ListedToken {
    address: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    decimals: u8,
}
