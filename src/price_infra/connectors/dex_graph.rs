use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::sources::SourcesConfig;
use crate::error::{Error, Result};
use crate::price_infra::connectors::DerivedRatioSource;
use crate::price_infra::connectors::http::HttpDataSource;
use crate::price_infra::parse_number;
use crate::types::address::Address;

const SOURCE_ID: &str = "dex_graph";

/// Uniswap V2 subgraph client answering `token(id) { derivedETH }`.
pub struct DexPriceGraph {
    http: HttpDataSource,
}

impl DexPriceGraph {
    pub fn new(http: HttpDataSource) -> Self {
        DexPriceGraph { http }
    }

    pub fn from_config(sources: &SourcesConfig) -> Result<Self> {
        Ok(Self::new(HttpDataSource::new(
            SOURCE_ID,
            &sources.dex_graph_url,
            sources.request_timeout(),
        )?))
    }
}

fn derived_ratio_query(token: &Address) -> Value {
    json!({
        "query": format!("{{ token(id: \"{}\") {{ derivedETH }} }}", token),
    })
}

#[async_trait]
impl DerivedRatioSource for DexPriceGraph {
    async fn query_derived_ratio(&self, token: &Address) -> Result<Option<f64>> {
        let response: GraphResponse = self.http.post_json(&derived_ratio_query(token)).await?;

        if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GraphQlError(messages.join("; ")));
        }

        Ok(response
            .data
            .and_then(|d| d.token)
            .and_then(|t| t.derived_eth)
            .as_ref()
            .and_then(parse_number))
    }
}

#[derive(Deserialize)]
struct GraphResponse {
    data: Option<GraphData>,
    errors: Option<Vec<GraphError>>,
}

#[derive(Deserialize)]
struct GraphData {
    token: Option<GraphToken>,
}

#[derive(Deserialize)]
struct GraphToken {
    // BigDecimal, which subgraphs serialize as a string
    #[serde(rename = "derivedETH")]
    derived_eth: Option<Value>,
}

#[derive(Deserialize)]
struct GraphError {
    #[serde(default)]
    message: String,
}
