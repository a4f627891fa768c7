use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{Error, Result};

/// Fetch-and-decode wrapper around one remote JSON endpoint.
///
/// Transport failures and non-success statuses map to `Error::Transport` and
/// `Error::UpstreamStatus`; bodies that do not decode map to
/// `Error::DeserializationError`.
#[derive(Clone, Debug)]
pub struct HttpDataSource {
    source_id: String,
    client: Client,
    url: Url,
}

impl HttpDataSource {
    pub fn new(source_id: &str, url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("HTTP client for {}: {}", source_id, e)))?;
        Self::with_client(source_id, client, url)
    }

    pub fn with_client(source_id: &str, client: Client, url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        Ok(HttpDataSource {
            source_id: source_id.to_string(),
            client,
            url,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        query: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<T> {
        let mut request = self.client.get(self.url.clone()).query(query);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.send(request).await
    }

    pub async fn post_json<B, T>(&self, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url.clone()).json(body);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                source_id: self.source_id.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        serde_json::from_slice(&body)
            .map_err(|e| Error::DeserializationError(format!("{}: {}", self.source_id, e)))
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        Error::Transport {
            source_id: self.source_id.clone(),
            message: e.to_string(),
        }
    }
}
