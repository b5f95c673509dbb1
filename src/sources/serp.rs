//! Thin SerpAPI client shared by every search-backed source.

use crate::types::{AppError, Result};
use serde_json::Value;

const SERPAPI_BASE: &str = "https://serpapi.com/search.json";

/// Handle to the SerpAPI search endpoint.
///
/// Constructed once at startup and cloned into each source that needs it.
/// An empty API key is valid configuration: callers check
/// [`SerpClient::is_configured`] and degrade to empty results.
#[derive(Debug, Clone)]
pub struct SerpClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerpClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: SERPAPI_BASE.to_string(),
        }
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Run one search with the given engine parameters.
    pub async fn search(&self, params: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .http
            .get(&self.base_url)
            .query(params)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Source(format!(
                "SerpAPI returned {} for engine '{}'",
                status,
                params
                    .iter()
                    .find(|(k, _)| *k == "engine")
                    .map(|(_, v)| *v)
                    .unwrap_or("unknown"),
            )));
        }

        Ok(response.json().await?)
    }
}

/// Read a string field out of a SerpAPI result object.
pub fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// The `organic_results` array of a response, empty when absent.
pub fn organic_results(data: &Value) -> &[Value] {
    data.get("organic_results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
