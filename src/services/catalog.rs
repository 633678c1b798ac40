use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::Item;

/// Errors that can occur when talking to the catalog provider
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Catalog API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// HTTP client for the artwork catalog
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(base_url: String, api_key: Option<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build configured HTTP client ({}), using defaults", e);
                Client::new()
            });

        Self {
            client,
            base_url,
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.api_key {
            Some(key) => request.header("X-Api-Key", key),
            None => request,
        }
    }

    /// Fetch the full catalog
    ///
    /// Accepts either a bare JSON array or an object with an `items` array.
    /// Entries that fail to parse are skipped with a warning rather than
    /// failing the whole catalog.
    pub async fn fetch_items(&self) -> Result<Vec<Item>, CatalogError> {
        let url = format!("{}/api/artworks", self.base_url.trim_end_matches('/'));

        tracing::debug!("Fetching catalog from: {}", url);

        let response = self.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::ApiError(format!(
                "Failed to fetch catalog: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let entries = match &json {
            Value::Array(entries) => entries,
            Value::Object(obj) => obj
                .get("items")
                .and_then(|items| items.as_array())
                .ok_or_else(|| CatalogError::InvalidResponse("Missing items array".into()))?,
            _ => return Err(CatalogError::InvalidResponse("Expected an array of artworks".into())),
        };

        let items: Vec<Item> = entries
            .iter()
            .filter_map(|entry| match serde_json::from_value::<Item>(entry.clone()) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!("Skipping malformed catalog entry: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} catalog items ({} entries)", items.len(), entries.len());

        Ok(items)
    }
}
