//! HTTP client for the Pokémon TCG card catalog.
//!
//! See: <https://docs.pokemontcg.io/api-reference/cards/search-cards>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};

use super::traits::CatalogSource;
use crate::error::UpstreamError;
use crate::types::CardList;
use crate::{LookupError, Result};

/// Default card search endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://api.pokemontcg.io/v2/cards";

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

/// Longest error body excerpt kept in [`UpstreamError::Api`].
const MAX_ERROR_BODY: usize = 200;

/// Client for the card search endpoint.
#[derive(Clone)]
pub struct HttpCatalog {
    http: Client,
    url: String,
}

impl HttpCatalog {
    /// Client for the public endpoint with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT)
    }

    /// Client for a custom endpoint (for testing with wiremock).
    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                LookupError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    fn name(&self) -> &str {
        "pokemontcg"
    }

    async fn search(&self, query: &str) -> std::result::Result<CardList, UpstreamError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(UpstreamError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message: excerpt(&body),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_kept_whole() {
        assert_eq!(excerpt("  bad gateway \n"), "bad gateway");
    }

    #[test]
    fn long_bodies_truncated_on_char_boundary() {
        let body = "é".repeat(MAX_ERROR_BODY + 10);
        let cut = excerpt(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), MAX_ERROR_BODY + 3);
    }

    #[test]
    fn default_client_targets_public_endpoint() {
        let catalog = HttpCatalog::new().unwrap();
        assert_eq!(catalog.url(), DEFAULT_CATALOG_URL);
    }
}
