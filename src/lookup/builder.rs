//! Builder for configuring lookup service instances

use std::sync::Arc;
use std::time::Duration;

use super::CardLookup;
use crate::Result;
use crate::cache::ResultCache;
use crate::coordinator::{DEFAULT_CONCURRENCY_LIMIT, FetchCoordinator};
use crate::limiter::{RateLimitConfig, RateLimiter};
use crate::upstream::{
    CatalogSource, DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT, HttpCatalog, RetryConfig,
};

impl CardLookup {
    /// Create a new builder for configuring the lookup service.
    pub fn builder() -> CardLookupBuilder {
        CardLookupBuilder::new()
    }
}

/// Builder for configuring lookup service instances.
///
/// ```rust
/// # use cardseer::{CardLookup, RateLimitConfig, RetryConfig};
/// # use std::time::Duration;
/// let lookup = CardLookup::builder()
///     .timeout(Duration::from_secs(5))
///     .concurrency_limit(2)
///     .rate_limit(RateLimitConfig::new().max_calls(20))
///     .retry(RetryConfig::new().max_attempts(4))
///     .build()
///     .unwrap();
/// assert_eq!(lookup.coordinator().concurrency_limit(), 2);
/// ```
pub struct CardLookupBuilder {
    catalog_url: Option<String>,
    timeout: Duration,
    rate_limit: RateLimitConfig,
    retry: RetryConfig,
    concurrency_limit: usize,
    catalog: Option<Arc<dyn CatalogSource>>,
}

impl CardLookupBuilder {
    pub fn new() -> Self {
        Self {
            catalog_url: None,
            timeout: DEFAULT_TIMEOUT,
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            catalog: None,
        }
    }

    /// Card search endpoint (default: the public Pokémon TCG API).
    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = Some(url.into());
        self
    }

    /// Per-attempt HTTP timeout (default: 12s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-caller admission control.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Backoff schedule for transient upstream errors.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Maximum simultaneous upstream fetches, process-wide (default: 5).
    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Use a custom catalog source instead of the HTTP client.
    ///
    /// Overrides `catalog_url` and `timeout`.
    pub fn catalog(mut self, source: Arc<dyn CatalogSource>) -> Self {
        self.catalog = Some(source);
        self
    }

    /// Build the service.
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<CardLookup> {
        let source = match self.catalog {
            Some(source) => source,
            None => {
                let url = self
                    .catalog_url
                    .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
                Arc::new(HttpCatalog::with_url(url, self.timeout)?) as Arc<dyn CatalogSource>
            }
        };

        let coordinator = FetchCoordinator::new(source, self.retry, self.concurrency_limit);
        Ok(CardLookup::new(
            RateLimiter::new(self.rate_limit),
            ResultCache::new(),
            coordinator,
        ))
    }
}

impl Default for CardLookupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
