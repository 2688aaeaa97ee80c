//! CardLookup - admission, cache, coordinated fetch, selection

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::cache::ResultCache;
use crate::coordinator::FetchCoordinator;
use crate::limiter::{CallerId, RateLimiter};
use crate::query::{CardQuery, parse_query};
use crate::selector::select;
use crate::telemetry;
use crate::types::Card;
use crate::{LookupError, Result};

/// Resolves card queries for many concurrent callers.
///
/// Each lookup runs: rate limit → normalize → cache → coordinated fetch →
/// selection → cache write. Only successful selections are cached; empty
/// and ambiguous results are returned as errors and retried from scratch
/// next time.
pub struct CardLookup {
    limiter: RateLimiter,
    cache: ResultCache,
    coordinator: FetchCoordinator,
}

impl CardLookup {
    pub(crate) fn new(
        limiter: RateLimiter,
        cache: ResultCache,
        coordinator: FetchCoordinator,
    ) -> Self {
        Self {
            limiter,
            cache,
            coordinator,
        }
    }

    /// Find the single card matching `name`, `number` and the collection
    /// size `total` on behalf of `caller`.
    #[instrument(skip(self), level = "debug")]
    pub async fn lookup(
        &self,
        caller: CallerId,
        name: &str,
        number: &str,
        total: u32,
    ) -> Result<Arc<Card>> {
        let result: Result<Arc<Card>> = async {
            self.admit(caller)?;
            let query = CardQuery::new(name, number, total)?;
            self.resolve(&query).await
        }
        .await;
        record_outcome(&result);
        result
    }

    /// Like [`lookup()`](Self::lookup), parsing free text such as
    /// `Pikachu (58/102)` first. The rate limit applies before parsing.
    #[instrument(skip(self), level = "debug")]
    pub async fn lookup_query(&self, caller: CallerId, text: &str) -> Result<Arc<Card>> {
        let result: Result<Arc<Card>> = async {
            self.admit(caller)?;
            let parsed = parse_query(text)?;
            let query = CardQuery::new(&parsed.name, &parsed.number, parsed.total)?;
            self.resolve(&query).await
        }
        .await;
        record_outcome(&result);
        result
    }

    /// Up to `limit` cards currently cached, in no particular order.
    pub fn cached_cards(&self, limit: usize) -> Vec<Arc<Card>> {
        self.cache.cards(limit)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn coordinator(&self) -> &FetchCoordinator {
        &self.coordinator
    }

    fn admit(&self, caller: CallerId) -> Result<()> {
        if self.limiter.allow(caller) {
            Ok(())
        } else {
            metrics::counter!(telemetry::THROTTLED_TOTAL).increment(1);
            Err(LookupError::Throttled)
        }
    }

    async fn resolve(&self, query: &CardQuery) -> Result<Arc<Card>> {
        let key = query.key();
        if let Some(card) = self.cache.get(key) {
            return Ok(card);
        }

        let list = self.coordinator.fetch(query).await?;
        if list.data.is_empty() {
            return Err(LookupError::NotFound {
                name: query.display_name().to_string(),
                number: query.number().to_string(),
            });
        }

        let card = select(&list.data, query.total())
            .map(|c| Arc::new(c.clone()))
            .ok_or_else(|| LookupError::Ambiguous {
                name: query.display_name().to_string(),
                number: query.number().to_string(),
                total: query.total(),
            })?;

        debug!(%key, card = %card.name, "caching selection");
        self.cache.put(key.clone(), Arc::clone(&card));
        Ok(card)
    }
}

fn record_outcome(result: &Result<Arc<Card>>) {
    let status = match result {
        Ok(_) => "ok",
        Err(LookupError::Throttled) => "throttled",
        Err(LookupError::InvalidQuery(_)) => "invalid_query",
        Err(LookupError::UpstreamFailure(_)) => "upstream_failure",
        Err(LookupError::NotFound { .. }) => "not_found",
        Err(LookupError::Ambiguous { .. }) => "ambiguous",
        Err(LookupError::Configuration(_)) => "configuration",
    };
    metrics::counter!(telemetry::LOOKUPS_TOTAL, "status" => status).increment(1);
}
