//! The seam between the fetch coordinator and the card catalog.
//!
//! [`FetchCoordinator`](crate::coordinator::FetchCoordinator) only knows
//! about [`CatalogSource`]. Production code plugs in
//! [`HttpCatalog`](super::HttpCatalog); tests plug in scripted sources that
//! count calls or simulate failures.

use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::types::CardList;

/// One attempt at searching the catalog.
///
/// Implementations perform exactly one request per call and never retry;
/// retry, backoff, coalescing and concurrency limiting are the
/// coordinator's job.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Source name for logging/debugging.
    fn name(&self) -> &str;

    /// Search with the catalog's `q` expression, e.g.
    /// `name:"Pikachu" number:"58"`.
    async fn search(&self, query: &str) -> Result<CardList, UpstreamError>;
}
