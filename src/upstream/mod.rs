//! Upstream card catalog access.
//!
//! - [`traits::CatalogSource`]: single-attempt search, the test seam.
//! - [`catalog::HttpCatalog`]: reqwest client for the public API.
//! - [`retry`]: backoff schedule and the classified attempt loop.

pub mod catalog;
pub mod retry;
pub mod traits;

pub use catalog::{DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT, HttpCatalog};
pub use retry::{Attempt, RetryConfig};
pub use traits::CatalogSource;
