//! Cardseer - coalescing, rate-limited trading card lookup
//!
//! Resolves queries like "Pikachu 58/102" to a single card from the
//! Pokémon TCG catalog API on behalf of many concurrent callers. The crate
//! handles per-caller rate limiting, request coalescing (identical
//! in-flight lookups share one upstream call), a process-wide cap on
//! concurrent upstream calls, retry with jittered exponential backoff, a
//! result cache, and deterministic disambiguation between printings of the
//! same card in different sets.
//!
//! Presentation (chat replies, images, loading indicators) is left to the
//! caller; every outcome is either a [`Card`] or a [`LookupError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use cardseer::CardLookup;
//!
//! #[tokio::main]
//! async fn main() -> cardseer::Result<()> {
//!     let lookup = CardLookup::builder().build()?;
//!
//!     let card = lookup.lookup(42, "Pikachu", "58", 102).await?;
//!     println!("{} ({})", card.name, card.rarity.as_deref().unwrap_or("?"));
//!
//!     let same = lookup.lookup_query(42, "pikachu (058/102)").await?;
//!     assert_eq!(card, same);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod limiter;
pub mod lookup;
pub mod query;
pub mod selector;
pub mod telemetry;
pub mod types;
pub mod upstream;

// Re-export main types at crate root
pub use cache::ResultCache;
pub use config::Config;
pub use coordinator::FetchCoordinator;
pub use error::{LookupError, Result, UpstreamError};
pub use limiter::{CallerId, RateLimitConfig, RateLimiter};
pub use lookup::{CardLookup, CardLookupBuilder};
pub use query::{CardQuery, QueryKey, parse_query};
pub use selector::select;
pub use types::{Ability, Attack, Card, CardImages, CardList, CardSet};
pub use upstream::{CatalogSource, HttpCatalog, RetryConfig};
