//! Telemetry metric name constants.
//!
//! Centralised metric names for cardseer operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `cardseer_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).

/// Total lookups completed.
///
/// Labels: `status` ("ok" | "throttled" | "invalid_query" | "upstream_failure"
/// | "not_found" | "ambiguous").
pub const LOOKUPS_TOTAL: &str = "cardseer_lookups_total";

/// Total lookups rejected by the per-caller rate limiter.
pub const THROTTLED_TOTAL: &str = "cardseer_throttled_total";

/// Total result cache hits.
pub const CACHE_HITS_TOTAL: &str = "cardseer_cache_hits_total";

/// Total result cache misses.
pub const CACHE_MISSES_TOTAL: &str = "cardseer_cache_misses_total";

/// Total upstream HTTP attempts.
///
/// Labels: `status` ("ok" | "error").
pub const UPSTREAM_REQUESTS_TOTAL: &str = "cardseer_upstream_requests_total";

/// Total retry attempts (not counting the initial request).
pub const RETRIES_TOTAL: &str = "cardseer_retries_total";

/// Total fetches that joined an existing in-flight request instead of
/// issuing their own.
pub const COALESCED_TOTAL: &str = "cardseer_coalesced_total";

/// Duration of a single upstream attempt in seconds.
pub const UPSTREAM_DURATION_SECONDS: &str = "cardseer_upstream_duration_seconds";
