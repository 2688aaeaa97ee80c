//! Coalescing, concurrency-limited fetches from the card catalog.
//!
//! # Leader / follower
//!
//! The first caller for a [`QueryKey`] publishes an in-flight slot and
//! spawns the leader task that does the network work. Any caller arriving
//! for the same key while the slot is in the table becomes a follower: it
//! clones the slot's receiver and waits for settlement without touching
//! the network. The existence check and the publish/join happen under one
//! lock, so two leaders can never form for one key and a follower can never
//! miss a slot that was just published.
//!
//! The slot is a `watch` channel holding `Option<Settled>`: written once by
//! the leader, readable by any number of followers. A follower's receiver
//! stays valid after the leader removes the table entry.
//!
//! # Lifecycle per key
//!
//! `absent → leading → settled → absent`. The leader task holds one permit
//! from the process-wide semaphore for the whole attempt sequence, backoff
//! sleeps included. On every exit path (success, exhaustion, panic) the
//! permit is released and the table entry removed; a leader task that dies
//! without settling closes the channel and followers receive
//! [`UpstreamError::Abandoned`].
//!
//! Settlement removes the entry and publishes the outcome under the same
//! table lock. A caller that arrives after settlement therefore never sees
//! the old slot and always starts a fresh cycle.
//!
//! Because the work runs on its own task, a caller that stops waiting
//! (leader or follower) does not cancel the fetch for anyone else.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::sync::{Semaphore, watch};
use tracing::{debug, info};

use crate::error::UpstreamError;
use crate::query::{CardQuery, QueryKey};
use crate::telemetry;
use crate::types::CardList;
use crate::upstream::retry::with_retry;
use crate::upstream::{CatalogSource, RetryConfig};

/// Default number of upstream fetches allowed at once, process-wide.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 5;

/// Terminal outcome of one fetch cycle, shared by leader and followers.
pub type Settled = Result<Arc<CardList>, UpstreamError>;

type Slot = watch::Receiver<Option<Settled>>;

/// Deduplicating, retrying gateway to a [`CatalogSource`].
///
/// Cheap to clone; clones share the in-flight table and the permit pool.
#[derive(Clone)]
pub struct FetchCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn CatalogSource>,
    retry: RetryConfig,
    permits: Semaphore,
    concurrency_limit: usize,
    in_flight: Mutex<HashMap<QueryKey, Slot>>,
}

impl FetchCoordinator {
    /// Create a coordinator allowing `concurrency_limit` simultaneous
    /// upstream fetches. A limit of zero is raised to one.
    pub fn new(
        source: Arc<dyn CatalogSource>,
        retry: RetryConfig,
        concurrency_limit: usize,
    ) -> Self {
        let concurrency_limit = concurrency_limit.max(1);
        Self {
            inner: Arc::new(Inner {
                source,
                retry,
                permits: Semaphore::new(concurrency_limit),
                concurrency_limit,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Fetch the candidate list for `query`, joining an in-flight fetch for
    /// the same key if there is one.
    ///
    /// Every caller that joined a cycle receives the same value or the same
    /// error.
    pub async fn fetch(&self, query: &CardQuery) -> Settled {
        let slot = self.join_or_lead(query);
        wait_for_settlement(slot).await
    }

    /// Number of keys with a fetch currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.table().len()
    }

    /// Permits not currently held by a leader.
    pub fn available_permits(&self) -> usize {
        self.inner.permits.available_permits()
    }

    pub fn concurrency_limit(&self) -> usize {
        self.inner.concurrency_limit
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry
    }

    fn join_or_lead(&self, query: &CardQuery) -> Slot {
        let key = query.key();
        let mut table = self.inner.table();
        if let Some(slot) = table.get(key) {
            metrics::counter!(telemetry::COALESCED_TOTAL).increment(1);
            debug!(%key, "joining in-flight fetch");
            return slot.clone();
        }

        let (tx, rx) = watch::channel(None);
        table.insert(key.clone(), rx.clone());
        drop(table);

        let inner = Arc::clone(&self.inner);
        let key = key.clone();
        let search = query.search_param();
        tokio::spawn(inner.lead(key, search, tx));
        rx
    }
}

impl Inner {
    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<QueryKey, Slot>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn lead(
        self: Arc<Self>,
        key: QueryKey,
        search: String,
        tx: watch::Sender<Option<Settled>>,
    ) {
        let entry = InFlightEntry {
            table: &self.in_flight,
            key: &key,
            tx,
            settled: false,
        };
        let settled = self.fetch_with_permit(&key, &search).await;
        match &settled {
            Ok(list) => info!(%key, candidates = list.data.len(), "fetch settled"),
            Err(e) => info!(%key, error = %e, "fetch failed"),
        }
        entry.settle(settled);
    }

    async fn fetch_with_permit(&self, key: &QueryKey, search: &str) -> Settled {
        let Ok(_permit) = self.permits.acquire().await else {
            return Err(UpstreamError::Abandoned);
        };
        debug!(%key, available = self.permits.available_permits(), "permit acquired");

        with_retry(&self.retry, key, || self.attempt(search))
            .await
            .into_result()
            .map(Arc::new)
    }

    async fn attempt(&self, search: &str) -> Result<CardList, UpstreamError> {
        let start = Instant::now();
        let result = self.source.search(search).await;
        metrics::histogram!(telemetry::UPSTREAM_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::UPSTREAM_REQUESTS_TOTAL, "status" => status).increment(1);
        result
    }
}

/// The leader's hold on its table entry.
///
/// [`settle()`](Self::settle) removes the entry and publishes the outcome
/// under one table lock, so no caller can join a slot that has already
/// settled. If the leader dies first, `Drop` removes the entry and the
/// sender is dropped with it, closing the slot.
struct InFlightEntry<'a> {
    table: &'a Mutex<HashMap<QueryKey, Slot>>,
    key: &'a QueryKey,
    tx: watch::Sender<Option<Settled>>,
    settled: bool,
}

impl InFlightEntry<'_> {
    fn settle(mut self, settled: Settled) {
        let table = self.table;
        let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
        table.remove(self.key);
        self.tx.send_replace(Some(settled));
        drop(table);
        self.settled = true;
    }
}

impl Drop for InFlightEntry<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(self.key);
    }
}

async fn wait_for_settlement(mut slot: Slot) -> Settled {
    match slot.wait_for(Option::is_some).await {
        Ok(settled) => (*settled)
            .clone()
            .unwrap_or(Err(UpstreamError::Abandoned)),
        Err(_) => Err(UpstreamError::Abandoned),
    }
}
