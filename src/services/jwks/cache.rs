//! Key-set cache with single-flight fetches and background refresh.
//!
//! # Cache Behavior
//!
//! - `configure` registers a source URL; nothing is fetched until first use.
//! - First `fetch` for a URL blocks until the document is downloaded and
//!   parsed. Concurrent callers join that one request and all get its
//!   result, success or failure. Failures are not cached.
//! - While the cached set is fresh it is returned without network access.
//! - Once stale, the cached set is still returned immediately and one
//!   background refresh is spawned. Readers keep getting the last-good set
//!   until the refresh publishes a new one; a failed refresh only logs.
//! - Refresh attempts for a URL are at least `min_refresh_interval` apart.
//!
//! The in-flight fetch is a [`Shared`] future; the entry only keeps a weak
//! handle to it. When every caller waiting on a first fetch goes away the
//! download is dropped with them and the next caller starts over.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::services::jwks::{KeySet, KeySetError, KeySetFetcher};

type FetchResult = Result<Arc<KeySet>, KeySetError>;
type FetchFuture = BoxFuture<'static, FetchResult>;

/// When a cached key set is considered stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    // Freshness used when the source does not advertise `max-age`.
    pub refresh_interval: Duration,
    // Lower bound for freshness and for the gap between refresh attempts.
    pub min_refresh_interval: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(15 * 60),
            min_refresh_interval: Duration::from_secs(60),
        }
    }
}

impl RefreshPolicy {
    fn fresh_for(&self, max_age: Option<Duration>) -> Duration {
        max_age
            .unwrap_or(self.refresh_interval)
            .max(self.min_refresh_interval)
    }
}

struct Snapshot {
    keys: Arc<KeySet>,
    fetched_at: Instant,
    fresh_for: Duration,
}

impl Snapshot {
    fn is_stale(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) >= self.fresh_for
    }
}

#[derive(Default)]
struct EntryState {
    current: Option<Snapshot>,
    in_flight: Option<WeakShared<FetchFuture>>,
    last_attempt: Option<Instant>,
}

impl EntryState {
    fn in_flight(&self) -> Option<Shared<FetchFuture>> {
        self.in_flight.as_ref().and_then(WeakShared::upgrade)
    }

    fn attempt_allowed(&self, now: Instant, min_interval: Duration) -> bool {
        self.last_attempt
            .is_none_or(|at| now.saturating_duration_since(at) >= min_interval)
    }
}

struct CacheEntry {
    url: String,
    state: Mutex<EntryState>,
}

impl CacheEntry {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            state: Mutex::new(EntryState::default()),
        }
    }

    fn publish(
        &self,
        outcome: Result<(KeySet, Option<Duration>), KeySetError>,
        policy: RefreshPolicy,
    ) -> FetchResult {
        let mut state = self.state.lock();
        state.in_flight = None;

        match outcome {
            Ok((keys, max_age)) => {
                let keys = Arc::new(keys);
                let fresh_for = policy.fresh_for(max_age);
                if keys.is_empty() {
                    warn!(url = %self.url, "key set has no usable signature keys");
                }
                info!(
                    url = %self.url,
                    keys = keys.len(),
                    kids = ?keys.kids().collect::<Vec<_>>(),
                    fresh_for_secs = fresh_for.as_secs(),
                    "key set cached"
                );
                state.current = Some(Snapshot {
                    keys: Arc::clone(&keys),
                    fetched_at: Instant::now(),
                    fresh_for,
                });
                Ok(keys)
            }
            Err(err) => {
                if state.current.is_some() {
                    warn!(url = %self.url, error = %err, "key set refresh failed; serving last-good key set");
                } else {
                    warn!(url = %self.url, error = %err, "key set fetch failed");
                }
                Err(err)
            }
        }
    }
}

/// Process-scoped key-set cache, keyed by source URL.
///
/// Owned by whoever builds the application state and shared via `Arc`.
pub struct KeySetCache {
    fetcher: Arc<dyn KeySetFetcher>,
    policy: RefreshPolicy,
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
}

impl fmt::Debug for KeySetCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySetCache")
            .field("sources", &self.entries.read().len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl KeySetCache {
    pub fn new(fetcher: Arc<dyn KeySetFetcher>, policy: RefreshPolicy) -> Self {
        Self {
            fetcher,
            policy,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register a source. Idempotent; does not fetch.
    pub fn configure(&self, url: &str) {
        let mut entries = self.entries.write();
        if !entries.contains_key(url) {
            debug!(url = %url, "key set source registered");
            entries.insert(url.to_string(), Arc::new(CacheEntry::new(url)));
        }
    }

    /// Most recent successfully parsed key set for `url`.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let entry = self
            .entries
            .read()
            .get(url)
            .cloned()
            .ok_or_else(|| KeySetError::NotConfigured(url.to_string()))?;

        let pending = {
            let mut state = entry.state.lock();
            let now = Instant::now();

            let cached = state
                .current
                .as_ref()
                .map(|snapshot| (Arc::clone(&snapshot.keys), snapshot.is_stale(now)));

            if let Some((keys, stale)) = cached {
                if stale
                    && state.in_flight().is_none()
                    && state.attempt_allowed(now, self.policy.min_refresh_interval)
                {
                    debug!(url = %url, "key set is stale; refreshing in background");
                    let refresh = self.start_fetch(&entry, &mut state, now);
                    tokio::spawn(refresh);
                }
                return Ok(keys);
            }

            match state.in_flight() {
                Some(pending) => pending,
                None => self.start_fetch(&entry, &mut state, now),
            }
        };

        pending.await
    }

    fn start_fetch(
        &self,
        entry: &Arc<CacheEntry>,
        state: &mut EntryState,
        now: Instant,
    ) -> Shared<FetchFuture> {
        let fetcher = Arc::clone(&self.fetcher);
        let entry = Arc::clone(entry);
        let policy = self.policy;

        let pending = async move {
            let outcome = load(fetcher.as_ref(), &entry.url).await;
            entry.publish(outcome, policy)
        }
        .boxed()
        .shared();

        state.in_flight = pending.downgrade();
        state.last_attempt = Some(now);
        pending
    }
}

async fn load(
    fetcher: &dyn KeySetFetcher,
    url: &str,
) -> Result<(KeySet, Option<Duration>), KeySetError> {
    let document = fetcher.fetch(url).await?;
    let keys =
        KeySet::from_json(&document.body).map_err(|e| KeySetError::parse_failed(url, e))?;
    Ok((keys, document.max_age))
}
