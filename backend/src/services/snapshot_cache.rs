//! Time-boxed snapshot cache with background refresh.
//!
//! One entry per normalized [`FlightQuery`]. Readers get an `Arc` to a complete
//! snapshot; a refresh builds a new snapshot off to the side and swaps it in.
//! When the upstream fetch fails or times out the previous snapshot is served
//! with `stale` set.
//!
//! Entries are ordered by the time their fetch started: a refresh that started
//! earlier never replaces one that started later. The map holds at most
//! `max_entries` queries; past that the least recently fetched entry that no
//! refresh loop is pinning is evicted.

use chrono::{DateTime, Utc};
use futures::stream::Stream;
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::dashboard::{build_dashboard, prepare_flights, DashboardParams};
use crate::routes::dashboard::DashboardSnapshot;
use crate::sources::{ErrorContext, FlightQuery, FlightSource, SourceError, SourceResult};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Default bound on the number of cached queries.
pub const DEFAULT_MAX_ENTRIES: usize = 64;

/// Cache timings and size bound.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Age after which an entry is refetched on read.
    pub ttl: Duration,
    /// Upper bound on one upstream fetch.
    pub fetch_timeout: Duration,
    /// Queries kept at once, pinned queries included.
    pub max_entries: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(180),
            fetch_timeout: Duration::from_secs(10),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedEntry {
    snapshot: Arc<DashboardSnapshot>,
    fetched_at: DateTime<Utc>,
}

pub type SnapshotReceiver = watch::Receiver<Option<Arc<DashboardSnapshot>>>;

pub struct SnapshotCache {
    source: Arc<dyn FlightSource>,
    clock: Arc<dyn Clock>,
    params: DashboardParams,
    policy: CachePolicy,
    entries: RwLock<HashMap<FlightQuery, CachedEntry>>,
    /// Queries kept warm by a refresh loop; never evicted.
    pinned: RwLock<HashSet<FlightQuery>>,
    updates: watch::Sender<Option<Arc<DashboardSnapshot>>>,
}

impl SnapshotCache {
    pub fn new(
        source: Arc<dyn FlightSource>,
        clock: Arc<dyn Clock>,
        params: DashboardParams,
        policy: CachePolicy,
    ) -> Self {
        let (updates, _) = watch::channel(None);
        Self {
            source,
            clock,
            params,
            policy,
            entries: RwLock::new(HashMap::new()),
            pinned: RwLock::new(HashSet::new()),
            updates,
        }
    }

    pub fn params(&self) -> &DashboardParams {
        &self.params
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Number of cached queries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Cached snapshot for `query` regardless of age.
    pub fn cached(&self, query: &FlightQuery) -> Option<Arc<DashboardSnapshot>> {
        self.entries
            .read()
            .get(&query.normalized())
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    fn is_fresh(&self, entry: &CachedEntry, now: DateTime<Utc>) -> bool {
        let age = now - entry.fetched_at;
        chrono::Duration::from_std(self.policy.ttl)
            .map(|ttl| age < ttl)
            .unwrap_or(true)
    }

    /// Snapshot for `query`, refreshing first when the entry is missing or expired.
    pub async fn get(&self, query: &FlightQuery) -> SourceResult<Arc<DashboardSnapshot>> {
        let query = query.normalized();
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(&query) {
                if self.is_fresh(entry, now) {
                    return Ok(Arc::clone(&entry.snapshot));
                }
            }
        }
        self.refresh(&query).await
    }

    /// Fetch and rebuild the snapshot for `query` unconditionally.
    pub async fn refresh(&self, query: &FlightQuery) -> SourceResult<Arc<DashboardSnapshot>> {
        let query = query.normalized();
        let now = self.clock.now();

        let fetched = match tokio::time::timeout(
            self.policy.fetch_timeout,
            self.source.fetch_flights(&query),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SourceError::timeout(
                self.policy.fetch_timeout.as_secs(),
                ErrorContext::new("fetch_flights").with_source(self.source.name()),
            )),
        };

        match fetched {
            Ok(raw) => Ok(self.store(&query, &raw, now)),
            Err(err) => self.fall_back(&query, err, now),
        }
    }

    fn store(
        &self,
        query: &FlightQuery,
        raw: &[serde_json::Value],
        now: DateTime<Utc>,
    ) -> Arc<DashboardSnapshot> {
        let flights = prepare_flights(raw, query, now, &self.params);
        let mut snapshot = build_dashboard(&flights, query, now, &self.params);

        let snapshot = {
            let mut entries = self.entries.write();
            match entries.get(query) {
                Some(previous) if previous.fetched_at > now => {
                    debug!(
                        "Discarding snapshot for {:?} fetched at {}; {} is newer",
                        query, now, previous.fetched_at
                    );
                    return Arc::clone(&previous.snapshot);
                }
                Some(previous) if previous.snapshot.fingerprint == snapshot.fingerprint => {
                    snapshot.snapshot_id = previous.snapshot.snapshot_id;
                }
                Some(_) => {}
                None => self.make_room(&mut entries),
            }
            let snapshot = Arc::new(snapshot);
            entries.insert(
                query.clone(),
                CachedEntry {
                    snapshot: Arc::clone(&snapshot),
                    fetched_at: now,
                },
            );
            snapshot
        };

        debug!(
            "Stored snapshot {} for {:?} ({} flights)",
            snapshot.snapshot_id, query, snapshot.flight_count
        );
        self.updates.send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// Evict unpinned entries, least recently fetched first, until one more fits.
    fn make_room(&self, entries: &mut HashMap<FlightQuery, CachedEntry>) {
        let pinned = self.pinned.read();
        while entries.len() >= self.policy.max_entries {
            let oldest = entries
                .iter()
                .filter(|(key, _)| !pinned.contains(*key))
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(key, _)| key.clone());
            let Some(key) = oldest else {
                break;
            };
            debug!("Evicting cached snapshot for {:?}", key);
            entries.remove(&key);
        }
    }

    fn fall_back(
        &self,
        query: &FlightQuery,
        err: SourceError,
        started_at: DateTime<Utc>,
    ) -> SourceResult<Arc<DashboardSnapshot>> {
        let mut entries = self.entries.write();
        let Some(entry) = entries.get_mut(query) else {
            warn!("Fetch from {} failed with nothing cached: {}", self.source.name(), err);
            return Err(err);
        };

        // A later refresh already succeeded; its snapshot is not stale
        if entry.fetched_at > started_at {
            debug!("Fetch from {} failed after a newer refresh: {}", self.source.name(), err);
            return Ok(Arc::clone(&entry.snapshot));
        }

        warn!(
            "Fetch from {} failed, serving snapshot {} as stale: {}",
            self.source.name(),
            entry.snapshot.snapshot_id,
            err
        );
        if !entry.snapshot.stale {
            let mut stale = (*entry.snapshot).clone();
            stale.stale = true;
            entry.snapshot = Arc::new(stale);
            self.updates.send_replace(Some(Arc::clone(&entry.snapshot)));
        }
        Ok(Arc::clone(&entry.snapshot))
    }

    /// Receiver of every snapshot stored by this cache.
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.updates.subscribe()
    }

    /// Snapshots of one query: the cached one first, then each replacement.
    ///
    /// Stores for other queries wake the stream but yield nothing. Every wake
    /// re-reads the entry, so updates coalesced by the channel are not lost.
    pub fn watch_query(
        self: &Arc<Self>,
        query: &FlightQuery,
    ) -> impl Stream<Item = Arc<DashboardSnapshot>> + Send + 'static {
        let cache = Arc::clone(self);
        let query = query.normalized();
        let mut updates = self.subscribe();
        async_stream::stream! {
            let mut last: Option<Arc<DashboardSnapshot>> = None;
            loop {
                if let Some(current) = cache.cached(&query) {
                    let seen = last.as_ref().is_some_and(|prev| Arc::ptr_eq(prev, &current));
                    if !seen {
                        last = Some(Arc::clone(&current));
                        yield current;
                    }
                }
                if updates.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    /// Re-run the pipeline for `query` every `period` until the task is aborted.
    ///
    /// The query is pinned: its entry survives eviction.
    pub fn spawn_refresh_loop(self: &Arc<Self>, query: FlightQuery, period: Duration) -> JoinHandle<()> {
        let query = query.normalized();
        self.pinned.write().insert(query.clone());
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            info!("Starting refresh loop every {:?} for {:?}", period, query);
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(err) = cache.refresh(&query).await {
                    warn!("Background refresh failed: {}", err);
                }
            }
        })
    }
}
