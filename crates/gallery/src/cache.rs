//! Per-filter page cache.
//!
//! [`GalleryCache`] accumulates fetched pages into buckets keyed by
//! [`QueryKey`]. Each bucket grows one page at a time in increasing page
//! order, with at most one fetch in flight. A response that lands after the
//! caller switched to another filter only ever touches its own bucket, so it
//! can never leak into the list being displayed.
//!
//! Page arrivals and failures are broadcast as [`CacheEvent`]s. Call
//! [`GalleryCache::subscribe`] to receive them.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use vizfolio_core::lightbox::NavContext;
use vizfolio_store::models::gallery_item::{GalleryFilter, GalleryItem};

use crate::error::GalleryError;
use crate::fetcher::{CategoryNames, Page, PageFetcher};

/// Broadcast channel capacity for cache events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Keys, outcomes, events
// ---------------------------------------------------------------------------

/// Identity of one accumulated page sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub filter: GalleryFilter,
    pub page_size: u32,
    pub category_names: CategoryNames,
}

impl QueryKey {
    pub fn new(filter: GalleryFilter, page_size: u32, category_names: CategoryNames) -> Self {
        Self {
            filter,
            page_size,
            category_names,
        }
    }

    /// Key of the server-rendered first page: unrestricted "All" before any
    /// category metadata is known.
    pub fn initial(page_size: u32) -> Self {
        Self::new(GalleryFilter::all(), page_size, CategoryNames::new())
    }

    /// Whether a server-provided first page may be seeded under this key.
    pub fn accepts_seed(&self) -> bool {
        self.filter.is_unrestricted_all() && self.category_names.is_empty()
    }
}

/// Result of a fetch request against the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and appended.
    Fetched { page_index: u32, item_count: usize },
    /// The bucket was fresh; nothing was requested.
    Cached,
    /// Another fetch for the same key is still pending.
    AlreadyInFlight,
    /// The last loaded page reported no successor.
    NoMorePages,
}

/// Notification published after every fetch that ends.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    PageLoaded {
        key: QueryKey,
        page_index: u32,
        loaded_count: usize,
        total_count: u64,
        has_next_page: bool,
    },
    FetchFailed {
        key: QueryKey,
        page_index: u32,
        error: String,
    },
    /// The fetching caller went away before the page arrived. The key is
    /// free again; nothing was stored.
    FetchAbandoned { key: QueryKey, page_index: u32 },
}

impl CacheEvent {
    pub fn key(&self) -> &QueryKey {
        match self {
            CacheEvent::PageLoaded { key, .. }
            | CacheEvent::FetchFailed { key, .. }
            | CacheEvent::FetchAbandoned { key, .. } => key,
        }
    }
}

/// Read view of one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuerySnapshot {
    /// Items of every loaded page, in fetch order.
    pub items: Vec<GalleryItem>,
    pub page_count: usize,
    /// Total reported by the most recent page.
    pub total_count: u64,
    pub has_next_page: bool,
    /// First page pending, nothing loaded yet.
    pub is_loading: bool,
    /// A further page pending on top of loaded ones.
    pub is_fetching_next_page: bool,
    /// Message of the last failed fetch, cleared by the next success.
    pub error: Option<String>,
}

impl QuerySnapshot {
    pub fn nav_context(&self) -> NavContext {
        NavContext {
            loaded_count: self.items.len(),
            total_count: usize::try_from(self.total_count).unwrap_or(usize::MAX),
            has_next_page: self.has_next_page,
        }
    }
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Bucket {
    pages: Vec<Page>,
    /// When page 0 landed.
    loaded_at: Option<Instant>,
    last_error: Option<String>,
}

impl Bucket {
    fn is_fresh(&self, now: Instant, fresh_for: Duration) -> bool {
        self.loaded_at
            .is_some_and(|at| now.saturating_duration_since(at) < fresh_for)
    }

    fn next_page_index(&self) -> Option<u32> {
        match self.pages.last() {
            Some(page) => page.next_page,
            None => Some(0),
        }
    }

    fn reset(&mut self) {
        self.pages.clear();
        self.loaded_at = None;
        self.last_error = None;
    }

    fn snapshot(&self, in_flight: bool) -> QuerySnapshot {
        let last = self.pages.last();
        QuerySnapshot {
            items: self
                .pages
                .iter()
                .flat_map(|p| p.items.iter().cloned())
                .collect(),
            page_count: self.pages.len(),
            total_count: last.map_or(0, |p| p.total_count),
            has_next_page: last.is_some_and(Page::has_next_page),
            is_loading: in_flight && self.pages.is_empty(),
            is_fetching_next_page: in_flight && !self.pages.is_empty(),
            error: self.last_error.clone(),
        }
    }

    fn loaded_count(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }
}

enum FetchMode {
    /// Make sure the bucket holds a fresh first page.
    First,
    /// Append the page after the last loaded one.
    Next,
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Page cache shared by the grid and the lightbox.
///
/// Created once per session (or once per process on the server) and shared
/// behind an `Arc`. Buckets that went stale are evicted whenever a fetch
/// starts for another key.
pub struct GalleryCache {
    fetcher: PageFetcher,
    buckets: RwLock<HashMap<QueryKey, Bucket>>,
    /// Keys with a fetch pending, and the page requested. Always locked
    /// after `buckets` and never held across an await.
    in_flight: Mutex<HashMap<QueryKey, u32>>,
    fresh_for: Duration,
    event_tx: broadcast::Sender<CacheEvent>,
    /// Cancelled by [`GalleryCache::shutdown`].
    cancel: CancellationToken,
}

impl GalleryCache {
    pub fn new(fetcher: PageFetcher, fresh_for: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            fetcher,
            buckets: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            fresh_for,
            event_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to page arrivals and failures.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.event_tx.subscribe()
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Install a server-provided first page so the first render needs no
    /// round trip.
    ///
    /// Accepted only for the [`QueryKey::initial`] shape, only for page 0,
    /// and only while the bucket is still empty. Returns whether the page
    /// was installed.
    pub async fn seed_initial(&self, key: &QueryKey, page: Page) -> bool {
        if !key.accepts_seed() || page.page_index != 0 {
            return false;
        }

        let mut buckets = self.buckets.write().await;
        if self.lock_in_flight().contains_key(key) {
            return false;
        }
        let bucket = buckets.entry(key.clone()).or_default();
        if !bucket.pages.is_empty() {
            return false;
        }

        tracing::debug!(items = page.items.len(), "Seeded initial gallery page");
        bucket.pages.push(page);
        bucket.loaded_at = Some(Instant::now());
        true
    }

    /// Make sure `key` has a fresh first page.
    ///
    /// A bucket revisited within the freshness window is reused as is. A
    /// stale bucket is dropped and refetched from page 0.
    pub async fn ensure_first_page(&self, key: &QueryKey) -> Result<FetchOutcome, GalleryError> {
        self.fetch(key, FetchMode::First).await
    }

    /// Fetch and append the page after the last loaded one.
    ///
    /// A no-op ([`FetchOutcome::AlreadyInFlight`]) while another fetch for
    /// the same key is pending.
    pub async fn fetch_next_page(&self, key: &QueryKey) -> Result<FetchOutcome, GalleryError> {
        self.fetch(key, FetchMode::Next).await
    }

    /// Load until at least `pages` pages are present or the archive ends,
    /// waiting out fetches started by other callers.
    pub async fn load_pages(
        &self,
        key: &QueryKey,
        pages: usize,
    ) -> Result<QuerySnapshot, GalleryError> {
        let mut events = self.subscribe();

        let mut outcome = self.ensure_first_page(key).await?;
        loop {
            if outcome == FetchOutcome::AlreadyInFlight {
                self.wait_for_key(&mut events, key).await?;
            }

            let snapshot = self.snapshot(key).await;
            let done = !snapshot.is_loading
                && !snapshot.is_fetching_next_page
                && (snapshot.page_count >= pages.max(1) || !snapshot.has_next_page);
            if done || outcome == FetchOutcome::NoMorePages {
                return Ok(snapshot);
            }

            outcome = if snapshot.page_count == 0 {
                self.ensure_first_page(key).await?
            } else {
                self.fetch_next_page(key).await?
            };
        }
    }

    /// Current contents and flags of `key`'s bucket.
    pub async fn snapshot(&self, key: &QueryKey) -> QuerySnapshot {
        let buckets = self.buckets.read().await;
        let in_flight = self.lock_in_flight().contains_key(key);
        match buckets.get(key) {
            Some(bucket) => bucket.snapshot(in_flight),
            None => QuerySnapshot {
                is_loading: in_flight,
                ..QuerySnapshot::default()
            },
        }
    }

    /// Navigation facts for the lightbox, without cloning the items.
    pub async fn nav_context(&self, key: &QueryKey) -> NavContext {
        let buckets = self.buckets.read().await;
        match buckets.get(key) {
            Some(bucket) => {
                let last = bucket.pages.last();
                NavContext {
                    loaded_count: bucket.loaded_count(),
                    total_count: last
                        .map_or(0, |p| usize::try_from(p.total_count).unwrap_or(usize::MAX)),
                    has_next_page: last.is_some_and(Page::has_next_page),
                }
            }
            None => NavContext {
                loaded_count: 0,
                total_count: 0,
                has_next_page: false,
            },
        }
    }

    /// Item at `index` of `key`'s flattened loaded sequence.
    pub async fn item_at(&self, key: &QueryKey, index: usize) -> Option<GalleryItem> {
        let buckets = self.buckets.read().await;
        buckets
            .get(key)?
            .pages
            .iter()
            .flat_map(|p| p.items.iter())
            .nth(index)
            .cloned()
    }

    /// A single loaded page of `key`.
    pub async fn page(&self, key: &QueryKey, page_index: u32) -> Option<Page> {
        let buckets = self.buckets.read().await;
        buckets
            .get(key)?
            .pages
            .iter()
            .find(|p| p.page_index == page_index)
            .cloned()
    }

    /// Number of buckets held, including ones nobody reads any more.
    pub async fn bucket_count(&self) -> usize {
        self.buckets.read().await.len()
    }

    /// Cancel in-flight fetches and refuse new ones. Pending results are
    /// discarded.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down gallery cache");
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    // ---- private helpers ----

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<QueryKey, u32>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide which page to request and mark it in flight, under one lock.
    async fn begin<'a>(
        &'a self,
        key: &'a QueryKey,
        mode: FetchMode,
    ) -> Result<InFlight<'a>, FetchOutcome> {
        let mut buckets = self.buckets.write().await;
        let mut in_flight = self.lock_in_flight();

        if in_flight.contains_key(key) {
            return Err(FetchOutcome::AlreadyInFlight);
        }

        let now = Instant::now();
        let before = buckets.len();
        buckets.retain(|k, b| {
            k == key || in_flight.contains_key(k) || b.is_fresh(now, self.fresh_for)
        });
        if buckets.len() < before {
            tracing::debug!(evicted = before - buckets.len(), "Evicted stale gallery buckets");
        }

        let bucket = buckets.entry(key.clone()).or_default();

        let page_index = match mode {
            FetchMode::First => {
                if !bucket.pages.is_empty() {
                    if bucket.is_fresh(now, self.fresh_for) {
                        return Err(FetchOutcome::Cached);
                    }
                    tracing::debug!(filter = ?key.filter, "Gallery bucket is stale, refetching");
                    bucket.reset();
                }
                0
            }
            FetchMode::Next => match bucket.next_page_index() {
                Some(index) => index,
                None => return Err(FetchOutcome::NoMorePages),
            },
        };

        in_flight.insert(key.clone(), page_index);
        Ok(InFlight {
            cache: self,
            key,
            page_index,
            settled: false,
        })
    }

    async fn fetch(&self, key: &QueryKey, mode: FetchMode) -> Result<FetchOutcome, GalleryError> {
        if self.cancel.is_cancelled() {
            return Err(GalleryError::ShutDown);
        }

        let flight = match self.begin(key, mode).await {
            Ok(flight) => flight,
            Err(outcome) => return Ok(outcome),
        };
        let page_index = flight.page_index;

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(GalleryError::ShutDown),
            result = self.fetcher.fetch_page(
                page_index,
                &key.filter,
                key.page_size,
                &key.category_names,
            ) => result,
        };

        let mut buckets = self.buckets.write().await;
        flight.settle();
        let bucket = buckets.entry(key.clone()).or_default();

        match result {
            Ok(page) => {
                let item_count = page.items.len();
                let expected = bucket.next_page_index();
                if expected != Some(page_index) {
                    // The bucket moved on while this page was in flight.
                    tracing::warn!(page_index, ?expected, "Dropping out-of-order gallery page");
                    return Ok(FetchOutcome::Cached);
                }

                if page_index == 0 {
                    bucket.loaded_at = Some(Instant::now());
                }
                bucket.last_error = None;
                bucket.pages.push(page);

                let event = CacheEvent::PageLoaded {
                    key: key.clone(),
                    page_index,
                    loaded_count: bucket.loaded_count(),
                    total_count: bucket.pages.last().map_or(0, |p| p.total_count),
                    has_next_page: bucket.pages.last().is_some_and(Page::has_next_page),
                };
                drop(buckets);
                let _ = self.event_tx.send(event);

                Ok(FetchOutcome::Fetched {
                    page_index,
                    item_count,
                })
            }
            Err(GalleryError::ShutDown) => Err(GalleryError::ShutDown),
            Err(e) => {
                tracing::warn!(page_index, error = %e, "Gallery page fetch failed");
                bucket.last_error = Some(e.to_string());
                drop(buckets);
                let _ = self.event_tx.send(CacheEvent::FetchFailed {
                    key: key.clone(),
                    page_index,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Wait until an event for `key` arrives.
    async fn wait_for_key(
        &self,
        events: &mut broadcast::Receiver<CacheEvent>,
        key: &QueryKey,
    ) -> Result<(), GalleryError> {
        loop {
            let received = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(GalleryError::ShutDown),
                received = events.recv() => received,
            };
            match received {
                Ok(event) if event.key() == key => return Ok(()),
                Ok(_) => continue,
                // Missed events: re-check the bucket.
                Err(broadcast::error::RecvError::Lagged(_)) => return Ok(()),
                Err(broadcast::error::RecvError::Closed) => return Err(GalleryError::ShutDown),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// In-flight guard
// ---------------------------------------------------------------------------

/// Marks one key as fetching. Dropping it unsettled, e.g. when the fetching
/// future is cancelled by a timeout or a disconnected client, frees the key
/// and wakes waiters with [`CacheEvent::FetchAbandoned`].
struct InFlight<'a> {
    cache: &'a GalleryCache,
    key: &'a QueryKey,
    page_index: u32,
    settled: bool,
}

impl InFlight<'_> {
    /// Free the key once the result is being merged.
    fn settle(mut self) {
        self.cache.lock_in_flight().remove(self.key);
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.cache.lock_in_flight().remove(self.key);
        tracing::debug!(page_index = self.page_index, "Gallery page fetch abandoned");
        let _ = self.cache.event_tx.send(CacheEvent::FetchAbandoned {
            key: self.key.clone(),
            page_index: self.page_index,
        });
    }
}
