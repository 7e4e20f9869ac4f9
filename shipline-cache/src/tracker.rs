//! Time-boxed shipment lookup cache.
//!
//! Lookups by tracking number and by id are memoized for a short window
//! (30 seconds by default). A stale or missing entry triggers a fetch whose
//! result overwrites the entry. A failed fetch is returned to the caller
//! as is; the cache never falls back to an expired snapshot.
//!
//! Concurrent lookups of the same key are not coalesced. Both miss, both
//! fetch, and the later write wins. The map is never locked across an
//! `.await`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use shipline_core::{Shipment, ShipmentId};

use crate::freshness::{CacheRead, Freshness};
use crate::key::CacheKey;
use crate::traits::{CacheStats, ShipmentFetcher};

/// Default freshness window for cached shipments.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Configuration for the shipment cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries at least this old are refetched.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    shipment: Shipment,
    /// Wall-clock fetch time, reported to callers.
    cached_at: DateTime<Utc>,
    /// Monotonic fetch time; freshness is judged on this alone.
    stored_at: Instant,
}

impl CacheEntry {
    fn new(shipment: Shipment, cached_at: DateTime<Utc>) -> Self {
        Self {
            shipment,
            cached_at,
            stored_at: Instant::now(),
        }
    }
}

/// Shipment lookup cache in front of a [`ShipmentFetcher`].
///
/// Build one per application and share it (`Arc<ShipmentTracker<_>>`);
/// there is no global instance.
pub struct ShipmentTracker<F>
where
    F: ShipmentFetcher,
{
    fetcher: F,
    entries: DashMap<CacheKey, CacheEntry>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<F> ShipmentTracker<F>
where
    F: ShipmentFetcher,
{
    pub fn new(fetcher: F, config: CacheConfig) -> Self {
        Self {
            fetcher,
            entries: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_defaults(fetcher: F) -> Self {
        Self::new(fetcher, CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Look up a shipment by tracking number.
    pub async fn track_by_number(
        &self,
        tracking_number: &str,
        freshness: Freshness,
    ) -> Result<CacheRead<Shipment>, F::Error> {
        let key = CacheKey::tracking(tracking_number);
        if let Some(read) = self.read_fresh(&key, freshness) {
            return Ok(read);
        }

        match self.fetcher.fetch_by_tracking_number(tracking_number).await {
            Ok(shipment) => Ok(self.store(key, shipment)),
            Err(err) => {
                tracing::error!(error = %err, tracking_number, "Failed to track shipment");
                Err(err)
            }
        }
    }

    /// Look up a shipment by id.
    pub async fn get_by_id(
        &self,
        id: ShipmentId,
        freshness: Freshness,
    ) -> Result<CacheRead<Shipment>, F::Error> {
        let key = CacheKey::shipment(id);
        if let Some(read) = self.read_fresh(&key, freshness) {
            return Ok(read);
        }

        match self.fetcher.fetch_by_id(id).await {
            Ok(shipment) => Ok(self.store(key, shipment)),
            Err(err) => {
                tracing::error!(error = %err, shipment_id = %id, "Failed to get shipment details");
                Err(err)
            }
        }
    }

    /// [`track_by_number`](Self::track_by_number) with the cache allowed,
    /// returning just the shipment.
    pub async fn track(&self, tracking_number: &str) -> Result<Shipment, F::Error> {
        self.track_by_number(tracking_number, Freshness::Cached)
            .await
            .map(CacheRead::into_value)
    }

    /// [`get_by_id`](Self::get_by_id) with the cache allowed, returning
    /// just the shipment.
    pub async fn shipment(&self, id: ShipmentId) -> Result<Shipment, F::Error> {
        self.get_by_id(id, Freshness::Cached)
            .await
            .map(CacheRead::into_value)
    }

    /// Drop the entry for one tracking number, or every entry when `None`.
    pub fn invalidate(&self, tracking_number: Option<&str>) {
        match tracking_number {
            Some(number) => {
                self.entries.remove(&CacheKey::tracking(number));
            }
            None => self.entries.clear(),
        }
    }

    /// Drop the entry cached for a shipment id.
    pub fn invalidate_shipment(&self, id: ShipmentId) {
        self.entries.remove(&CacheKey::shipment(id));
    }

    /// Store a snapshot obtained elsewhere (for example the response of a
    /// create call) under both of its keys.
    pub fn prime(&self, shipment: &Shipment) {
        let cached_at = Utc::now();
        for key in [
            CacheKey::tracking(shipment.tracking_number.clone()),
            CacheKey::shipment(shipment.id),
        ] {
            self.entries
                .insert(key, CacheEntry::new(shipment.clone(), cached_at));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.entries.len() as u64,
        }
    }

    fn read_fresh(&self, key: &CacheKey, freshness: Freshness) -> Option<CacheRead<Shipment>> {
        if freshness.allows_cached() {
            if let Some(entry) = self.entries.get(key) {
                let age = entry.stored_at.elapsed();

                if age < self.config.ttl {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(%key, age_ms = age.as_millis() as u64, "shipment cache hit");
                    return Some(CacheRead::from_cache(entry.shipment.clone(), entry.cached_at));
                }
                tracing::debug!(%key, age_ms = age.as_millis() as u64, "shipment cache entry expired");
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%key, ?freshness, "shipment cache miss");
        None
    }

    fn store(&self, key: CacheKey, shipment: Shipment) -> CacheRead<Shipment> {
        let fetched_at = Utc::now();
        self.entries
            .insert(key, CacheEntry::new(shipment.clone(), fetched_at));
        CacheRead::from_fetch(shipment, fetched_at)
    }

    /// Move an entry's fetch time into the past.
    #[cfg(test)]
    fn backdate(&self, key: &CacheKey, by: Duration) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.cached_at -= chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
            if let Some(earlier) = entry.stored_at.checked_sub(by) {
                entry.stored_at = earlier;
            }
        }
    }

    /// Shift only the wall-clock fetch time, as a system clock step would.
    #[cfg(test)]
    fn skew_wall_clock(&self, key: &CacheKey, by: chrono::Duration) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.cached_at += by;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use shipline_core::{ShipmentStatus, User, UserId, UserRole};
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("HTTP 404: shipment {0} not found")]
    struct NotFound(String);

    #[derive(Default)]
    struct MockFetcher {
        shipments: Mutex<HashMap<String, Shipment>>,
        calls: AtomicUsize,
    }

    impl MockFetcher {
        fn with(shipment: Shipment) -> Self {
            let fetcher = Self::default();
            fetcher.put(shipment);
            fetcher
        }

        fn put(&self, shipment: Shipment) {
            self.shipments
                .lock()
                .unwrap()
                .insert(shipment.tracking_number.clone(), shipment);
        }

        fn remove(&self, tracking_number: &str) {
            self.shipments.lock().unwrap().remove(tracking_number);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ShipmentFetcher for MockFetcher {
        type Error = NotFound;

        async fn fetch_by_tracking_number(&self, tracking_number: &str) -> Result<Shipment, NotFound> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.shipments
                .lock()
                .unwrap()
                .get(tracking_number)
                .cloned()
                .ok_or_else(|| NotFound(tracking_number.to_string()))
        }

        async fn fetch_by_id(&self, id: ShipmentId) -> Result<Shipment, NotFound> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.shipments
                .lock()
                .unwrap()
                .values()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| NotFound(id.to_string()))
        }
    }

    fn make_shipment(id: i64, tracking_number: &str, status: ShipmentStatus) -> Shipment {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        Shipment {
            id: ShipmentId(id),
            tracking_number: tracking_number.to_string(),
            sender: User {
                id: UserId(1),
                full_name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
                role: UserRole::Customer,
                created_at: created,
            },
            receiver_name: "Bob".to_string(),
            receiver_email: "bob@example.com".to_string(),
            receiver_phone: None,
            origin_address: "A".to_string(),
            destination_address: "B".to_string(),
            origin_latitude: None,
            origin_longitude: None,
            destination_latitude: None,
            destination_longitude: None,
            status,
            assigned_driver: None,
            created_at: created,
            updated_at: created,
            tracking_updates: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_second_lookup_within_ttl_is_served_from_cache() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::with(make_shipment(
            1,
            "LST123456",
            ShipmentStatus::Created,
        )));

        let first = tracker.track_by_number("LST123456", Freshness::Cached).await.unwrap();
        let second = tracker.track_by_number("LST123456", Freshness::Cached).await.unwrap();

        assert!(first.was_cache_miss());
        assert!(second.was_cache_hit());
        assert_eq!(first.value(), second.value());
        assert_eq!(tracker.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::with(make_shipment(
            1,
            "LST123456",
            ShipmentStatus::Created,
        )));

        tracker.track("LST123456").await.unwrap();
        tracker.backdate(&CacheKey::tracking("LST123456"), DEFAULT_TTL);
        tracker
            .fetcher()
            .put(make_shipment(1, "LST123456", ShipmentStatus::PickedUp));

        let read = tracker.track_by_number("LST123456", Freshness::Cached).await.unwrap();
        assert!(read.was_cache_miss());
        assert_eq!(read.value().status, ShipmentStatus::PickedUp);
        assert_eq!(tracker.fetcher().calls(), 2);
    }

    #[tokio::test]
    async fn test_entry_just_inside_ttl_is_fresh() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::with(make_shipment(
            1,
            "LST123456",
            ShipmentStatus::Created,
        )));

        tracker.track("LST123456").await.unwrap();
        tracker.backdate(&CacheKey::tracking("LST123456"), Duration::from_secs(20));

        let read = tracker.track_by_number("LST123456", Freshness::Cached).await.unwrap();
        assert!(read.was_cache_hit());
        assert_eq!(tracker.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn test_wall_clock_step_does_not_extend_freshness() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::with(make_shipment(
            1,
            "LST123456",
            ShipmentStatus::Created,
        )));
        let key = CacheKey::tracking("LST123456");

        tracker.track("LST123456").await.unwrap();
        tracker.backdate(&key, Duration::from_secs(60));
        // Clock stepped back an hour after the fetch
        tracker.skew_wall_clock(&key, chrono::Duration::hours(1));
        tracker
            .fetcher()
            .put(make_shipment(1, "LST123456", ShipmentStatus::PickedUp));

        let read = tracker.track_by_number("LST123456", Freshness::Cached).await.unwrap();
        assert!(read.was_cache_miss());
        assert_eq!(read.value().status, ShipmentStatus::PickedUp);
        assert_eq!(tracker.fetcher().calls(), 2);
    }

    #[tokio::test]
    async fn test_wall_clock_step_does_not_expire_fresh_entry() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::with(make_shipment(
            1,
            "LST123456",
            ShipmentStatus::Created,
        )));
        let key = CacheKey::tracking("LST123456");

        tracker.track("LST123456").await.unwrap();
        tracker.skew_wall_clock(&key, -chrono::Duration::hours(1));

        let read = tracker.track_by_number("LST123456", Freshness::Cached).await.unwrap();
        assert!(read.was_cache_hit());
        assert_eq!(tracker.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_and_overwrites() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::with(make_shipment(
            1,
            "LST123456",
            ShipmentStatus::Created,
        )));

        tracker.track("LST123456").await.unwrap();
        tracker
            .fetcher()
            .put(make_shipment(1, "LST123456", ShipmentStatus::InTransit));

        let refreshed = tracker.track_by_number("LST123456", Freshness::Refresh).await.unwrap();
        assert!(refreshed.was_cache_miss());
        assert_eq!(refreshed.value().status, ShipmentStatus::InTransit);

        let cached = tracker.track_by_number("LST123456", Freshness::Cached).await.unwrap();
        assert!(cached.was_cache_hit());
        assert_eq!(cached.value().status, ShipmentStatus::InTransit);
        assert_eq!(tracker.fetcher().calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_propagated_without_stale_fallback() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::with(make_shipment(
            1,
            "LST123456",
            ShipmentStatus::Created,
        )));

        tracker.track("LST123456").await.unwrap();
        tracker.backdate(&CacheKey::tracking("LST123456"), Duration::from_secs(60));
        tracker.fetcher().remove("LST123456");

        let err = tracker
            .track_by_number("LST123456", Freshness::Cached)
            .await
            .unwrap_err();
        assert_eq!(err, NotFound("LST123456".to_string()));

        // Still not served after the failure
        let err = tracker.track("LST123456").await.unwrap_err();
        assert_eq!(err, NotFound("LST123456".to_string()));
        assert_eq!(tracker.fetcher().calls(), 3);
    }

    #[tokio::test]
    async fn test_failed_first_lookup_caches_nothing() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::default());
        assert!(tracker.track("LST000000").await.is_err());
        assert!(tracker.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_single_tracking_number() {
        let fetcher = MockFetcher::with(make_shipment(1, "LST123456", ShipmentStatus::Created));
        fetcher.put(make_shipment(2, "LST654321", ShipmentStatus::Created));
        let tracker = ShipmentTracker::with_defaults(fetcher);

        tracker.track("LST123456").await.unwrap();
        tracker.track("LST654321").await.unwrap();
        tracker.invalidate(Some("LST123456"));

        assert!(!tracker.contains(&CacheKey::tracking("LST123456")));
        assert!(tracker.contains(&CacheKey::tracking("LST654321")));

        let read = tracker.track_by_number("LST123456", Freshness::Cached).await.unwrap();
        assert!(read.was_cache_miss());
        assert_eq!(tracker.fetcher().calls(), 3);

        // absent key is a no-op
        tracker.invalidate(Some("NOPE000000"));
        assert_eq!(tracker.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::with(make_shipment(
            1,
            "LST123456",
            ShipmentStatus::Created,
        )));
        tracker.track("LST123456").await.unwrap();
        tracker.shipment(ShipmentId(1)).await.unwrap();
        assert_eq!(tracker.len(), 2);

        tracker.invalidate(None);
        assert!(tracker.is_empty());
        tracker.invalidate(None);
        assert!(tracker.is_empty());
    }

    #[tokio::test]
    async fn test_id_and_tracking_keys_are_independent() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::with(make_shipment(
            5,
            "LST123456",
            ShipmentStatus::Created,
        )));

        tracker.track("LST123456").await.unwrap();
        let by_id = tracker.get_by_id(ShipmentId(5), Freshness::Cached).await.unwrap();
        assert!(by_id.was_cache_miss());

        let again = tracker.get_by_id(ShipmentId(5), Freshness::Cached).await.unwrap();
        assert!(again.was_cache_hit());

        tracker.invalidate(Some("LST123456"));
        assert!(tracker.contains(&CacheKey::shipment(ShipmentId(5))));

        tracker.invalidate_shipment(ShipmentId(5));
        assert!(tracker.is_empty());
    }

    #[tokio::test]
    async fn test_prime_fills_both_keys() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::default());
        let shipment = make_shipment(8, "LST888888", ShipmentStatus::Created);
        tracker.prime(&shipment);

        let by_number = tracker.track("LST888888").await.unwrap();
        let by_id = tracker.shipment(ShipmentId(8)).await.unwrap();
        assert_eq!(by_number, shipment);
        assert_eq!(by_id, shipment);
        assert_eq!(tracker.fetcher().calls(), 0);
    }

    #[tokio::test]
    async fn test_stats_count_hits_and_misses() {
        let tracker = ShipmentTracker::with_defaults(MockFetcher::with(make_shipment(
            1,
            "LST123456",
            ShipmentStatus::Created,
        )));
        tracker.track("LST123456").await.unwrap();
        tracker.track("LST123456").await.unwrap();
        tracker.track("LST123456").await.unwrap();
        tracker
            .track_by_number("LST123456", Freshness::Refresh)
            .await
            .unwrap();

        let stats = tracker.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entry_count, 1);
    }

    #[test]
    fn test_cache_config_builder() {
        let config = CacheConfig::new().with_ttl(Duration::from_secs(5));
        assert_eq!(config.ttl, Duration::from_secs(5));
        assert_eq!(CacheConfig::default().ttl, Duration::from_millis(30_000));
    }
}
