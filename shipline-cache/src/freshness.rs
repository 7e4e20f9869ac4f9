//! Freshness contracts for cache reads.
//!
//! Callers state whether a cached snapshot is acceptable, and every read
//! reports whether it was served from the cache.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// How a lookup may use the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Serve a cached snapshot if it is younger than the cache TTL,
    /// otherwise fetch and store.
    #[default]
    Cached,

    /// Skip the cache read and always fetch. The result still overwrites
    /// the cached entry.
    Refresh,
}

impl Freshness {
    /// Map a boolean `use_cache` flag onto a freshness policy.
    pub fn from_use_cache(use_cache: bool) -> Self {
        if use_cache {
            Self::Cached
        } else {
            Self::Refresh
        }
    }

    pub fn allows_cached(&self) -> bool {
        matches!(self, Self::Cached)
    }
}

/// Result of a cache lookup, carrying when the snapshot was fetched.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    cached_at: DateTime<Utc>,
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// A read served from an existing entry.
    pub fn from_cache(value: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at,
            was_cache_hit: true,
        }
    }

    /// A read that went to the backend.
    pub fn from_fetch(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at: fetched_at,
            was_cache_hit: false,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// When the snapshot was fetched from the backend.
    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    /// Time since the snapshot was fetched.
    pub fn staleness(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }

    pub fn map<U, F>(self, f: F) -> CacheRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheRead {
            value: f(self.value),
            cached_at: self.cached_at,
            was_cache_hit: self.was_cache_hit,
        }
    }
}

impl<T> AsRef<T> for CacheRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}
