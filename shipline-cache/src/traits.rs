//! The fetcher seam and cache statistics.

use async_trait::async_trait;
use shipline_core::{Shipment, ShipmentId};
use std::sync::Arc;

/// Source of shipment snapshots consulted on a cache miss.
///
/// The HTTP client implements this against the backend's lookup
/// endpoints. Errors are handed back to the cache's caller untouched.
#[async_trait]
pub trait ShipmentFetcher: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `GET /Shipments/track/{trackingNumber}`
    async fn fetch_by_tracking_number(&self, tracking_number: &str)
        -> Result<Shipment, Self::Error>;

    /// `GET /Shipments/{id}`
    async fn fetch_by_id(&self, id: ShipmentId) -> Result<Shipment, Self::Error>;
}

#[async_trait]
impl<F> ShipmentFetcher for Arc<F>
where
    F: ShipmentFetcher + ?Sized,
{
    type Error = F::Error;

    async fn fetch_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<Shipment, Self::Error> {
        (**self).fetch_by_tracking_number(tracking_number).await
    }

    async fn fetch_by_id(&self, id: ShipmentId) -> Result<Shipment, Self::Error> {
        (**self).fetch_by_id(id).await
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a fresh entry.
    pub hits: u64,
    /// Lookups that went to the fetcher, including forced refreshes.
    pub misses: u64,
    /// Entries currently held, fresh or stale.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
