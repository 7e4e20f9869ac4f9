//! Shipline Cache - Shipment Lookup Cache
//!
//! Memoizes shipment lookups by tracking number and by id for a short
//! window, so that views re-rendering the same shipment do not hit the
//! backend on every render. Fetching is delegated to a [`ShipmentFetcher`].

pub mod freshness;
pub mod key;
pub mod traits;
pub mod tracker;

pub use freshness::{CacheRead, Freshness};
pub use key::CacheKey;
pub use traits::{CacheStats, ShipmentFetcher};
pub use tracker::{CacheConfig, ShipmentTracker, DEFAULT_TTL};

// Pure helpers that sit next to the cache in the tracking surface
pub use shipline_core::{
    estimate_delivery, format_tracking_number, is_valid_tracking_number, summarize,
    DeliveryEstimate, TrackingSummary,
};
