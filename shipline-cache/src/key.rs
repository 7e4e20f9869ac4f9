//! Cache keys.
//!
//! Lookups by tracking number and by id are cached independently, so the
//! same shipment can sit under two keys.

use shipline_core::ShipmentId;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `track_<trackingNumber>`
    Tracking(String),
    /// `shipment_<id>`
    Shipment(ShipmentId),
}

impl CacheKey {
    pub fn tracking(tracking_number: impl Into<String>) -> Self {
        Self::Tracking(tracking_number.into())
    }

    pub fn shipment(id: ShipmentId) -> Self {
        Self::Shipment(id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Tracking(number) => write!(f, "track_{}", number),
            CacheKey::Shipment(id) => write!(f, "shipment_{}", id),
        }
    }
}
