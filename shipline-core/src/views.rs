//! Derived views over shipment snapshots.
//!
//! Everything here is pure: no I/O, no mutation of the input, and no
//! failure mode. Malformed data produces a best-effort answer.

use chrono::{Duration, Utc};

use crate::{Shipment, ShipmentStatus, Timestamp, TrackingUpdate, UserId};

// ============================================================================
// TRACKING SUMMARY
// ============================================================================

/// Status overview of a single shipment, borrowed from the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSummary<'a> {
    pub current_status: ShipmentStatus,
    /// Most recent update by timestamp. Among equal timestamps the one
    /// that came last in the input wins.
    pub last_update: Option<&'a TrackingUpdate>,
    pub total_updates: usize,
    pub is_in_transit: bool,
    pub is_delivered: bool,
    pub is_cancelled: bool,
    pub has_driver: bool,
    /// Updates in ascending timestamp order; equal timestamps keep their
    /// input order.
    pub timeline: Vec<&'a TrackingUpdate>,
}

/// Summarize a shipment's tracking state.
pub fn summarize(shipment: &Shipment) -> TrackingSummary<'_> {
    let mut timeline: Vec<&TrackingUpdate> = shipment.tracking_updates.iter().collect();
    // sort_by_key is stable
    timeline.sort_by_key(|update| update.timestamp);

    TrackingSummary {
        current_status: shipment.status,
        last_update: timeline.last().copied(),
        total_updates: timeline.len(),
        is_in_transit: shipment.status == ShipmentStatus::InTransit,
        is_delivered: shipment.status == ShipmentStatus::Delivered,
        is_cancelled: shipment.status == ShipmentStatus::Cancelled,
        has_driver: shipment.has_driver(),
        timeline,
    }
}

// ============================================================================
// DELIVERY ESTIMATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryEstimate {
    pub estimated: Option<Timestamp>,
    pub is_estimate: bool,
}

impl DeliveryEstimate {
    pub const NONE: DeliveryEstimate = DeliveryEstimate {
        estimated: None,
        is_estimate: false,
    };
}

/// Estimate delivery relative to the current time.
pub fn estimate_delivery(shipment: &Shipment) -> DeliveryEstimate {
    estimate_delivery_at(shipment, Utc::now())
}

/// Estimate delivery relative to `now`.
///
/// Terminal shipments have no estimate. Otherwise the creation date plus
/// the status's transit days, pushed forward to `now + 24h` if that is not
/// strictly in the future.
pub fn estimate_delivery_at(shipment: &Shipment, now: Timestamp) -> DeliveryEstimate {
    let Some(days) = shipment.status.estimated_transit_days() else {
        return DeliveryEstimate::NONE;
    };

    let estimated = shipment.created_at + Duration::days(days);
    let estimated = if estimated > now {
        estimated
    } else {
        now + Duration::hours(24)
    };

    DeliveryEstimate {
        estimated: Some(estimated),
        is_estimate: true,
    }
}

// ============================================================================
// RATINGS AND DRIVERS
// ============================================================================

/// Shipments a customer may be asked to rate: delivered, with a driver,
/// and sent by that customer. Whether each one is still pending is decided
/// by the backend's rating status.
pub fn rating_candidates(shipments: &[Shipment], customer: UserId) -> Vec<&Shipment> {
    shipments
        .iter()
        .filter(|s| s.status == ShipmentStatus::Delivered && s.has_driver() && s.is_sent_by(customer))
        .collect()
}

/// Render a backend `HH:mm:ss` time as `HH:mm`.
pub fn format_work_time(time: Option<&str>) -> String {
    match time {
        Some(value) if !value.is_empty() => value.chars().take(5).collect(),
        _ => "Not set".to_string(),
    }
}
