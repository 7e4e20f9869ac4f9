//! Core entity structures
//!
//! These mirror the JSON documents returned by the logistics backend. The
//! client never creates or mutates them locally except for snapshots held
//! by the shipment cache.

use crate::{
    AuditLogId, DriverStatus, ReportId, ReportType, ShipmentId, ShipmentStatus, Timestamp,
    TrackingUpdateId, UserId, UserRole,
};
use crate::identity::wire_timestamp;
use serde::{Deserialize, Serialize};

/// Registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(with = "wire_timestamp")]
    pub created_at: Timestamp,
}

/// One historical status change of a shipment. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdate {
    pub id: TrackingUpdateId,
    pub status: ShipmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub updated_by: User,
    #[serde(with = "wire_timestamp")]
    pub timestamp: Timestamp,
}

/// A shipment as seen by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: ShipmentId,
    pub tracking_number: String,
    pub sender: User,
    pub receiver_name: String,
    pub receiver_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_phone: Option<String>,
    pub origin_address: String,
    pub destination_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_longitude: Option<f64>,
    pub status: ShipmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_driver: Option<User>,
    #[serde(with = "wire_timestamp")]
    pub created_at: Timestamp,
    #[serde(with = "wire_timestamp")]
    pub updated_at: Timestamp,
    /// Absent on the wire means no updates yet.
    #[serde(default)]
    pub tracking_updates: Vec<TrackingUpdate>,
}

impl Shipment {
    pub fn has_driver(&self) -> bool {
        self.assigned_driver.is_some()
    }

    pub fn is_sent_by(&self, user_id: UserId) -> bool {
        self.sender.id == user_id
    }
}

/// Body of the login and register responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
}

// ============================================================================
// DRIVERS
// ============================================================================

/// Driver profile details maintained by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DriverDetails {
    pub status: DriverStatus,
    pub vehicle_type: Option<String>,
    pub license_number: Option<String>,
    pub current_address: Option<String>,
    pub current_latitude: Option<f64>,
    pub current_longitude: Option<f64>,
    /// `HH:mm:ss` as sent by the backend.
    pub work_start_time: Option<String>,
    pub work_end_time: Option<String>,
    pub max_active_shipments: Option<u32>,
    pub preferred_region: Option<String>,
    pub is_verified: bool,
}

/// Availability snapshot of one driver. All scores and flags are computed
/// by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverAvailability {
    pub driver: User,
    #[serde(default)]
    pub driver_details: DriverDetails,
    pub is_available: bool,
    #[serde(default)]
    pub active_shipments: u32,
    #[serde(default)]
    pub completed_shipments: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub total_ratings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_category: Option<String>,
    #[serde(default)]
    pub performance_factors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_reason: Option<String>,
}

impl DriverAvailability {
    /// Capacity shown next to the active count; the backend default is 5.
    pub fn capacity(&self) -> u32 {
        self.driver_details.max_active_shipments.unwrap_or(5)
    }

    pub fn has_ratings(&self) -> bool {
        self.rating > 0.0
    }
}

// ============================================================================
// RATINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRating {
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(with = "wire_timestamp")]
    pub rated_at: Timestamp,
    pub rated_by_customer: String,
    pub shipment_tracking_number: String,
}

/// Aggregated ratings of one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRatingsSummary {
    pub driver: User,
    pub average_rating: f64,
    pub total_ratings: u32,
    #[serde(default)]
    pub completed_shipments: u32,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub recent_ratings: Vec<DriverRating>,
}

/// Whether a delivered shipment has been, or may be, rated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRatingStatus {
    pub shipment_id: String,
    pub tracking_number: String,
    pub is_rated: bool,
    pub can_be_rated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_rating: Option<DriverRating>,
}

impl ShipmentRatingStatus {
    /// Status assumed when the backend could not be asked.
    pub fn assume_unrated(shipment_id: impl Into<String>, tracking_number: impl Into<String>) -> Self {
        Self {
            shipment_id: shipment_id.into(),
            tracking_number: tracking_number.into(),
            is_rated: false,
            can_be_rated: true,
            existing_rating: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.is_rated && self.can_be_rated
    }
}

// ============================================================================
// REPORTS AND ANALYTICS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: ShipmentStatus,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStat {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    pub total_shipments: u64,
    pub active_shipments: u64,
    pub delivered_shipments: u64,
    pub pending_shipments: u64,
    pub total_drivers: u64,
    pub total_customers: u64,
    #[serde(default)]
    pub shipments_by_status: Vec<StatusCount>,
    #[serde(default)]
    pub monthly_stats: Vec<MonthlyStat>,
}

impl DashboardAnalytics {
    pub fn count_for(&self, status: ShipmentStatus) -> u64 {
        self.shipments_by_status
            .iter()
            .find(|entry| entry.status == status)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub report_type: ReportType,
    #[serde(with = "wire_timestamp")]
    pub start_date: Timestamp,
    #[serde(with = "wire_timestamp")]
    pub end_date: Timestamp,
    pub file_path: String,
    #[serde(with = "wire_timestamp")]
    pub generated_at: Timestamp,
    pub generated_by: User,
}

// ============================================================================
// AUDIT LOGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: AuditLogId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub action: String,
    pub target_table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(with = "wire_timestamp")]
    pub timestamp: Timestamp,
}

/// One page of audit log results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPage {
    #[serde(default)]
    pub items: Vec<AuditLog>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl AuditLogPage {
    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages
    }
}
