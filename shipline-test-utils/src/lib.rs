//! Shipline Test Utilities
//!
//! Shared test infrastructure for the Shipline workspace:
//! - Proptest generators for shipments and tracking numbers
//! - A counting in-memory fetcher for cache tests
//! - Fixtures for common scenarios

pub use shipline_cache::{CacheRead, Freshness, ShipmentFetcher, ShipmentTracker};
pub use shipline_core::{
    Shipment, ShipmentId, ShipmentStatus, Timestamp, TrackingUpdate, TrackingUpdateId, User,
    UserId, UserRole,
};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// COUNTING FETCHER
// ============================================================================

/// Error returned by [`CountingFetcher`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Shipment not found: {0}")]
    NotFound(String),

    #[error("Backend unavailable")]
    Unavailable,
}

/// In-memory fetcher that records how often each lookup hits it.
///
/// Snapshots can be replaced between calls to observe whether the cache
/// served the old one, and the fetcher can be switched to fail.
#[derive(Debug, Default)]
pub struct CountingFetcher {
    shipments: Mutex<HashMap<String, Shipment>>,
    by_number_calls: AtomicUsize,
    by_id_calls: AtomicUsize,
    failing: AtomicBool,
    latency: Option<Duration>,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shipments(shipments: impl IntoIterator<Item = Shipment>) -> Self {
        let fetcher = Self::new();
        for shipment in shipments {
            fetcher.put(shipment);
        }
        fetcher
    }

    /// Sleep this long inside every fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Insert or replace the snapshot served for its tracking number.
    pub fn put(&self, shipment: Shipment) {
        self.lock().insert(shipment.tracking_number.clone(), shipment);
    }

    pub fn remove(&self, tracking_number: &str) {
        self.lock().remove(tracking_number);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn by_number_calls(&self) -> usize {
        self.by_number_calls.load(Ordering::SeqCst)
    }

    pub fn by_id_calls(&self) -> usize {
        self.by_id_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.by_number_calls() + self.by_id_calls()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Shipment>> {
        self.shipments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn pause(&self) -> Result<(), FetchError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl ShipmentFetcher for CountingFetcher {
    type Error = FetchError;

    async fn fetch_by_tracking_number(&self, tracking_number: &str) -> Result<Shipment, FetchError> {
        self.by_number_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await?;
        self.lock()
            .get(tracking_number)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(tracking_number.to_string()))
    }

    async fn fetch_by_id(&self, id: ShipmentId) -> Result<Shipment, FetchError> {
        self.by_id_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await?;
        self.lock()
            .values()
            .find(|shipment| shipment.id == id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.to_string()))
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Shipline entity types.

    use super::*;
    use proptest::prelude::*;

    /// Timestamps between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64)
            .prop_map(|secs| chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now))
    }

    /// Tracking numbers matching the canonical pattern.
    pub fn arb_tracking_number() -> impl Strategy<Value = String> {
        "[A-Z]{2,4}[0-9]{6,8}"
    }

    pub fn arb_shipment_status() -> impl Strategy<Value = ShipmentStatus> {
        prop_oneof![
            Just(ShipmentStatus::Created),
            Just(ShipmentStatus::PickedUp),
            Just(ShipmentStatus::InTransit),
            Just(ShipmentStatus::Delivered),
            Just(ShipmentStatus::Cancelled),
        ]
    }

    pub fn arb_user_role() -> impl Strategy<Value = UserRole> {
        prop_oneof![
            Just(UserRole::Admin),
            Just(UserRole::Driver),
            Just(UserRole::Customer),
        ]
    }

    pub fn arb_user() -> impl Strategy<Value = User> {
        (1i64..10_000, "[A-Z][a-z]{2,10}", arb_user_role(), arb_timestamp()).prop_map(
            |(id, name, role, created_at)| User {
                id: UserId(id),
                email: format!("{}@example.com", name.to_lowercase()),
                full_name: name,
                phone: None,
                role,
                created_at,
            },
        )
    }

    pub fn arb_tracking_update() -> impl Strategy<Value = TrackingUpdate> {
        (
            1i64..100_000,
            arb_shipment_status(),
            prop::option::of("[A-Za-z ]{3,20}"),
            arb_user(),
            arb_timestamp(),
        )
            .prop_map(|(id, status, location, updated_by, timestamp)| TrackingUpdate {
                id: TrackingUpdateId(id),
                status,
                location,
                latitude: None,
                longitude: None,
                remarks: None,
                updated_by,
                timestamp,
            })
    }

    /// A shipment with up to eight tracking updates in arbitrary order.
    pub fn arb_shipment() -> impl Strategy<Value = Shipment> {
        (
            1i64..100_000,
            arb_tracking_number(),
            arb_user(),
            arb_shipment_status(),
            prop::option::of(arb_user()),
            arb_timestamp(),
            prop::collection::vec(arb_tracking_update(), 0..8),
        )
            .prop_map(
                |(id, tracking_number, sender, status, assigned_driver, created_at, updates)| {
                    Shipment {
                        id: ShipmentId(id),
                        tracking_number,
                        sender,
                        receiver_name: "Receiver".to_string(),
                        receiver_email: "receiver@example.com".to_string(),
                        receiver_phone: None,
                        origin_address: "1 Dock Road".to_string(),
                        destination_address: "9 Harbour Lane".to_string(),
                        origin_latitude: None,
                        origin_longitude: None,
                        destination_latitude: None,
                        destination_longitude: None,
                        status,
                        assigned_driver,
                        created_at,
                        updated_at: created_at,
                        tracking_updates: updates,
                    }
                },
            )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common scenarios.

    use super::*;

    pub fn sample_user(id: i64, role: UserRole) -> User {
        User {
            id: UserId(id),
            full_name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            phone: None,
            role,
            created_at: Utc::now(),
        }
    }

    /// A freshly created shipment sent by customer 1.
    pub fn sample_shipment(id: i64, tracking_number: &str) -> Shipment {
        let now = Utc::now();
        Shipment {
            id: ShipmentId(id),
            tracking_number: tracking_number.to_string(),
            sender: sample_user(1, UserRole::Customer),
            receiver_name: "Bob Receiver".to_string(),
            receiver_email: "bob@example.com".to_string(),
            receiver_phone: None,
            origin_address: "1 Dock Road".to_string(),
            destination_address: "9 Harbour Lane".to_string(),
            origin_latitude: None,
            origin_longitude: None,
            destination_latitude: None,
            destination_longitude: None,
            status: ShipmentStatus::Created,
            assigned_driver: None,
            created_at: now,
            updated_at: now,
            tracking_updates: Vec::new(),
        }
    }

    pub fn with_status(mut shipment: Shipment, status: ShipmentStatus) -> Shipment {
        shipment.status = status;
        shipment
    }

    pub fn tracking_update(id: i64, status: ShipmentStatus, timestamp: Timestamp) -> TrackingUpdate {
        TrackingUpdate {
            id: TrackingUpdateId(id),
            status,
            location: None,
            latitude: None,
            longitude: None,
            remarks: None,
            updated_by: sample_user(99, UserRole::Driver),
            timestamp,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
