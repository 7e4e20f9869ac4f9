use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use shipline_core::{
    estimate_delivery_at, format_tracking_number, is_valid_tracking_number,
    normalize_tracking_number, parse_tracking_number, summarize, Shipment, ShipmentId,
    ShipmentStatus, TrackingUpdate, TrackingUpdateId, User, UserId, UserRole,
};

fn arb_status() -> impl Strategy<Value = ShipmentStatus> {
    prop::sample::select(ShipmentStatus::ALL.to_vec())
}

fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (1577836800i64..1893456000i64)
        .prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now))
}

fn user(id: i64) -> User {
    User {
        id: UserId(id),
        full_name: format!("User {}", id),
        email: format!("user{}@example.com", id),
        phone: None,
        role: UserRole::Customer,
        created_at: Utc::now(),
    }
}

fn shipment(status: ShipmentStatus, created_at: DateTime<Utc>, updates: Vec<TrackingUpdate>) -> Shipment {
    Shipment {
        id: ShipmentId(1),
        tracking_number: "LST123456".to_string(),
        sender: user(1),
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
        created_at,
        updated_at: created_at,
        tracking_updates: updates,
    }
}

fn arb_updates() -> impl Strategy<Value = Vec<TrackingUpdate>> {
    prop::collection::vec((arb_status(), arb_timestamp()), 0..10).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (status, timestamp))| TrackingUpdate {
                id: TrackingUpdateId(i as i64),
                status,
                location: None,
                latitude: None,
                longitude: None,
                remarks: None,
                updated_by: user(9),
                timestamp,
            })
            .collect()
    })
}

#[test]
fn documented_examples() {
    assert!(is_valid_tracking_number("LST123456"));
    assert!(is_valid_tracking_number("LST-123-456"));
    assert!(!is_valid_tracking_number("lst123456"));
    assert!(!is_valid_tracking_number("LST12"));
    assert_eq!(format_tracking_number("LST123456"), "LST-123-456");
}

proptest! {
    #[test]
    fn canonical_numbers_are_valid(number in "[A-Z]{2,4}[0-9]{6,8}") {
        prop_assert!(is_valid_tracking_number(&number));
        prop_assert_eq!(parse_tracking_number(&number).unwrap(), number);
    }

    #[test]
    fn lowercase_letters_are_never_valid(number in "[a-z]{2,4}[0-9]{6,8}") {
        prop_assert!(!is_valid_tracking_number(&number));
        prop_assert!(parse_tracking_number(&number).is_err());
    }

    #[test]
    fn formatting_survives_normalization(number in "[A-Z]{2,4}[0-9]{6,8}") {
        let formatted = format_tracking_number(&number);
        prop_assert!(is_valid_tracking_number(&formatted));
        prop_assert_eq!(normalize_tracking_number(&formatted), number);
    }

    #[test]
    fn active_estimates_are_in_the_future(
        status in arb_status(),
        created_at in arb_timestamp(),
        now in arb_timestamp(),
    ) {
        let estimate = estimate_delivery_at(&shipment(status, created_at, Vec::new()), now);
        if status.is_terminal() {
            prop_assert_eq!(estimate.estimated, None);
            prop_assert!(!estimate.is_estimate);
        } else {
            let at = estimate.estimated.unwrap();
            prop_assert!(at > now);
            prop_assert!(at <= std::cmp::max(created_at + Duration::days(3), now + Duration::hours(24)));
        }
    }

    #[test]
    fn summary_timeline_is_sorted_and_complete(updates in arb_updates()) {
        let shipment = shipment(ShipmentStatus::InTransit, Utc::now(), updates.clone());
        let summary = summarize(&shipment);

        prop_assert_eq!(summary.total_updates, updates.len());
        prop_assert!(summary.timeline.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        prop_assert_eq!(summary.last_update.map(|u| u.timestamp), updates.iter().map(|u| u.timestamp).max());
        // input untouched
        prop_assert_eq!(&shipment.tracking_updates, &updates);
    }
}
