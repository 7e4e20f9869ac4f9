//! Request bodies sent to the backend.
//!
//! Validation here only covers what the forms checked before submitting:
//! required fields and obvious shape errors. Everything else is the
//! backend's call.

use crate::error::ValidationError;
use crate::identity::wire_timestamp;
use crate::{DriverStatus, ReportType, ShipmentId, ShipmentStatus, Timestamp, UserId, UserRole};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: UserRole,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("fullName", &self.full_name)?;
        require_email("email", &self.email)?;
        require("password", &self.password)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_email("email", &self.email)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipmentRequest {
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
}

impl CreateShipmentRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("receiverName", &self.receiver_name)?;
        require_email("receiverEmail", &self.receiver_email)?;
        require("originAddress", &self.origin_address)?;
        require("destinationAddress", &self.destination_address)?;
        if self.origin_latitude.is_some() != self.origin_longitude.is_some() {
            return Err(ValidationError::InvalidValue {
                field: "originLatitude",
                reason: "latitude and longitude must be given together".to_string(),
            });
        }
        if self.destination_latitude.is_some() != self.destination_longitude.is_some() {
            return Err(ValidationError::InvalidValue {
                field: "destinationLatitude",
                reason: "latitude and longitude must be given together".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateShipmentStatusRequest {
    pub status: ShipmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl UpdateShipmentStatusRequest {
    pub fn new(status: ShipmentStatus) -> Self {
        Self {
            status,
            location: None,
            latitude: None,
            longitude: None,
            remarks: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDriverRequest {
    pub driver_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(email) = &self.email {
            require_email("email", email)?;
        }
        Ok(())
    }
}

// ============================================================================
// DRIVERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDriverLocationRequest {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDriverStatusRequest {
    pub status: DriverStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDriverProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_active_shipments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateDriverRequest {
    pub shipment_id: ShipmentId,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl RateDriverRequest {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(Self::MIN_RATING..=Self::MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::InvalidValue {
                field: "rating",
                reason: "Rating must be between 1 and 5".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// REPORTS AND AUDIT LOGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportRequest {
    pub report_type: ReportType,
    #[serde(with = "wire_timestamp")]
    pub start_date: Timestamp,
    #[serde(with = "wire_timestamp")]
    pub end_date: Timestamp,
}

impl GenerateReportRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end_date < self.start_date {
            return Err(ValidationError::InvalidValue {
                field: "endDate",
                reason: "must not be before startDate".to_string(),
            });
        }
        Ok(())
    }
}

/// Filters for the admin audit log listing. Unset filters are not sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl AuditLogQuery {
    /// Drop filters that were left blank in the form.
    pub fn cleaned(self) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }
        Self {
            user_id: non_blank(self.user_id),
            action: non_blank(self.action),
            target_table: non_blank(self.target_table),
            start_date: non_blank(self.start_date),
            end_date: non_blank(self.end_date),
            page_number: self.page_number.filter(|n| *n > 0),
            page_size: self.page_size.filter(|n| *n > 0),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing { field });
    }
    Ok(())
}

fn require_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require(field, value)?;
    if !value.contains('@') {
        return Err(ValidationError::InvalidValue {
            field,
            reason: "must be an email address".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipment_request() -> CreateShipmentRequest {
        CreateShipmentRequest {
            receiver_name: "Bob".to_string(),
            receiver_email: "bob@example.com".to_string(),
            origin_address: "1 Dock Road".to_string(),
            destination_address: "9 Harbour Lane".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_shipment_requires_fields() {
        assert!(shipment_request().validate().is_ok());

        let mut missing = shipment_request();
        missing.receiver_name = "  ".to_string();
        assert_eq!(
            missing.validate(),
            Err(ValidationError::RequiredFieldMissing { field: "receiverName" })
        );

        let mut bad_email = shipment_request();
        bad_email.receiver_email = "bob".to_string();
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_create_shipment_rejects_half_coordinates() {
        let mut request = shipment_request();
        request.origin_latitude = Some(51.5);
        assert!(request.validate().is_err());
        request.origin_longitude = Some(-0.12);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_rating_bounds() {
        let mut request = RateDriverRequest {
            shipment_id: ShipmentId(1),
            rating: 5,
            comment: None,
        };
        assert!(request.validate().is_ok());
        request.rating = 0;
        assert!(request.validate().is_err());
        request.rating = 6;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_audit_query_cleaned_drops_blanks() {
        let query = AuditLogQuery {
            user_id: Some(String::new()),
            action: Some("Create".to_string()),
            page_number: Some(0),
            page_size: Some(20),
            ..Default::default()
        }
        .cleaned();
        assert_eq!(query.user_id, None);
        assert_eq!(query.action.as_deref(), Some("Create"));
        assert_eq!(query.page_number, None);
        assert_eq!(query.page_size, Some(20));
    }

    #[test]
    fn test_status_request_skips_empty_optionals() {
        let body = serde_json::to_value(UpdateShipmentStatusRequest::new(ShipmentStatus::PickedUp))
            .unwrap();
        assert_eq!(body, serde_json::json!({ "status": "PickedUp" }));
    }
}
