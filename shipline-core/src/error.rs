//! Error types for Shipline operations

use thiserror::Error;

/// Validation errors raised before a request leaves the client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Invalid tracking number: {value}")]
    InvalidTrackingNumber { value: String },
}
