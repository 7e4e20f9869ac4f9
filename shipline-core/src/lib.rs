//! Shipline Core - Domain Types and Derived Views
//!
//! Data contracts for the logistics backend plus the pure helpers the client
//! derives from them (tracking number conventions, status summaries,
//! delivery estimates). No I/O lives in this crate.

mod entities;
mod enums;
mod error;
mod identity;
mod requests;
pub mod tracking;
pub mod views;

pub use entities::*;
pub use enums::*;
pub use error::*;
pub use identity::*;
pub use requests::*;

pub use tracking::{
    format_tracking_number, is_valid_tracking_number, normalize_tracking_number,
    parse_tracking_number,
};
pub use views::{
    estimate_delivery, estimate_delivery_at, format_work_time, rating_candidates, summarize,
    DeliveryEstimate, TrackingSummary,
};
