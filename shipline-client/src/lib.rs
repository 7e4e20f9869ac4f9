//! Shipline Client - HTTP Client and CLI
//!
//! Talks to the logistics backend over REST, plugs the shipment cache in
//! front of the lookup endpoints, and hosts the rating and geocoding
//! helpers used by the command-line front end.

pub mod api_client;
pub mod cli;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod rating;

pub use api_client::{ApiClient, ApiClientError};
pub use config::{ClientConfig, ConfigError};
pub use error::CliError;
pub use geocoding::{GeocodeResult, Geocoder, GeocodingError, ReverseGeocodeResult};
pub use rating::{pending_ratings, RatingStatusSource, RatingTracker};
