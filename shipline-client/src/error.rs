//! Error types for the CLI.

use crate::api_client::ApiClientError;
use crate::config::ConfigError;
use crate::geocoding::GeocodingError;
use shipline_core::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiClientError),
    #[error(transparent)]
    Geocoding(#[from] GeocodingError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
