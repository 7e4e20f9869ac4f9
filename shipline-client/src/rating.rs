//! Driver rating state for delivered shipments.

use crate::api_client::{ApiClient, ApiClientError};
use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::join_all;
use shipline_core::{
    rating_candidates, DriverRating, Shipment, ShipmentId, ShipmentRatingStatus, UserId,
};

/// Message recorded when the rating status could not be fetched.
pub const CHECK_FAILED_MESSAGE: &str = "Failed to check rating status";

/// Name attached to a rating recorded locally before the backend echoes it.
pub const LOCAL_RATER_NAME: &str = "Current User";

/// Backend query for a shipment's rating status.
#[async_trait]
pub trait RatingStatusSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn rating_status(&self, id: ShipmentId) -> Result<ShipmentRatingStatus, Self::Error>;
}

#[async_trait]
impl RatingStatusSource for ApiClient {
    type Error = ApiClientError;

    async fn rating_status(&self, id: ShipmentId) -> Result<ShipmentRatingStatus, ApiClientError> {
        ApiClient::rating_status(self, id).await
    }
}

/// Rating status of one shipment as shown by the rating prompt.
pub struct RatingTracker<'a, S: RatingStatusSource> {
    source: &'a S,
    status: Option<ShipmentRatingStatus>,
    error: Option<String>,
}

impl<'a, S: RatingStatusSource> RatingTracker<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            status: None,
            error: None,
        }
    }

    /// Ask the backend. On failure the shipment is assumed unrated and
    /// rateable, and the failure message is kept.
    pub async fn check(&mut self, id: ShipmentId) -> &ShipmentRatingStatus {
        self.error = None;
        let status = match self.source.rating_status(id).await {
            Ok(status) => status,
            Err(err) => {
                tracing::error!(error = %err, shipment_id = %id, "Error checking rating status");
                self.error = Some(CHECK_FAILED_MESSAGE.to_string());
                ShipmentRatingStatus::assume_unrated(id.to_string(), "")
            }
        };
        self.status.insert(status)
    }

    /// Record a rating that was just submitted. No-op before [`check`](Self::check).
    pub fn mark_as_rated(&mut self, rating: u8, comment: Option<String>) {
        if let Some(status) = self.status.as_mut() {
            status.is_rated = true;
            status.existing_rating = Some(DriverRating {
                rating,
                comment,
                rated_at: Utc::now(),
                rated_by_customer: LOCAL_RATER_NAME.to_string(),
                shipment_tracking_number: status.tracking_number.clone(),
            });
        }
    }

    pub fn status(&self) -> Option<&ShipmentRatingStatus> {
        self.status.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Delivered shipments of `customer` that still await a driver rating.
///
/// Statuses are fetched concurrently. A shipment whose status cannot be
/// fetched counts as pending.
pub async fn pending_ratings<'s, S: RatingStatusSource>(
    source: &S,
    shipments: &'s [Shipment],
    customer: UserId,
) -> Vec<(&'s Shipment, ShipmentRatingStatus)> {
    let candidates = rating_candidates(shipments, customer);
    let statuses = join_all(candidates.iter().map(|shipment| async move {
        match source.rating_status(shipment.id).await {
            Ok(status) => status,
            Err(err) => {
                tracing::error!(error = %err, shipment_id = %shipment.id, "Failed to get rating status");
                ShipmentRatingStatus::assume_unrated(
                    shipment.id.to_string(),
                    shipment.tracking_number.clone(),
                )
            }
        }
    }))
    .await;

    candidates
        .into_iter()
        .zip(statuses)
        .filter(|(_, status)| status.is_pending())
        .collect()
}
