//! Address geocoding against free providers.
//!
//! Nominatim needs no key but allows one request per second, so every
//! Nominatim call waits on a shared throttle. MapBox and LocationIQ are
//! used only when a key is configured.

use crate::config::GeocodingConfig;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

const MAPBOX_BASE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
const LOCATIONIQ_BASE_URL: &str = "https://us1.locationiq.com/v1/search.php";
const RESULT_LIMIT: &str = "5";

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseGeocodeResult {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Nominatim,
    MapBox,
    LocationIq,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Provider::Nominatim => "Nominatim",
            Provider::MapBox => "MapBox",
            Provider::LocationIq => "LocationIQ",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodingError {
    #[error("Address is required")]
    AddressRequired,
    #[error("{0} API key not configured")]
    MissingApiKey(Provider),
    #[error("{provider} request failed: {source}")]
    Http {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned HTTP {status}")]
    Status { provider: Provider, status: u16 },
    #[error("{provider} returned an unusable response: {reason}")]
    InvalidResponse { provider: Provider, reason: String },
    #[error("All geocoding services failed")]
    AllProvidersFailed,
}

// Nominatim and LocationIQ share this shape; coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct PlaceDto {
    display_name: String,
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct MapBoxResponse {
    #[serde(default)]
    features: Vec<MapBoxFeature>,
}

#[derive(Debug, Deserialize)]
struct MapBoxFeature {
    place_name: String,
    /// `[lng, lat]`
    center: [f64; 2],
}

pub struct Geocoder {
    client: reqwest::Client,
    config: GeocodingConfig,
    last_request: Mutex<Option<Instant>>,
}

impl Geocoder {
    pub fn new(client: reqwest::Client, config: GeocodingConfig) -> Self {
        Self {
            client,
            config,
            last_request: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &GeocodingConfig {
        &self.config
    }

    /// Nominatim forward search, at most five results.
    pub async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, GeocodingError> {
        if address.trim().is_empty() {
            return Err(GeocodingError::AddressRequired);
        }
        self.throttle().await;

        let url = format!("{}/search", self.nominatim_base());
        let places: Vec<PlaceDto> = self
            .fetch(
                Provider::Nominatim,
                self.client
                    .get(url)
                    .header(reqwest::header::USER_AGENT, &self.config.user_agent)
                    .query(&[
                        ("q", address),
                        ("format", "json"),
                        ("limit", RESULT_LIMIT),
                        ("addressdetails", "1"),
                    ]),
            )
            .await?;
        places_to_results(Provider::Nominatim, places)
    }

    pub async fn reverse_geocode(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<ReverseGeocodeResult, GeocodingError> {
        self.throttle().await;

        let url = format!("{}/reverse", self.nominatim_base());
        let place: PlaceDto = self
            .fetch(
                Provider::Nominatim,
                self.client
                    .get(url)
                    .header(reqwest::header::USER_AGENT, &self.config.user_agent)
                    .query(&[
                        ("lat", lat.to_string()),
                        ("lon", lng.to_string()),
                        ("format", "json".to_string()),
                        ("addressdetails", "1".to_string()),
                    ]),
            )
            .await?;
        let result = place_to_result(Provider::Nominatim, place)?;
        Ok(ReverseGeocodeResult {
            address: result.address,
            lat: result.lat,
            lng: result.lng,
        })
    }

    pub async fn geocode_with_mapbox(
        &self,
        address: &str,
    ) -> Result<Vec<GeocodeResult>, GeocodingError> {
        let key = self
            .config
            .mapbox_api_key
            .as_deref()
            .ok_or(GeocodingError::MissingApiKey(Provider::MapBox))?;

        let mut url = reqwest::Url::parse(MAPBOX_BASE_URL).map_err(|e| {
            GeocodingError::InvalidResponse {
                provider: Provider::MapBox,
                reason: e.to_string(),
            }
        })?;
        url.path_segments_mut()
            .map_err(|_| GeocodingError::InvalidResponse {
                provider: Provider::MapBox,
                reason: "base URL cannot take a path".to_string(),
            })?
            .push(&format!("{}.json", address));

        let response: MapBoxResponse = self
            .fetch(
                Provider::MapBox,
                self.client
                    .get(url)
                    .query(&[("access_token", key), ("limit", RESULT_LIMIT)]),
            )
            .await?;
        Ok(mapbox_to_results(response))
    }

    pub async fn geocode_with_locationiq(
        &self,
        address: &str,
    ) -> Result<Vec<GeocodeResult>, GeocodingError> {
        let key = self
            .config
            .locationiq_api_key
            .as_deref()
            .ok_or(GeocodingError::MissingApiKey(Provider::LocationIq))?;

        let places: Vec<PlaceDto> = self
            .fetch(
                Provider::LocationIq,
                self.client.get(LOCATIONIQ_BASE_URL).query(&[
                    ("q", address),
                    ("key", key),
                    ("format", "json"),
                    ("limit", RESULT_LIMIT),
                ]),
            )
            .await?;
        places_to_results(Provider::LocationIq, places)
    }

    /// Nominatim first, then MapBox, then LocationIQ.
    ///
    /// An empty Nominatim result falls through to the next provider. The
    /// keyed providers are returned as soon as one succeeds, empty or not.
    pub async fn smart_geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, GeocodingError> {
        match self.geocode(address).await {
            Ok(results) if !results.is_empty() => return Ok(results),
            Ok(_) => tracing::warn!("Nominatim returned no results, trying alternatives"),
            Err(err) => tracing::warn!(error = %err, "Nominatim geocoding failed, trying alternatives"),
        }

        match self.geocode_with_mapbox(address).await {
            Ok(results) => return Ok(results),
            Err(err) => tracing::warn!(error = %err, "MapBox geocoding failed"),
        }

        match self.geocode_with_locationiq(address).await {
            Ok(results) => return Ok(results),
            Err(err) => tracing::warn!(error = %err, "LocationIQ geocoding failed"),
        }

        Err(GeocodingError::AllProvidersFailed)
    }

    fn nominatim_base(&self) -> &str {
        self.config.nominatim_base_url.trim_end_matches('/')
    }

    /// Wait until at least `min_interval` has passed since the previous
    /// Nominatim request. Callers queue on the lock.
    async fn throttle(&self) {
        let min_interval = self.config.min_interval();
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < min_interval {
                tokio::time::sleep(min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        provider: Provider,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GeocodingError> {
        let response = request
            .send()
            .await
            .map_err(|source| GeocodingError::Http { provider, source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::Status {
                provider,
                status: status.as_u16(),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|source| GeocodingError::Http { provider, source })
    }
}

fn place_to_result(provider: Provider, place: PlaceDto) -> Result<GeocodeResult, GeocodingError> {
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|e| GeocodingError::InvalidResponse {
                provider,
                reason: format!("bad coordinate {:?}: {}", value, e),
            })
    };
    Ok(GeocodeResult {
        lat: parse(&place.lat)?,
        lng: parse(&place.lon)?,
        display_name: Some(place.display_name.clone()),
        address: place.display_name,
    })
}

fn places_to_results(
    provider: Provider,
    places: Vec<PlaceDto>,
) -> Result<Vec<GeocodeResult>, GeocodingError> {
    places
        .into_iter()
        .map(|place| place_to_result(provider, place))
        .collect()
}

fn mapbox_to_results(response: MapBoxResponse) -> Vec<GeocodeResult> {
    response
        .features
        .into_iter()
        .map(|feature| GeocodeResult {
            address: feature.place_name.clone(),
            lat: feature.center[1],
            lng: feature.center[0],
            display_name: Some(feature.place_name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn geocoder(config: GeocodingConfig) -> Geocoder {
        Geocoder::new(reqwest::Client::new(), config)
    }

    #[tokio::test]
    async fn test_blank_address_is_rejected_before_request() {
        let geocoder = geocoder(GeocodingConfig::default());
        let err = geocoder.geocode("   ").await.unwrap_err();
        assert!(matches!(err, GeocodingError::AddressRequired));
    }

    #[tokio::test]
    async fn test_keyed_providers_need_keys() {
        let geocoder = geocoder(GeocodingConfig::default());
        assert!(matches!(
            geocoder.geocode_with_mapbox("Oslo").await,
            Err(GeocodingError::MissingApiKey(Provider::MapBox))
        ));
        assert!(matches!(
            geocoder.geocode_with_locationiq("Oslo").await,
            Err(GeocodingError::MissingApiKey(Provider::LocationIq))
        ));
    }

    #[tokio::test]
    async fn test_throttle_spaces_requests() {
        let geocoder = geocoder(GeocodingConfig {
            min_interval_ms: 50,
            ..GeocodingConfig::default()
        });

        let start = Instant::now();
        geocoder.throttle().await;
        geocoder.throttle().await;
        geocoder.throttle().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_place_parsing() {
        let places: Vec<PlaceDto> = serde_json::from_str(
            r#"[{"display_name": "Oslo, Norway", "lat": "59.91", "lon": "10.75", "place_id": 1}]"#,
        )
        .unwrap();
        let results = places_to_results(Provider::Nominatim, places).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].address, "Oslo, Norway");
        assert!((results[0].lat - 59.91).abs() < 1e-9);
        assert!((results[0].lng - 10.75).abs() < 1e-9);
    }

    #[test]
    fn test_bad_coordinate_is_invalid_response() {
        let place = PlaceDto {
            display_name: "x".to_string(),
            lat: "north".to_string(),
            lon: "0".to_string(),
        };
        assert!(matches!(
            place_to_result(Provider::LocationIq, place),
            Err(GeocodingError::InvalidResponse { provider: Provider::LocationIq, .. })
        ));
    }

    #[test]
    fn test_mapbox_center_is_lng_lat() {
        let response: MapBoxResponse = serde_json::from_str(
            r#"{"features": [{"place_name": "Bergen", "center": [5.32, 60.39]}]}"#,
        )
        .unwrap();
        let results = mapbox_to_results(response);
        assert!((results[0].lat - 60.39).abs() < 1e-9);
        assert!((results[0].lng - 5.32).abs() < 1e-9);
    }
}
