//! REST client for the logistics backend.

use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shipline_cache::ShipmentFetcher;
use shipline_core::{
    AssignDriverRequest, AuditLog, AuditLogId, AuditLogPage, AuditLogQuery, AuthResponse,
    CreateShipmentRequest, DashboardAnalytics, DriverAvailability, DriverRatingsSummary,
    GenerateReportRequest, LoginRequest, RateDriverRequest, RegisterRequest, Report, ReportId,
    Shipment, ShipmentId, ShipmentRatingStatus, UpdateDriverLocationRequest,
    UpdateDriverProfileRequest, UpdateDriverStatusRequest, UpdateShipmentStatusRequest,
    UpdateUserRequest, User, UserId, UserRole, ValidationError,
};

/// Route that reports the current session. A 401 there means "not logged
/// in yet" rather than "session expired".
const CURRENT_USER_PATH: &str = "/Auth/me";

/// Page size used by the paged audit log routes when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Unauthorized: {path}")]
    Unauthorized { path: String },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl ApiClientError {
    /// Whether the caller should send the user back to the login screen.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Unauthorized { path } if !path.contains(CURRENT_USER_PATH))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    fn from_status(path: &str, status: StatusCode, body: String) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized {
                path: path.to_string(),
            }
        } else {
            Self::Status {
                status: status.as_u16(),
                body,
            }
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .cookie_store(true)
            .build()?;

        let auth_header = build_auth_headers(config.auth.bearer_token.as_deref())?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // === Auth ===

    pub async fn register(&self, body: &RegisterRequest) -> Result<AuthResponse, ApiClientError> {
        body.validate()?;
        self.post_json("/Auth/register", body).await
    }

    pub async fn login(&self, body: &LoginRequest) -> Result<AuthResponse, ApiClientError> {
        body.validate()?;
        self.post_json("/Auth/login", body).await
    }

    pub async fn logout(&self) -> Result<(), ApiClientError> {
        self.send_empty(Method::POST, "/Auth/logout", None::<&()>).await
    }

    pub async fn current_user(&self) -> Result<User, ApiClientError> {
        self.get_json::<User, ()>(CURRENT_USER_PATH, None).await
    }

    // === Shipments ===

    pub async fn list_shipments(&self) -> Result<Vec<Shipment>, ApiClientError> {
        self.get_json::<Vec<Shipment>, ()>("/Shipments", None).await
    }

    pub async fn get_shipment(&self, id: ShipmentId) -> Result<Shipment, ApiClientError> {
        let path = format!("/Shipments/{}", id);
        self.get_json::<Shipment, ()>(&path, None).await
    }

    pub async fn create_shipment(
        &self,
        body: &CreateShipmentRequest,
    ) -> Result<Shipment, ApiClientError> {
        body.validate()?;
        self.post_json("/Shipments", body).await
    }

    /// The tracking number goes into the path exactly as given.
    pub async fn track_shipment(&self, tracking_number: &str) -> Result<Shipment, ApiClientError> {
        let path = format!("/Shipments/track/{}", tracking_number);
        self.get_json::<Shipment, ()>(&path, None).await
    }

    pub async fn update_shipment_status(
        &self,
        id: ShipmentId,
        body: &UpdateShipmentStatusRequest,
    ) -> Result<(), ApiClientError> {
        let path = format!("/Shipments/{}/status", id);
        self.send_empty(Method::PUT, &path, Some(body)).await
    }

    pub async fn assign_driver(
        &self,
        id: ShipmentId,
        body: &AssignDriverRequest,
    ) -> Result<(), ApiClientError> {
        let path = format!("/Shipments/{}/assign-driver", id);
        self.send_empty(Method::PUT, &path, Some(body)).await
    }

    pub async fn rating_status(
        &self,
        id: ShipmentId,
    ) -> Result<ShipmentRatingStatus, ApiClientError> {
        let path = format!("/Shipments/{}/rating-status", id);
        self.get_json::<ShipmentRatingStatus, ()>(&path, None).await
    }

    // === Drivers ===

    pub async fn update_driver_location(
        &self,
        body: &UpdateDriverLocationRequest,
    ) -> Result<(), ApiClientError> {
        self.send_empty(Method::POST, "/Drivers/location", Some(body)).await
    }

    pub async fn update_driver_status(
        &self,
        body: &UpdateDriverStatusRequest,
    ) -> Result<(), ApiClientError> {
        self.send_empty(Method::PUT, "/Drivers/status", Some(body)).await
    }

    pub async fn update_driver_profile(
        &self,
        body: &UpdateDriverProfileRequest,
    ) -> Result<(), ApiClientError> {
        self.send_empty(Method::PUT, "/Drivers/profile", Some(body)).await
    }

    pub async fn create_driver_profile(&self) -> Result<(), ApiClientError> {
        self.send_empty(Method::POST, "/Drivers/profile", None::<&()>).await
    }

    pub async fn driver_availability(&self) -> Result<Vec<DriverAvailability>, ApiClientError> {
        self.get_json::<Vec<DriverAvailability>, ()>("/Drivers/availability", None)
            .await
    }

    pub async fn list_drivers(&self) -> Result<Vec<User>, ApiClientError> {
        self.get_json::<Vec<User>, ()>("/Drivers", None).await
    }

    pub async fn get_driver(&self, id: UserId) -> Result<User, ApiClientError> {
        let path = format!("/Drivers/{}", id);
        self.get_json::<User, ()>(&path, None).await
    }

    pub async fn rate_driver(
        &self,
        driver_id: UserId,
        body: &RateDriverRequest,
    ) -> Result<(), ApiClientError> {
        body.validate()?;
        let path = format!("/Drivers/{}/ratings", driver_id);
        self.send_empty(Method::POST, &path, Some(body)).await
    }

    pub async fn driver_ratings(
        &self,
        driver_id: UserId,
    ) -> Result<DriverRatingsSummary, ApiClientError> {
        let path = format!("/Drivers/{}/ratings", driver_id);
        self.get_json::<DriverRatingsSummary, ()>(&path, None).await
    }

    // === Users ===

    pub async fn list_users(&self, role: Option<UserRole>) -> Result<Vec<User>, ApiClientError> {
        let query = role.map(|role| [("role", role.to_string())]);
        self.get_json("/Users", query.as_ref()).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, ApiClientError> {
        let path = format!("/Users/{}", id);
        self.get_json::<User, ()>(&path, None).await
    }

    pub async fn update_user(
        &self,
        id: UserId,
        body: &UpdateUserRequest,
    ) -> Result<(), ApiClientError> {
        body.validate()?;
        let path = format!("/Users/{}", id);
        self.send_empty(Method::PUT, &path, Some(body)).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiClientError> {
        let path = format!("/Users/{}", id);
        self.send_empty(Method::DELETE, &path, None::<&()>).await
    }

    pub async fn list_driver_users(&self) -> Result<Vec<User>, ApiClientError> {
        self.get_json::<Vec<User>, ()>("/Users/drivers", None).await
    }

    // === Reports ===

    pub async fn analytics(&self) -> Result<DashboardAnalytics, ApiClientError> {
        self.get_json::<DashboardAnalytics, ()>("/Reports/analytics", None)
            .await
    }

    pub async fn generate_report(
        &self,
        body: &GenerateReportRequest,
    ) -> Result<Report, ApiClientError> {
        body.validate()?;
        self.post_json("/Reports/generate", body).await
    }

    /// Raw report file contents.
    pub async fn download_report(&self, id: ReportId) -> Result<Vec<u8>, ApiClientError> {
        let path = format!("/Reports/{}/download", id);
        let response = self.send(&path, self.request(Method::GET, &path)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn list_reports(&self) -> Result<Vec<Report>, ApiClientError> {
        self.get_json::<Vec<Report>, ()>("/Reports", None).await
    }

    // === Audit logs ===

    /// Only filters that are set are sent.
    pub async fn audit_logs(&self, query: &AuditLogQuery) -> Result<AuditLogPage, ApiClientError> {
        let query = query.clone().cleaned();
        self.get_json("/auditlogs", Some(&query)).await
    }

    pub async fn audit_log(&self, id: AuditLogId) -> Result<AuditLog, ApiClientError> {
        let path = format!("/auditlogs/{}", id);
        self.get_json::<AuditLog, ()>(&path, None).await
    }

    pub async fn audit_logs_for_user(
        &self,
        user_id: UserId,
        page_number: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Vec<AuditLog>, ApiClientError> {
        let path = format!("/auditlogs/user/{}", user_id);
        self.get_json(&path, Some(&page_query(page_number, page_size)))
            .await
    }

    pub async fn audit_logs_for_target(
        &self,
        target_table: &str,
        target_id: &str,
    ) -> Result<Vec<AuditLog>, ApiClientError> {
        let path = format!("/auditlogs/target/{}/{}", target_table, target_id);
        self.get_json::<Vec<AuditLog>, ()>(&path, None).await
    }

    pub async fn my_activity(
        &self,
        page_number: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Vec<AuditLog>, ApiClientError> {
        self.get_json(
            "/auditlogs/my-activity",
            Some(&page_query(page_number, page_size)),
        )
        .await
    }

    // === Transport ===

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .headers(self.auth_header.clone())
    }

    async fn send(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, ApiClientError> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(path, status = status.as_u16(), "backend response");

        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await?;
        Err(ApiClientError::from_status(path, status, body))
    }

    async fn get_json<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut request = self.request(Method::GET, path);
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = self.send(path, request).await?;
        parse_json(response).await
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path).json(body);
        let response = self.send(path, request).await?;
        parse_json(response).await
    }

    async fn send_empty<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiClientError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(path, request).await?;
        Ok(())
    }
}

#[async_trait]
impl ShipmentFetcher for ApiClient {
    type Error = ApiClientError;

    async fn fetch_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<Shipment, ApiClientError> {
        self.track_shipment(tracking_number).await
    }

    async fn fetch_by_id(&self, id: ShipmentId) -> Result<Shipment, ApiClientError> {
        self.get_shipment(id).await
    }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiClientError> {
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(ApiClientError::InvalidResponse(
            "empty response body".to_string(),
        ));
    }
    Ok(serde_json::from_slice(&bytes)?)
}

fn page_query(page_number: Option<u32>, page_size: Option<u32>) -> [(&'static str, u32); 2] {
    [
        ("pageNumber", page_number.filter(|n| *n > 0).unwrap_or(1)),
        (
            "pageSize",
            page_size.filter(|n| *n > 0).unwrap_or(DEFAULT_PAGE_SIZE),
        ),
    ]
}

fn build_auth_headers(bearer_token: Option<&str>) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = bearer_token {
        let value = format!("Bearer {}", token);
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&value).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}
