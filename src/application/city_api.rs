// Backend seam for the external smart-city API
use crate::domain::snapshot::DashboardSnapshot;
use crate::domain::zone::Zone;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failures at the fetch boundary. Nothing beyond this type reaches the
/// consumers; the controller turns it into displayable state.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cannot reach the city API: {0}")]
    Connect(String),
    #[error("city API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode city API response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything the application reads from or writes to the backend.
///
/// Dashboard and zone reads come back as typed domain values, validated at
/// the deserialization boundary. The domain-scoped and correlation payloads
/// stay opaque JSON; their structure is a contract between the backend and
/// the views, not something this core enforces.
#[async_trait]
pub trait CityApi: Send + Sync {
    /// Zone/city catalog. Fetched once at startup.
    async fn fetch_zones(&self) -> ApiResult<Vec<Zone>>;

    /// Aggregate snapshot for one city. A `no_metrics_yet` sentinel from the
    /// backend maps to an empty snapshot, never to an error.
    async fn fetch_dashboard(&self, city: &str) -> ApiResult<DashboardSnapshot>;

    async fn fetch_traffic(&self, city: &str) -> ApiResult<Value>;
    async fn fetch_health(&self, city: &str) -> ApiResult<Value>;
    async fn fetch_agriculture(&self, city: &str) -> ApiResult<Value>;

    async fn correlation_matrix(&self, zone_id: Option<&str>) -> ApiResult<Value>;
    async fn correlation_insights(&self, zone_id: Option<&str>) -> ApiResult<Value>;
    async fn correlation_impact(
        &self,
        source_domain: &str,
        target_domain: &str,
        source_change: Option<f64>,
    ) -> ApiResult<Value>;
    async fn trigger_correlation_analysis(&self, zone_id: Option<&str>) -> ApiResult<Value>;

    /// Server-side scenario execution; unrelated to the local projector.
    async fn run_scenario(
        &self,
        scenario_name: &str,
        params: Value,
        target_zones: Option<Vec<String>>,
    ) -> ApiResult<Value>;

    async fn login(&self, username: &str, password: &str) -> ApiResult<Value>;
    async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<Value>;
    async fn logout(&self) -> ApiResult<Value>;
    async fn current_user(&self) -> ApiResult<Value>;
}
