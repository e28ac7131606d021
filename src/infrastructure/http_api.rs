// HTTP adapter for the smart-city backend API
//
// Wire structs default every field, so sparse or evolving backend payloads
// degrade to zero/empty values at this boundary instead of failing decode.
use crate::application::city_api::{ApiError, ApiResult, CityApi};
use crate::domain::snapshot::{
    AgricultureSummary, Alert, DashboardSnapshot, HealthSummary, TrafficSummary, WeatherSummary,
};
use crate::domain::zone::Zone;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::RwLock;

use super::config::endpoint_url;

pub struct HttpCityApi {
    base_url: String,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct ZonesWire {
    #[serde(default)]
    zones: Vec<ZoneWire>,
}

#[derive(Debug, Deserialize, Default)]
struct ZoneWire {
    #[serde(default)]
    zone_id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Deserialize, Default)]
struct RealtimeDashboardWire {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    city: CityMetricsWire,
    #[serde(default)]
    alerts: Vec<ZoneAlertWire>,
    #[serde(default)]
    correlation_alerts: Vec<Value>,
}

#[derive(Debug, Deserialize, Default)]
struct CityMetricsWire {
    #[serde(default)]
    congestion_index: f64,
    #[serde(default)]
    health_risk: f64,
    #[serde(default)]
    food_stress: f64,
    #[serde(default)]
    heat_risk: f64,
}

#[derive(Debug, Deserialize, Default)]
struct ZoneAlertWire {
    #[serde(default)]
    zone_id: String,
    #[serde(default)]
    health_risk: f64,
}

impl HttpCityApi {
    pub fn new(base_url: String, bearer_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            token: RwLock::new(bearer_token),
        }
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        endpoint_url(&self.base_url, path, query)
    }

    fn bearer_token(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }

    fn set_bearer_token(&self, token: Option<String>) {
        *self.token.write().unwrap() = token;
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = self.bearer_token() {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Connect(e.to_string()))?;
        Self::decode(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &Value,
    ) -> ApiResult<T> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = self.bearer_token() {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Connect(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn map_dashboard(city: &str, wire: RealtimeDashboardWire) -> DashboardSnapshot {
    // "Not ready yet" is not an error; the views get a neutral snapshot.
    if wire.status.as_deref() == Some("no_metrics_yet") {
        return DashboardSnapshot::empty(city);
    }

    DashboardSnapshot {
        city_name: city.to_string(),
        traffic_summary: TrafficSummary::from_index(wire.city.congestion_index),
        health_summary: HealthSummary::from_index(wire.city.health_risk),
        agriculture_summary: AgricultureSummary::from_index(wire.city.food_stress),
        weather_summary: WeatherSummary::from_index(wire.city.heat_risk),
        alerts: wire
            .alerts
            .into_iter()
            .map(|a| Alert::from_health_risk(a.zone_id, a.health_risk))
            .collect(),
        correlation_alerts: wire.correlation_alerts,
        fetched_at: Utc::now(),
    }
}

#[async_trait]
impl CityApi for HttpCityApi {
    async fn fetch_zones(&self) -> ApiResult<Vec<Zone>> {
        let url = self.url("/zones", &[]);
        let wire: ZonesWire = self.get_json(&url).await?;
        Ok(wire
            .zones
            .into_iter()
            .map(|z| Zone::new(z.zone_id, z.name, z.kind))
            .collect())
    }

    async fn fetch_dashboard(&self, city: &str) -> ApiResult<DashboardSnapshot> {
        let url = self.url("/realtime/dashboard", &[("city", city.to_string())]);
        let wire: RealtimeDashboardWire = self.get_json(&url).await?;
        Ok(map_dashboard(city, wire))
    }

    async fn fetch_traffic(&self, city: &str) -> ApiResult<Value> {
        let url = self.url("/traffic", &[("city", city.to_string())]);
        self.get_json(&url).await
    }

    async fn fetch_health(&self, city: &str) -> ApiResult<Value> {
        let url = self.url("/health", &[("city", city.to_string())]);
        self.get_json(&url).await
    }

    async fn fetch_agriculture(&self, city: &str) -> ApiResult<Value> {
        let url = self.url("/agriculture", &[("city", city.to_string())]);
        self.get_json(&url).await
    }

    async fn correlation_matrix(&self, zone_id: Option<&str>) -> ApiResult<Value> {
        let mut query = Vec::new();
        if let Some(zone_id) = zone_id {
            query.push(("zone_id", zone_id.to_string()));
        }
        let url = self.url("/correlations/matrix", &query);
        self.get_json(&url).await
    }

    async fn correlation_insights(&self, zone_id: Option<&str>) -> ApiResult<Value> {
        let mut query = Vec::new();
        if let Some(zone_id) = zone_id {
            query.push(("zone_id", zone_id.to_string()));
        }
        let url = self.url("/correlations/insights", &query);
        self.get_json(&url).await
    }

    async fn correlation_impact(
        &self,
        source_domain: &str,
        target_domain: &str,
        source_change: Option<f64>,
    ) -> ApiResult<Value> {
        let mut query = vec![
            ("source_domain", source_domain.to_string()),
            ("target_domain", target_domain.to_string()),
        ];
        if let Some(change) = source_change {
            query.push(("source_change", change.to_string()));
        }
        let url = self.url("/correlations/impact", &query);
        self.get_json(&url).await
    }

    async fn trigger_correlation_analysis(&self, zone_id: Option<&str>) -> ApiResult<Value> {
        let url = self.url("/correlations/analyze", &[]);
        self.post_json(&url, &json!({ "zone_id": zone_id })).await
    }

    async fn run_scenario(
        &self,
        scenario_name: &str,
        params: Value,
        target_zones: Option<Vec<String>>,
    ) -> ApiResult<Value> {
        let url = self.url("/scenarios/run", &[]);
        let body = json!({
            "scenario_name": scenario_name,
            "params": params,
            "target_zones": target_zones,
        });
        self.post_json(&url, &body).await
    }

    async fn login(&self, username: &str, password: &str) -> ApiResult<Value> {
        let url = self.url("/auth/login", &[]);
        let body = json!({ "username": username, "password": password });
        let result: Value = self.post_json(&url, &body).await?;
        if let Some(token) = result.get("token").and_then(Value::as_str) {
            self.set_bearer_token(Some(token.to_string()));
        }
        Ok(result)
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<Value> {
        let url = self.url("/auth/register", &[]);
        let body = json!({ "username": username, "email": email, "password": password });
        self.post_json(&url, &body).await
    }

    async fn logout(&self) -> ApiResult<Value> {
        // The stored credential goes first so a failed backend call cannot
        // leave the client authenticated.
        self.set_bearer_token(None);
        let url = self.url("/auth/logout", &[]);
        self.post_json(&url, &json!({})).await
    }

    async fn current_user(&self) -> ApiResult<Value> {
        let url = self.url("/auth/user", &[]);
        self.get_json(&url).await
    }
}
