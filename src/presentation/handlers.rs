// HTTP request handlers
use crate::application::city_api::ApiResult;
use crate::application::city_state::CityState;
use crate::domain::scenario::{project, ScenarioInput, ScenarioResult};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full controller state: selection, zones, snapshot, lifecycle flags.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<CityState> {
    Json(state.controller.current())
}

/// Server-sent stream of controller state updates.
pub async fn stream_state(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = WatchStream::new(state.controller.subscribe()).map(|city_state| {
        let payload = serde_json::to_string(&city_state).unwrap_or_default();
        Ok(Event::default().event("state").data(payload))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Latest dashboard snapshot, or 503 while none has been fetched yet.
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Response {
    match state.controller.current().snapshot {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "no_snapshot_yet" })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
pub struct ChangeCityRequest {
    pub city: String,
}

pub async fn change_city(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChangeCityRequest>,
) -> Json<CityState> {
    state.controller.change_city(request.city);
    Json(state.controller.current())
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> Json<CityState> {
    state.controller.refresh_now().await;
    Json(state.controller.current())
}

/// Local what-if projection; never touches the backend.
pub async fn simulate(Json(input): Json<ScenarioInput>) -> Json<ScenarioResult> {
    Json(project(&input))
}

#[derive(Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

pub async fn traffic_metrics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Response {
    let city = selected_city(&state, query.city);
    proxy(state.api.fetch_traffic(&city).await)
}

pub async fn health_metrics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Response {
    let city = selected_city(&state, query.city);
    proxy(state.api.fetch_health(&city).await)
}

pub async fn agriculture_metrics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Response {
    let city = selected_city(&state, query.city);
    proxy(state.api.fetch_agriculture(&city).await)
}

#[derive(Deserialize)]
pub struct ZoneQuery {
    pub zone_id: Option<String>,
}

pub async fn correlation_matrix(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ZoneQuery>,
) -> Response {
    proxy(state.api.correlation_matrix(query.zone_id.as_deref()).await)
}

pub async fn correlation_insights(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ZoneQuery>,
) -> Response {
    proxy(
        state
            .api
            .correlation_insights(query.zone_id.as_deref())
            .await,
    )
}

#[derive(Deserialize)]
pub struct ImpactQuery {
    pub source_domain: String,
    pub target_domain: String,
    pub source_change: Option<f64>,
}

pub async fn correlation_impact(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImpactQuery>,
) -> Response {
    proxy(
        state
            .api
            .correlation_impact(
                &query.source_domain,
                &query.target_domain,
                query.source_change,
            )
            .await,
    )
}

#[derive(Deserialize, Default)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub zone_id: Option<String>,
}

pub async fn correlation_analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    proxy(
        state
            .api
            .trigger_correlation_analysis(request.zone_id.as_deref())
            .await,
    )
}

#[derive(Deserialize)]
pub struct RunScenarioRequest {
    pub scenario_name: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub target_zones: Option<Vec<String>>,
}

pub async fn run_scenario(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunScenarioRequest>,
) -> Response {
    proxy(
        state
            .api
            .run_scenario(&request.scenario_name, request.params, request.target_zones)
            .await,
    )
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn auth_login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    proxy(state.api.login(&request.username, &request.password).await)
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub async fn auth_register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Response {
    proxy(
        state
            .api
            .register(&request.username, &request.email, &request.password)
            .await,
    )
}

pub async fn auth_logout(State(state): State<Arc<AppState>>) -> Response {
    proxy(state.api.logout().await)
}

pub async fn auth_user(State(state): State<Arc<AppState>>) -> Response {
    proxy(state.api.current_user().await)
}

fn selected_city(state: &AppState, city: Option<String>) -> String {
    city.unwrap_or_else(|| state.controller.current().selected_city)
}

fn proxy(result: ApiResult<Value>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}
