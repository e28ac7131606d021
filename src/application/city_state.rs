// City selection state and the background poll lifecycle
use crate::application::city_api::CityApi;
use crate::domain::snapshot::DashboardSnapshot;
use crate::domain::zone::Zone;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    Loading,
    Ready,
    Refreshing,
    Error,
}

/// The shared view state. Published through a watch channel; the controller
/// is the only writer, views hold read handles.
#[derive(Debug, Clone, Serialize)]
pub struct CityState {
    pub phase: Phase,
    pub selected_city: String,
    pub zones: Vec<Zone>,
    pub snapshot: Option<DashboardSnapshot>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl CityState {
    fn initial(selected_city: String) -> Self {
        Self {
            phase: Phase::Init,
            selected_city,
            zones: Vec::new(),
            snapshot: None,
            loading: false,
            error: None,
            last_updated: None,
        }
    }
}

/// Single source of truth for the selected city and the latest known
/// dashboard data, with automatic background refresh.
///
/// At most one poll task is alive at any time: every city change aborts the
/// previous task before spawning the next, and teardown aborts the last one.
pub struct CityStateController {
    api: Arc<dyn CityApi>,
    poll_interval: Duration,
    state_tx: watch::Sender<CityState>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl CityStateController {
    pub fn new(
        api: Arc<dyn CityApi>,
        initial_city: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(CityState::initial(initial_city.into()));
        Self {
            api,
            poll_interval,
            state_tx,
            poll_task: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CityState> {
        self.state_tx.subscribe()
    }

    pub fn current(&self) -> CityState {
        self.state_tx.borrow().clone()
    }

    /// Runs once at startup: load the zone catalog, then start polling the
    /// configured initial city. A zone-list failure is logged and leaves the
    /// list empty; it never blocks the dashboard flow.
    pub async fn initialize(&self) {
        match self.api.fetch_zones().await {
            Ok(zones) => {
                tracing::debug!("loaded {} zones", zones.len());
                self.state_tx.send_modify(|state| state.zones = zones);
            }
            Err(err) => {
                tracing::warn!("failed to load zone catalog: {err}");
            }
        }

        let city = self.state_tx.borrow().selected_city.clone();
        self.begin_visible_load();
        self.restart_poll(city);
    }

    /// Select a new city and rebuild the poll loop around it.
    pub fn change_city(&self, city: impl Into<String>) {
        let city = city.into();
        tracing::debug!("city changed to {city}");
        self.state_tx.send_modify(|state| {
            state.selected_city = city.clone();
        });
        self.begin_visible_load();
        self.restart_poll(city);
    }

    /// Immediate fetch outside the timer cadence. Visible: toggles the
    /// loading flag and surfaces failures, unlike a background tick.
    pub async fn refresh_now(&self) {
        let city = self.state_tx.borrow().selected_city.clone();
        self.begin_visible_load();
        load_visible(self.api.as_ref(), &self.state_tx, &city).await;
    }

    pub fn shutdown(&self) {
        if let Some(task) = self.poll_task.lock().unwrap().take() {
            task.abort();
        }
    }

    fn begin_visible_load(&self) {
        self.state_tx.send_modify(|state| {
            state.phase = Phase::Loading;
            state.loading = true;
            state.error = None;
        });
    }

    fn restart_poll(&self, city: String) {
        let api = self.api.clone();
        let state_tx = self.state_tx.clone();
        let poll_interval = self.poll_interval;

        let mut guard = self.poll_task.lock().unwrap();
        if let Some(task) = guard.take() {
            task.abort();
        }
        *guard = Some(tokio::spawn(run_poll_loop(
            api,
            state_tx,
            city,
            poll_interval,
        )));
    }
}

impl Drop for CityStateController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_poll_loop(
    api: Arc<dyn CityApi>,
    state_tx: watch::Sender<CityState>,
    city: String,
    poll_interval: Duration,
) {
    load_visible(api.as_ref(), &state_tx, &city).await;

    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of an interval completes immediately; the initial load
    // above already covered it.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        background_tick(api.as_ref(), &state_tx, &city).await;
    }
}

/// Initial or manual load: failures surface as controller state, the last
/// good snapshot stays available.
async fn load_visible(api: &dyn CityApi, state_tx: &watch::Sender<CityState>, city: &str) {
    match api.fetch_dashboard(city).await {
        Ok(snapshot) => state_tx.send_modify(|state| {
            state.snapshot = Some(snapshot);
            state.phase = Phase::Ready;
            state.loading = false;
            state.error = None;
            state.last_updated = Some(Utc::now());
        }),
        Err(err) => {
            tracing::error!("dashboard load for {city} failed: {err}");
            state_tx.send_modify(|state| {
                state.phase = Phase::Error;
                state.loading = false;
                state.error = Some(err.to_string());
            });
        }
    }
}

/// Timer-triggered refresh. Failures are swallowed: the snapshot and any
/// previous error stay untouched, and the loading flag never toggles, so a
/// transient glitch cannot disrupt a working dashboard. The next attempt is
/// simply the next tick.
async fn background_tick(api: &dyn CityApi, state_tx: &watch::Sender<CityState>, city: &str) {
    let was_ready = state_tx.borrow().phase == Phase::Ready;
    if was_ready {
        state_tx.send_modify(|state| state.phase = Phase::Refreshing);
    }

    match api.fetch_dashboard(city).await {
        Ok(snapshot) => state_tx.send_modify(|state| {
            state.snapshot = Some(snapshot);
            state.phase = Phase::Ready;
            state.error = None;
            state.last_updated = Some(Utc::now());
        }),
        Err(err) => {
            tracing::warn!("background refresh for {city} failed: {err}");
            if was_ready {
                state_tx.send_modify(|state| state.phase = Phase::Ready);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::city_api::{ApiError, ApiResult};
    use crate::domain::snapshot::{
        AgricultureSummary, HealthSummary, TrafficSummary, WeatherSummary,
    };
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockApi {
        dashboard_calls: Mutex<HashMap<String, usize>>,
        fail_dashboard: AtomicBool,
        fail_zones: AtomicBool,
    }

    impl MockApi {
        fn new() -> Self {
            Self {
                dashboard_calls: Mutex::new(HashMap::new()),
                fail_dashboard: AtomicBool::new(false),
                fail_zones: AtomicBool::new(false),
            }
        }

        fn calls_for(&self, city: &str) -> usize {
            *self.dashboard_calls.lock().unwrap().get(city).unwrap_or(&0)
        }

        fn snapshot_for(city: &str) -> DashboardSnapshot {
            DashboardSnapshot {
                city_name: city.to_string(),
                traffic_summary: TrafficSummary::from_index(55.0),
                health_summary: HealthSummary::from_index(30.0),
                agriculture_summary: AgricultureSummary::from_index(45.0),
                weather_summary: WeatherSummary::from_index(20.0),
                alerts: Vec::new(),
                correlation_alerts: Vec::new(),
                fetched_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl CityApi for MockApi {
        async fn fetch_zones(&self) -> ApiResult<Vec<Zone>> {
            if self.fail_zones.load(Ordering::SeqCst) {
                return Err(ApiError::Connect("zone catalog offline".to_string()));
            }
            Ok(vec![
                Zone::new(
                    "Z01".to_string(),
                    "CBD / Downtown".to_string(),
                    "commercial".to_string(),
                ),
                Zone::new(
                    "Z02".to_string(),
                    "Residential North".to_string(),
                    "residential".to_string(),
                ),
            ])
        }

        async fn fetch_dashboard(&self, city: &str) -> ApiResult<DashboardSnapshot> {
            *self
                .dashboard_calls
                .lock()
                .unwrap()
                .entry(city.to_string())
                .or_insert(0) += 1;
            if self.fail_dashboard.load(Ordering::SeqCst) {
                return Err(ApiError::Connect("backend unreachable".to_string()));
            }
            Ok(Self::snapshot_for(city))
        }

        async fn fetch_traffic(&self, _city: &str) -> ApiResult<Value> {
            Ok(Value::Null)
        }
        async fn fetch_health(&self, _city: &str) -> ApiResult<Value> {
            Ok(Value::Null)
        }
        async fn fetch_agriculture(&self, _city: &str) -> ApiResult<Value> {
            Ok(Value::Null)
        }
        async fn correlation_matrix(&self, _zone_id: Option<&str>) -> ApiResult<Value> {
            Ok(Value::Null)
        }
        async fn correlation_insights(&self, _zone_id: Option<&str>) -> ApiResult<Value> {
            Ok(Value::Null)
        }
        async fn correlation_impact(
            &self,
            _source_domain: &str,
            _target_domain: &str,
            _source_change: Option<f64>,
        ) -> ApiResult<Value> {
            Ok(Value::Null)
        }
        async fn trigger_correlation_analysis(&self, _zone_id: Option<&str>) -> ApiResult<Value> {
            Ok(Value::Null)
        }
        async fn run_scenario(
            &self,
            _scenario_name: &str,
            _params: Value,
            _target_zones: Option<Vec<String>>,
        ) -> ApiResult<Value> {
            Ok(Value::Null)
        }
        async fn login(&self, _username: &str, _password: &str) -> ApiResult<Value> {
            Ok(Value::Null)
        }
        async fn register(
            &self,
            _username: &str,
            _email: &str,
            _password: &str,
        ) -> ApiResult<Value> {
            Ok(Value::Null)
        }
        async fn logout(&self) -> ApiResult<Value> {
            Ok(Value::Null)
        }
        async fn current_user(&self) -> ApiResult<Value> {
            Ok(Value::Null)
        }
    }

    async fn wait_for_phase(
        rx: &mut watch::Receiver<CityState>,
        phase: Phase,
    ) -> CityState {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.phase == phase))
            .await
            .expect("timed out waiting for phase")
            .expect("state channel closed")
            .clone()
    }

    #[tokio::test]
    async fn test_initialize_loads_zones_and_snapshot() {
        let api = Arc::new(MockApi::new());
        let controller =
            CityStateController::new(api.clone(), "Ahmedabad", Duration::from_millis(200));
        let mut rx = controller.subscribe();

        controller.initialize().await;
        let state = wait_for_phase(&mut rx, Phase::Ready).await;

        assert_eq!(state.selected_city, "Ahmedabad");
        assert_eq!(state.zones.len(), 2);
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(
            state.snapshot.as_ref().map(|s| s.city_name.as_str()),
            Some("Ahmedabad")
        );
        assert!(state.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_zone_list_failure_is_nonfatal() {
        let api = Arc::new(MockApi::new());
        api.fail_zones.store(true, Ordering::SeqCst);
        let controller =
            CityStateController::new(api.clone(), "Ahmedabad", Duration::from_millis(200));
        let mut rx = controller.subscribe();

        controller.initialize().await;
        let state = wait_for_phase(&mut rx, Phase::Ready).await;

        assert!(state.zones.is_empty());
        assert!(state.error.is_none());
        assert!(state.snapshot.is_some());
    }

    #[tokio::test]
    async fn test_change_city_leaves_single_poll_loop() {
        let api = Arc::new(MockApi::new());
        let controller =
            CityStateController::new(api.clone(), "Ahmedabad", Duration::from_millis(20));
        let mut rx = controller.subscribe();

        controller.change_city("Mumbai");
        controller.change_city("Pune");

        tokio::time::sleep(Duration::from_millis(120)).await;
        let state = wait_for_phase(&mut rx, Phase::Ready).await;
        assert_eq!(state.selected_city, "Pune");
        assert_eq!(
            state.snapshot.as_ref().map(|s| s.city_name.as_str()),
            Some("Pune")
        );

        // The Pune loop keeps ticking; the aborted Mumbai loop must not.
        assert!(api.calls_for("Pune") >= 2);
        let mumbai_calls = api.calls_for("Mumbai");
        assert!(mumbai_calls <= 1);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(api.calls_for("Mumbai"), mumbai_calls);
    }

    #[tokio::test]
    async fn test_background_failure_keeps_snapshot_and_error() {
        let api = Arc::new(MockApi::new());
        let controller =
            CityStateController::new(api.clone(), "Ahmedabad", Duration::from_millis(100));
        let mut rx = controller.subscribe();

        controller.initialize().await;
        let ready = wait_for_phase(&mut rx, Phase::Ready).await;
        let fetched_at = ready.snapshot.as_ref().map(|s| s.fetched_at);

        api.fail_dashboard.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(350)).await;

        let state = controller.current();
        assert!(api.calls_for("Ahmedabad") >= 2);
        assert_eq!(state.snapshot.as_ref().map(|s| s.fetched_at), fetched_at);
        assert!(state.error.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_manual_refresh_failure_sets_error_keeps_snapshot() {
        let api = Arc::new(MockApi::new());
        let controller =
            CityStateController::new(api.clone(), "Ahmedabad", Duration::from_secs(60));
        let mut rx = controller.subscribe();

        controller.initialize().await;
        let ready = wait_for_phase(&mut rx, Phase::Ready).await;
        let previous_snapshot = ready.snapshot.clone();

        api.fail_dashboard.store(true, Ordering::SeqCst);
        controller.refresh_now().await;

        let state = controller.current();
        assert_eq!(state.phase, Phase::Error);
        assert!(state.error.is_some());
        assert!(!state.loading);
        assert_eq!(state.snapshot, previous_snapshot);
    }

    #[tokio::test]
    async fn test_initial_load_failure_surfaces_error() {
        let api = Arc::new(MockApi::new());
        api.fail_dashboard.store(true, Ordering::SeqCst);
        let controller =
            CityStateController::new(api.clone(), "Ahmedabad", Duration::from_secs(60));
        let mut rx = controller.subscribe();

        controller.initialize().await;
        let state = wait_for_phase(&mut rx, Phase::Error).await;

        assert!(state.error.is_some());
        assert!(state.snapshot.is_none());
        assert!(!state.loading);
    }
}
