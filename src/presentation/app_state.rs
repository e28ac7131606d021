// Application state for HTTP handlers
use crate::application::city_api::CityApi;
use crate::application::city_state::CityStateController;
use std::sync::Arc;

pub struct AppState {
    pub controller: CityStateController,
    pub api: Arc<dyn CityApi>,
}
