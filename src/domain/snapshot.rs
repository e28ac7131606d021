// Dashboard snapshot domain model
//
// The backend reports 0-100 indices per concern; the thresholds below turn
// them into the levels the overview cards display.
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    #[serde(rename = "No Data")]
    Unknown,
}

impl RiskLevel {
    pub fn from_index(value: f64) -> Self {
        if value > 70.0 {
            RiskLevel::High
        } else if value > 40.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "green",
            RiskLevel::Moderate => "yellow",
            RiskLevel::High => "red",
            RiskLevel::Unknown => "gray",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FoodStatus {
    Normal,
    Elevated,
    Critical,
    #[serde(rename = "No Data")]
    Unknown,
}

impl FoodStatus {
    pub fn from_index(value: f64) -> Self {
        if value > 70.0 {
            FoodStatus::Critical
        } else if value > 40.0 {
            FoodStatus::Elevated
        } else {
            FoodStatus::Normal
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            FoodStatus::Normal => "green",
            FoodStatus::Elevated => "yellow",
            FoodStatus::Critical => "red",
            FoodStatus::Unknown => "gray",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeatherAlert {
    Normal,
    Moderate,
    #[serde(rename = "Heat Alert")]
    HeatAlert,
    #[serde(rename = "No Data")]
    Unknown,
}

impl WeatherAlert {
    pub fn from_index(value: f64) -> Self {
        if value > 70.0 {
            WeatherAlert::HeatAlert
        } else if value > 40.0 {
            WeatherAlert::Moderate
        } else {
            WeatherAlert::Normal
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            WeatherAlert::Normal => "green",
            WeatherAlert::Moderate => "yellow",
            WeatherAlert::HeatAlert => "red",
            WeatherAlert::Unknown => "gray",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSummary {
    pub level: RiskLevel,
    pub percentage: u32,
}

impl TrafficSummary {
    pub fn from_index(congestion_index: f64) -> Self {
        Self {
            level: RiskLevel::from_index(congestion_index),
            percentage: congestion_index.round().max(0.0) as u32,
        }
    }

    fn unknown() -> Self {
        Self {
            level: RiskLevel::Unknown,
            percentage: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSummary {
    pub dengue_risk: RiskLevel,
    pub color: &'static str,
}

impl HealthSummary {
    pub fn from_index(health_risk: f64) -> Self {
        let dengue_risk = RiskLevel::from_index(health_risk);
        Self {
            dengue_risk,
            color: dengue_risk.color(),
        }
    }

    fn unknown() -> Self {
        Self {
            dengue_risk: RiskLevel::Unknown,
            color: RiskLevel::Unknown.color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgricultureSummary {
    pub status: FoodStatus,
    pub change: String,
    pub color: &'static str,
}

impl AgricultureSummary {
    pub fn from_index(food_stress: f64) -> Self {
        let status = FoodStatus::from_index(food_stress);
        Self {
            status,
            change: format!("{}%", food_stress.round()),
            color: status.color(),
        }
    }

    fn unknown() -> Self {
        Self {
            status: FoodStatus::Unknown,
            change: "0%".to_string(),
            color: FoodStatus::Unknown.color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub alert: WeatherAlert,
    pub color: &'static str,
}

impl WeatherSummary {
    pub fn from_index(heat_risk: f64) -> Self {
        let alert = WeatherAlert::from_index(heat_risk);
        Self {
            alert,
            color: alert.color(),
        }
    }

    fn unknown() -> Self {
        Self {
            alert: WeatherAlert::Unknown,
            color: WeatherAlert::Unknown.color(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub zone_id: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub value: f64,
}

impl Alert {
    pub fn from_health_risk(zone_id: String, health_risk: f64) -> Self {
        let severity = if health_risk > 70.0 {
            AlertSeverity::High
        } else {
            AlertSeverity::Medium
        };
        let message = format!("Health risk elevated in {}", zone_id);
        Self {
            zone_id,
            severity,
            message,
            value: health_risk,
        }
    }
}

/// Latest full dashboard data for the selected city. Replaced wholesale on
/// every successful fetch; never mutated by consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub city_name: String,
    pub traffic_summary: TrafficSummary,
    pub health_summary: HealthSummary,
    pub agriculture_summary: AgricultureSummary,
    pub weather_summary: WeatherSummary,
    pub alerts: Vec<Alert>,
    pub correlation_alerts: Vec<serde_json::Value>,
    pub fetched_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// Neutral snapshot for the `no_metrics_yet` sentinel: every level reads
    /// "No Data", no alerts.
    pub fn empty(city_name: &str) -> Self {
        Self {
            city_name: city_name.to_string(),
            traffic_summary: TrafficSummary::unknown(),
            health_summary: HealthSummary::unknown(),
            agriculture_summary: AgricultureSummary::unknown(),
            weather_summary: WeatherSummary::unknown(),
            alerts: Vec::new(),
            correlation_alerts: Vec::new(),
            fetched_at: Utc::now(),
        }
    }
}
