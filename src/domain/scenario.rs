// What-if scenario projection model
//
// Linear prediction over a fixed 350-case baseline. Pure: identical input
// always yields an identical result, and nothing here touches the network
// (server-side scenario execution is a separate backend call).
use serde::{Deserialize, Serialize};

const BASELINE_CASES: f64 = 350.0;
const TIMELINE_DAYS: i32 = 10;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScenarioInput {
    /// Rainfall increase in percent; the sliders keep this in 0..=20.
    pub rainfall_pct: f64,
    /// Mosquito-control budget change in percent; negative means a cut.
    pub mosquito_budget_pct: f64,
    pub highway_closed: bool,
}

impl Default for ScenarioInput {
    fn default() -> Self {
        Self {
            rainfall_pct: 20.0,
            mosquito_budget_pct: -10.0,
            highway_closed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub day: i32,
    pub baseline: f64,
    pub simulated: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricImpact {
    pub prevention: String,
    pub scenario: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactMetrics {
    pub food_prices: MetricImpact,
    pub hospital_load: MetricImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub description: String,
    pub case_increase_pct: i64,
    pub timeline: Vec<TimelinePoint>,
    pub metrics: ImpactMetrics,
}

pub fn project(input: &ScenarioInput) -> ScenarioResult {
    let rainfall_impact = input.rainfall_pct / 100.0 * 200.0;
    let mosquito_impact = input.mosquito_budget_pct / 100.0 * -50.0;

    let predicted_cases = BASELINE_CASES + rainfall_impact + mosquito_impact;
    let case_increase_pct =
        ((predicted_cases - BASELINE_CASES) / BASELINE_CASES * 100.0).round() as i64;

    // The secondary metrics are keyed on the highway flag alone, not on the
    // numeric model.
    let (food_scenario, hospital_scenario) = if input.highway_closed {
        ("+1.10%", "+1.55%")
    } else {
        ("+2%", "+5%")
    };

    let timeline = (0..=TIMELINE_DAYS)
        .map(|day| {
            let baseline = 50.0 + f64::from(day) * 30.0;
            TimelinePoint {
                day,
                baseline,
                simulated: baseline + (rainfall_impact / 10.0) * f64::from(day),
            }
        })
        .collect();

    ScenarioResult {
        description: format!(
            "Increasing rainfall by {}% and reducing mosquito control by {}% is predicted to increase Dengue cases by {}% within 4 days.",
            input.rainfall_pct,
            input.mosquito_budget_pct.abs(),
            case_increase_pct
        ),
        case_increase_pct,
        timeline,
        metrics: ImpactMetrics {
            food_prices: MetricImpact {
                prevention: "+2% (+2%)".to_string(),
                scenario: format!("{} (-10%)", food_scenario),
            },
            hospital_load: MetricImpact {
                prevention: "+5% (+5%)".to_string(),
                scenario: format!("{} (-20%)", hospital_scenario),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_is_pure() {
        let input = ScenarioInput {
            rainfall_pct: 12.0,
            mosquito_budget_pct: 35.0,
            highway_closed: true,
        };
        assert_eq!(project(&input), project(&input));
    }

    #[test]
    fn test_timeline_shape() {
        let result = project(&ScenarioInput::default());
        assert_eq!(result.timeline.len(), 11);
        for (expected_day, point) in result.timeline.iter().enumerate() {
            assert_eq!(point.day, expected_day as i32);
            assert_eq!(point.baseline, 50.0 + expected_day as f64 * 30.0);
        }
    }

    #[test]
    fn test_zero_inputs_yield_zero_increase() {
        for highway_closed in [false, true] {
            let result = project(&ScenarioInput {
                rainfall_pct: 0.0,
                mosquito_budget_pct: 0.0,
                highway_closed,
            });
            assert_eq!(result.case_increase_pct, 0);
            // With no rainfall impact the simulated line sits on the baseline.
            for point in &result.timeline {
                assert_eq!(point.simulated, point.baseline);
            }
        }
    }

    #[test]
    fn test_default_scenario_projection() {
        // rainfall 20 -> impact 40, budget -10 -> impact 5, predicted 395.
        let result = project(&ScenarioInput::default());
        assert_eq!(result.case_increase_pct, 13);
        assert_eq!(result.timeline[1].baseline, 80.0);
        assert_eq!(result.timeline[1].simulated, 84.0);
        assert_eq!(result.timeline[10].simulated, 350.0 + 40.0);
        assert_eq!(result.metrics.food_prices.scenario, "+2% (-10%)");
        assert_eq!(result.metrics.hospital_load.scenario, "+5% (-20%)");
    }

    #[test]
    fn test_highway_flag_selects_scenario_deltas() {
        let input = ScenarioInput {
            highway_closed: true,
            ..ScenarioInput::default()
        };
        let result = project(&input);
        assert_eq!(result.metrics.food_prices.scenario, "+1.10% (-10%)");
        assert_eq!(result.metrics.hospital_load.scenario, "+1.55% (-20%)");
        assert_eq!(result.metrics.food_prices.prevention, "+2% (+2%)");
        assert_eq!(result.metrics.hospital_load.prevention, "+5% (+5%)");
    }
}
