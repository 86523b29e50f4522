use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::error::EngineResult;
use super::projector::project_timeline_with;
use super::types::{ProjectionInput, ProjectionOptions, ProjectionResult, TimelinePoint};

const REPLAY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    pub assumptions: ProjectionInput,
    #[serde(default)]
    pub options: ProjectionOptions,
    pub results: ProjectionResult,
}

impl Simulation {
    pub fn run(
        assumptions: ProjectionInput,
        options: ProjectionOptions,
        config: &EngineConfig,
    ) -> EngineResult<Self> {
        let results = project_timeline_with(&assumptions, options, config)?;
        Ok(Self {
            assumptions,
            options,
            results,
        })
    }

    pub fn replay(&self, config: &EngineConfig) -> EngineResult<ProjectionResult> {
        project_timeline_with(&self.assumptions, self.options, config)
    }

    pub fn verify(&self, config: &EngineConfig) -> EngineResult<bool> {
        let replayed = self.replay(config)?;
        let stored = &self.results;

        let header_matches = stored.granularity == replayed.granularity
            && stored.value_mode == replayed.value_mode
            && stored.timeline.len() == replayed.timeline.len()
            && close(stored.annual_return_rate, replayed.annual_return_rate)
            && scores_match(stored.confidence_score, replayed.confidence_score)
            && close(stored.final_value, replayed.final_value)
            && close(stored.total_contributed, replayed.total_contributed)
            && close(stored.total_growth, replayed.total_growth);
        if !header_matches {
            return Ok(false);
        }

        Ok(stored
            .timeline
            .iter()
            .zip(&replayed.timeline)
            .all(|(a, b)| points_match(a, b)))
    }
}

fn points_match(a: &TimelinePoint, b: &TimelinePoint) -> bool {
    a.period == b.period
        && close(a.projected_value, b.projected_value)
        && close(a.contributed_to_date, b.contributed_to_date)
}

fn scores_match(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => close(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= REPLAY_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Granularity, ValueMode};

    fn sample_simulation() -> Simulation {
        Simulation::run(
            ProjectionInput {
                initial_amount: 5_000.0,
                monthly_contribution: 300.0,
                annual_return_rate: 0.065,
                inflation_rate: 0.02,
                horizon_years: 12,
            },
            ProjectionOptions {
                granularity: Granularity::Monthly,
                value_mode: ValueMode::Real,
            },
            &EngineConfig::default(),
        )
        .expect("valid simulation")
    }

    #[test]
    fn stored_record_survives_json_round_trip_and_replays() {
        let simulation = sample_simulation();
        let json = serde_json::to_string(&simulation).expect("serialize");
        let restored: Simulation = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored, simulation);
        assert!(restored.verify(&EngineConfig::default()).expect("valid"));
    }

    #[test]
    fn tampered_results_fail_verification() {
        let mut simulation = sample_simulation();
        simulation.results.timeline[10].projected_value += 1.0;
        assert!(!simulation.verify(&EngineConfig::default()).expect("valid"));

        let mut simulation = sample_simulation();
        simulation.results.timeline.pop();
        assert!(!simulation.verify(&EngineConfig::default()).expect("valid"));
    }

    #[test]
    fn tampered_rate_or_score_fails_verification() {
        let config = EngineConfig::default();

        let mut simulation = sample_simulation();
        simulation.results.annual_return_rate = 0.09;
        assert!(!simulation.verify(&config).expect("valid"));

        let mut simulation = sample_simulation();
        simulation.results.confidence_score = Some(99.0);
        assert!(!simulation.verify(&config).expect("valid"));

        let mut simulation = sample_simulation();
        simulation.results.confidence_score = None;
        assert!(!simulation.verify(&config).expect("valid"));
    }

    #[test]
    fn record_without_options_defaults_to_yearly_nominal() {
        let json = r#"{
          "assumptions": {
            "initialAmount": 1000,
            "monthlyContribution": 0,
            "annualReturnRate": 0,
            "inflationRate": 0,
            "horizonYears": 1
          },
          "results": {
            "granularity": "yearly",
            "valueMode": "nominal",
            "annualReturnRate": 0,
            "timeline": [{"period": 1, "projectedValue": 1000, "contributedToDate": 1000}],
            "finalValue": 1000,
            "totalContributed": 1000,
            "totalGrowth": 0,
            "confidenceScore": 85
          }
        }"#;
        let simulation: Simulation = serde_json::from_str(json).expect("valid record");
        assert_eq!(simulation.options, ProjectionOptions::default());
        assert!(simulation.verify(&EngineConfig::default()).expect("valid"));
    }
}
