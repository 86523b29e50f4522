use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult, ensure_rate};
use super::types::RiskProfile;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub scenario_spread: f64,
    pub confidence_score: f64,
    pub rebalance_threshold: f64,
    pub on_track_percent: f64,
    pub at_risk_percent: f64,
    pub near_deadline_days: i64,
    pub conservative_return: f64,
    pub moderate_return: f64,
    pub aggressive_return: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scenario_spread: 0.03,
            confidence_score: 85.0,
            rebalance_threshold: 0.01,
            on_track_percent: 70.0,
            at_risk_percent: 30.0,
            near_deadline_days: 60,
            conservative_return: 0.05,
            moderate_return: 0.07,
            aggressive_return: 0.10,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if !self.scenario_spread.is_finite() || self.scenario_spread < 0.0 {
            return Err(EngineError::domain("scenario_spread", "must be >= 0"));
        }
        if !(0.0..=100.0).contains(&self.confidence_score) {
            return Err(EngineError::domain(
                "confidence_score",
                "must be between 0 and 100",
            ));
        }
        if !(0.0..1.0).contains(&self.rebalance_threshold) {
            return Err(EngineError::domain(
                "rebalance_threshold",
                "must be in [0, 1)",
            ));
        }
        if !(0.0..=100.0).contains(&self.at_risk_percent)
            || !(0.0..=100.0).contains(&self.on_track_percent)
        {
            return Err(EngineError::domain(
                "goal thresholds",
                "must be between 0 and 100",
            ));
        }
        if self.at_risk_percent > self.on_track_percent {
            return Err(EngineError::domain(
                "at_risk_percent",
                "cannot exceed on_track_percent",
            ));
        }
        if self.near_deadline_days < 0 {
            return Err(EngineError::domain("near_deadline_days", "must be >= 0"));
        }
        ensure_rate("conservative_return", self.conservative_return)?;
        ensure_rate("moderate_return", self.moderate_return)?;
        ensure_rate("aggressive_return", self.aggressive_return)?;
        Ok(())
    }

    pub fn expected_return(&self, profile: RiskProfile) -> f64 {
        match profile {
            RiskProfile::Conservative => self.conservative_return,
            RiskProfile::Moderate => self.moderate_return,
            RiskProfile::Aggressive => self.aggressive_return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        EngineConfig::default().validate().expect("defaults must validate");
    }

    #[test]
    fn rejects_negative_spread() {
        let config = EngineConfig {
            scenario_spread: -0.01,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_goal_thresholds() {
        let config = EngineConfig {
            at_risk_percent: 80.0,
            on_track_percent: 70.0,
            ..EngineConfig::default()
        };
        let err = config.validate().expect_err("must reject");
        assert!(err.to_string().contains("at_risk_percent"));
    }

    #[test]
    fn expected_return_rises_with_risk() {
        let config = EngineConfig::default();
        assert!(
            config.expected_return(RiskProfile::Conservative)
                < config.expected_return(RiskProfile::Moderate)
        );
        assert!(
            config.expected_return(RiskProfile::Moderate)
                < config.expected_return(RiskProfile::Aggressive)
        );
    }
}
