use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("{field} {reason}")]
    Domain { field: &'static str, reason: String },
}

impl EngineError {
    pub fn domain(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::Domain {
            field,
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncompleteData {
    ZeroMonthsRemaining,
    ZeroPortfolioValue,
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::domain(field, "must be a finite number"))
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> EngineResult<f64> {
    let value = ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(EngineError::domain(field, "must be >= 0"));
    }
    Ok(value)
}

pub(crate) fn ensure_rate(field: &'static str, value: f64) -> EngineResult<f64> {
    let value = ensure_finite(field, value)?;
    if value <= -1.0 {
        return Err(EngineError::domain(field, "must be > -100%"));
    }
    Ok(value)
}
