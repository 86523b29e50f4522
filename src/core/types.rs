use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{
    EngineError, EngineResult, IncompleteData, ensure_non_negative, ensure_rate,
};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Yearly,
    Monthly,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueMode {
    #[default]
    Nominal,
    Real,
}

pub const MAX_HORIZON_YEARS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInput {
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    pub annual_return_rate: f64,
    pub inflation_rate: f64,
    pub horizon_years: u32,
}

impl ProjectionInput {
    pub fn validate(&self) -> EngineResult<()> {
        ensure_non_negative("initial_amount", self.initial_amount)?;
        ensure_non_negative("monthly_contribution", self.monthly_contribution)?;
        ensure_rate("annual_return_rate", self.annual_return_rate)?;
        ensure_rate("inflation_rate", self.inflation_rate)?;
        if self.horizon_years == 0 {
            return Err(EngineError::domain("horizon_years", "must be > 0"));
        }
        if self.horizon_years > MAX_HORIZON_YEARS {
            return Err(EngineError::domain(
                "horizon_years",
                format!("must be <= {MAX_HORIZON_YEARS}"),
            ));
        }
        Ok(())
    }

    pub fn horizon_months(&self) -> EngineResult<u32> {
        self.horizon_years
            .checked_mul(12)
            .ok_or_else(|| EngineError::domain("horizon_years", "overflows a month count"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionOptions {
    pub granularity: Granularity,
    pub value_mode: ValueMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub period: u32,
    pub projected_value: f64,
    pub contributed_to_date: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub granularity: Granularity,
    pub value_mode: ValueMode,
    pub annual_return_rate: f64,
    pub timeline: Vec<TimelinePoint>,
    pub final_value: f64,
    pub total_contributed: f64,
    pub total_growth: f64,
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSet {
    pub spread: f64,
    pub pessimistic: ProjectionResult,
    pub expected: ProjectionResult,
    pub optimistic: ProjectionResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WhatIfOverrides {
    pub initial_amount: Option<f64>,
    pub monthly_contribution: Option<f64>,
    pub annual_return_rate: Option<f64>,
    pub inflation_rate: Option<f64>,
    pub horizon_years: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfResult {
    pub scenario_name: String,
    pub assumptions: ProjectionInput,
    pub baseline: ProjectionResult,
    pub adjusted: ProjectionResult,
    pub final_value_change: f64,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl FromStr for RiskProfile {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" | "low" => Ok(RiskProfile::Conservative),
            "moderate" | "medium" | "balanced" => Ok(RiskProfile::Moderate),
            "aggressive" | "high" => Ok(RiskProfile::Aggressive),
            other => Err(EngineError::domain(
                "risk_profile",
                format!("unknown profile '{other}'"),
            )),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Retirement,
    Home,
    Education,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: GoalKind,
    pub target_amount: f64,
    pub current_amount: f64,
    pub monthly_contribution: f64,
    pub deadline: NaiveDate,
    pub risk_profile: RiskProfile,
    #[serde(default)]
    pub expected_annual_return: Option<f64>,
}

impl Goal {
    pub fn validate(&self) -> EngineResult<()> {
        let target = ensure_non_negative("target_amount", self.target_amount)?;
        if target == 0.0 {
            return Err(EngineError::domain("target_amount", "must be > 0"));
        }
        ensure_non_negative("current_amount", self.current_amount)?;
        ensure_non_negative("monthly_contribution", self.monthly_contribution)?;
        if let Some(rate) = self.expected_annual_return {
            ensure_rate("expected_annual_return", rate)?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalClassification {
    OnTrack,
    AtRisk,
    Behind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStatus {
    pub classification: GoalClassification,
    pub progress_percent: f64,
    pub months_remaining: u32,
    pub days_remaining: i64,
    pub annual_return_rate: f64,
    pub projected_final_value: f64,
    pub shortfall: f64,
    pub surplus: f64,
    /// Extra monthly saving that closes the shortfall by the deadline.
    /// `None` when the deadline leaves no months to save in.
    pub required_monthly_contribution: Option<f64>,
    pub warnings: Vec<IncompleteData>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvicePriority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    pub title: &'static str,
    pub text: &'static str,
    pub priority: AdvicePriority,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    #[serde(alias = "stock", alias = "equity", alias = "equities")]
    Stocks,
    #[serde(alias = "bond", alias = "debt")]
    Bonds,
    #[serde(alias = "cryptocurrency")]
    Crypto,
    #[serde(alias = "etfs", alias = "mutual_fund", alias = "mutual-fund")]
    Etf,
    #[serde(alias = "savings")]
    Cash,
}

impl AssetClass {
    pub const ALL: [AssetClass; 5] = [
        AssetClass::Stocks,
        AssetClass::Bonds,
        AssetClass::Crypto,
        AssetClass::Etf,
        AssetClass::Cash,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AssetClass::Stocks => "stocks",
            AssetClass::Bonds => "bonds",
            AssetClass::Crypto => "crypto",
            AssetClass::Etf => "etf",
            AssetClass::Cash => "cash",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AssetClass {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stocks" | "stock" | "equity" | "equities" => Ok(AssetClass::Stocks),
            "bonds" | "bond" | "debt" => Ok(AssetClass::Bonds),
            "crypto" | "cryptocurrency" => Ok(AssetClass::Crypto),
            "etf" | "etfs" | "mutual_fund" | "mutual-fund" => Ok(AssetClass::Etf),
            "cash" | "savings" => Ok(AssetClass::Cash),
            other => Err(EngineError::domain(
                "asset_class",
                format!("unknown asset class '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub asset_class: AssetClass,
    pub market_value: f64,
}

impl Holding {
    pub fn new(asset_class: AssetClass, market_value: f64) -> Self {
        Self {
            asset_class,
            market_value,
        }
    }
}

/// Weight per asset class. Every class is present, missing ones at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation(BTreeMap<AssetClass, f64>);

impl Allocation {
    pub fn zero() -> Self {
        Self(AssetClass::ALL.iter().map(|&class| (class, 0.0)).collect())
    }

    pub fn from_weights(weights: &[(AssetClass, f64)]) -> Self {
        let mut allocation = Self::zero();
        for &(class, weight) in weights {
            allocation.0.insert(class, weight);
        }
        allocation
    }

    pub fn weight(&self, class: AssetClass) -> f64 {
        self.0.get(&class).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, f64)> + '_ {
        self.0.iter().map(|(&class, &weight)| (class, weight))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecommendation {
    pub risk_profile: RiskProfile,
    pub total_value: f64,
    pub current_allocation: Allocation,
    pub target_allocation: Allocation,
    pub target_values: Allocation,
    pub alignment_score: f64,
    pub warnings: Vec<IncompleteData>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceAction {
    pub asset_class: AssetClass,
    pub action: ActionKind,
    pub amount: f64,
    pub current_weight: f64,
    pub target_weight: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceReport {
    pub risk_profile: RiskProfile,
    pub total_value: f64,
    pub overall: ActionKind,
    pub actions: Vec<RebalanceAction>,
}
