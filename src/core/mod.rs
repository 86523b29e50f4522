mod allocation;
mod config;
mod error;
mod goals;
mod projector;
mod rebalance;
mod scenarios;
mod simulation;
mod tvm;
mod types;

pub use allocation::{
    alignment_score, current_allocation, recommend_allocation, target_allocation, total_value,
};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, IncompleteData};
pub use goals::{evaluate_goal_status, goal_advice, months_between};
pub use projector::{project_timeline, project_timeline_with, value_at_month};
pub use rebalance::{compute_rebalance, rebalance_report};
pub use scenarios::{apply_overrides, generate_scenarios, run_what_if};
pub use simulation::Simulation;
pub use tvm::{
    future_value_of_annuity, future_value_of_lump_sum, monthly_rate_from_annual,
    required_payment_for_target,
};
pub use types::{
    ActionKind, Advice, AdvicePriority, Allocation, AllocationRecommendation, AssetClass, Goal,
    GoalClassification, GoalKind, GoalStatus, Granularity, Holding, MAX_HORIZON_YEARS, ProjectionInput,
    ProjectionOptions, ProjectionResult, RebalanceAction, RebalanceReport, RiskProfile,
    ScenarioSet, TimelinePoint, ValueMode, WhatIfOverrides, WhatIfResult,
};
