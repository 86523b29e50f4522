use super::config::EngineConfig;
use super::error::{EngineError, EngineResult};
use super::projector::{build_projection, project_timeline_with};
use super::types::{
    ProjectionInput, ProjectionOptions, ScenarioSet, WhatIfOverrides, WhatIfResult,
};

pub fn generate_scenarios(
    input: &ProjectionInput,
    options: ProjectionOptions,
    config: &EngineConfig,
) -> EngineResult<ScenarioSet> {
    input.validate()?;
    let spread = config.scenario_spread;
    if !spread.is_finite() || spread < 0.0 {
        return Err(EngineError::domain("scenario_spread", "must be >= 0"));
    }

    let pessimistic = build_projection(
        &ProjectionInput {
            annual_return_rate: input.annual_return_rate - spread,
            ..*input
        },
        options,
    )?;
    let expected = project_timeline_with(input, options, config)?;
    let optimistic = build_projection(
        &ProjectionInput {
            annual_return_rate: input.annual_return_rate + spread,
            ..*input
        },
        options,
    )?;

    Ok(ScenarioSet {
        spread,
        pessimistic,
        expected,
        optimistic,
    })
}

pub fn apply_overrides(base: &ProjectionInput, overrides: &WhatIfOverrides) -> ProjectionInput {
    ProjectionInput {
        initial_amount: overrides.initial_amount.unwrap_or(base.initial_amount),
        monthly_contribution: overrides
            .monthly_contribution
            .unwrap_or(base.monthly_contribution),
        annual_return_rate: overrides
            .annual_return_rate
            .unwrap_or(base.annual_return_rate),
        inflation_rate: overrides.inflation_rate.unwrap_or(base.inflation_rate),
        horizon_years: overrides.horizon_years.unwrap_or(base.horizon_years),
    }
}

pub fn run_what_if(
    scenario_name: &str,
    base: &ProjectionInput,
    overrides: &WhatIfOverrides,
    options: ProjectionOptions,
    config: &EngineConfig,
) -> EngineResult<WhatIfResult> {
    let assumptions = apply_overrides(base, overrides);
    let baseline = project_timeline_with(base, options, config)?;
    let adjusted = project_timeline_with(&assumptions, options, config)?;
    let final_value_change = adjusted.final_value - baseline.final_value;

    Ok(WhatIfResult {
        scenario_name: scenario_name.to_string(),
        assumptions,
        baseline,
        adjusted,
        final_value_change,
    })
}
