use super::config::EngineConfig;
use super::error::EngineResult;
use super::tvm::{future_value_of_annuity, future_value_of_lump_sum, monthly_rate_from_annual};
use super::types::{
    Granularity, ProjectionInput, ProjectionOptions, ProjectionResult, TimelinePoint, ValueMode,
};

pub fn project_timeline(input: &ProjectionInput) -> EngineResult<ProjectionResult> {
    project_timeline_with(input, ProjectionOptions::default(), &EngineConfig::default())
}

pub fn project_timeline_with(
    input: &ProjectionInput,
    options: ProjectionOptions,
    config: &EngineConfig,
) -> EngineResult<ProjectionResult> {
    let mut result = build_projection(input, options)?;
    result.confidence_score = Some(config.confidence_score);
    Ok(result)
}

pub(crate) fn build_projection(
    input: &ProjectionInput,
    options: ProjectionOptions,
) -> EngineResult<ProjectionResult> {
    input.validate()?;
    let monthly_rate = monthly_rate_from_annual(input.annual_return_rate)?;

    let (periods, months_per_period) = match options.granularity {
        Granularity::Yearly => (input.horizon_years, 12),
        Granularity::Monthly => (input.horizon_months()?, 1),
    };

    let mut timeline = Vec::with_capacity(periods as usize);
    for period in 1..=periods {
        let months = period * months_per_period;
        let nominal = value_at_month(
            input.initial_amount,
            input.monthly_contribution,
            monthly_rate,
            months,
        )?;
        let projected_value = match options.value_mode {
            ValueMode::Nominal => nominal,
            ValueMode::Real => deflate(nominal, input.inflation_rate, months),
        };
        timeline.push(TimelinePoint {
            period,
            projected_value,
            contributed_to_date: contributed_after(input, months),
        });
    }

    let (final_value, total_contributed) = timeline
        .last()
        .map(|p| (p.projected_value, p.contributed_to_date))
        .unwrap_or((input.initial_amount, input.initial_amount));

    Ok(ProjectionResult {
        granularity: options.granularity,
        value_mode: options.value_mode,
        annual_return_rate: input.annual_return_rate,
        timeline,
        final_value,
        total_contributed,
        total_growth: final_value - total_contributed,
        confidence_score: None,
    })
}

pub fn value_at_month(
    initial_amount: f64,
    monthly_contribution: f64,
    monthly_rate: f64,
    months: u32,
) -> EngineResult<f64> {
    let periods = f64::from(months);
    let principal = future_value_of_lump_sum(initial_amount, monthly_rate, periods)?;
    let contributions = future_value_of_annuity(monthly_contribution, monthly_rate, periods)?;
    Ok(principal + contributions)
}

fn contributed_after(input: &ProjectionInput, months: u32) -> f64 {
    input.initial_amount + input.monthly_contribution * f64::from(months)
}

fn deflate(value: f64, inflation_rate: f64, months: u32) -> f64 {
    value / (1.0 + inflation_rate).powf(f64::from(months) / 12.0)
}
