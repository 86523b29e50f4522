use chrono::{Datelike, NaiveDate};
use log::debug;

use super::config::EngineConfig;
use super::error::{EngineResult, IncompleteData};
use super::projector::value_at_month;
use super::tvm::{monthly_rate_from_annual, required_payment_for_target};
use super::types::{
    Advice, AdvicePriority, Goal, GoalClassification, GoalKind, GoalStatus, RiskProfile,
};

pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let mut months = i64::from(to.year() - from.year()) * 12 + i64::from(to.month())
        - i64::from(from.month());
    if to >= from {
        if to.day() < from.day() {
            months -= 1;
        }
    } else if to.day() > from.day() {
        months += 1;
    }
    months
}

pub fn evaluate_goal_status(
    goal: &Goal,
    today: NaiveDate,
    config: &EngineConfig,
) -> EngineResult<GoalStatus> {
    goal.validate()?;
    config.validate()?;

    let progress_percent = (goal.current_amount / goal.target_amount * 100.0).min(100.0);
    let days_remaining = (goal.deadline - today).num_days().max(0);
    let months_remaining = u32::try_from(months_between(today, goal.deadline).max(0))
        .unwrap_or(u32::MAX);

    let classification = classify(goal, progress_percent, days_remaining, config);

    let annual_return_rate = goal
        .expected_annual_return
        .unwrap_or_else(|| config.expected_return(goal.risk_profile));
    let monthly_rate = monthly_rate_from_annual(annual_return_rate)?;

    let projected_final_value = if months_remaining == 0 {
        goal.current_amount
    } else {
        value_at_month(
            goal.current_amount,
            goal.monthly_contribution,
            monthly_rate,
            months_remaining,
        )?
    };
    let shortfall = (goal.target_amount - projected_final_value).max(0.0);
    let surplus = (projected_final_value - goal.target_amount).max(0.0);

    let mut warnings = Vec::new();
    let required_monthly_contribution = if months_remaining == 0 {
        warnings.push(IncompleteData::ZeroMonthsRemaining);
        None
    } else {
        Some(required_payment_for_target(
            shortfall,
            monthly_rate,
            f64::from(months_remaining),
        )?)
    };

    debug!(
        "goal {:?}: {:?} at {:.1}% with {} months left, shortfall {:.2}",
        goal.name, classification, progress_percent, months_remaining, shortfall
    );

    Ok(GoalStatus {
        classification,
        progress_percent,
        months_remaining,
        days_remaining,
        annual_return_rate,
        projected_final_value,
        shortfall,
        surplus,
        required_monthly_contribution,
        warnings,
    })
}

fn classify(
    goal: &Goal,
    progress_percent: f64,
    days_remaining: i64,
    config: &EngineConfig,
) -> GoalClassification {
    if progress_percent >= config.on_track_percent || goal.current_amount >= goal.target_amount {
        GoalClassification::OnTrack
    } else if progress_percent >= config.at_risk_percent
        && days_remaining <= config.near_deadline_days
    {
        GoalClassification::AtRisk
    } else {
        GoalClassification::Behind
    }
}

pub fn goal_advice(goal: &Goal, months_remaining: u32) -> Vec<Advice> {
    let mut advice = Vec::new();

    match goal.kind {
        GoalKind::Retirement if months_remaining > 240 => advice.push(Advice {
            title: "Long-term Growth Strategy",
            text: "With over 20 years until retirement, a more growth-oriented allocation can maximize long-run returns.",
            priority: AdvicePriority::High,
        }),
        GoalKind::Retirement if months_remaining < 60 => advice.push(Advice {
            title: "Capital Preservation",
            text: "With less than 5 years until retirement, shifting toward conservative holdings protects accumulated capital.",
            priority: AdvicePriority::High,
        }),
        GoalKind::Home if months_remaining < 24 => advice.push(Advice {
            title: "Short-term Savings",
            text: "For a home purchase within 2 years, favour low-risk holdings such as high-yield savings or short-term bonds.",
            priority: AdvicePriority::High,
        }),
        GoalKind::Education => advice.push(Advice {
            title: "Education Savings Strategy",
            text: "Education-focused accounts can offer tax advantages for this goal.",
            priority: AdvicePriority::Medium,
        }),
        _ => {}
    }

    match goal.risk_profile {
        RiskProfile::Conservative => advice.push(Advice {
            title: "Conservative Portfolio",
            text: "A conservative profile points toward bonds and stable dividend-paying stocks.",
            priority: AdvicePriority::Medium,
        }),
        RiskProfile::Aggressive => advice.push(Advice {
            title: "Growth Opportunities",
            text: "An aggressive profile leaves room for growth stocks and sector ETFs.",
            priority: AdvicePriority::Medium,
        }),
        RiskProfile::Moderate => {}
    }

    advice
}
