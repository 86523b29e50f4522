use std::cmp::Ordering;

use super::allocation::{current_allocation, target_allocation, total_value};
use super::config::EngineConfig;
use super::error::EngineResult;
use super::types::{ActionKind, AssetClass, Holding, RebalanceAction, RebalanceReport, RiskProfile};

pub fn compute_rebalance(
    holdings: &[Holding],
    profile: RiskProfile,
    config: &EngineConfig,
) -> EngineResult<Vec<RebalanceAction>> {
    config.validate()?;
    let total = total_value(holdings)?;
    let current = current_allocation(holdings)?;
    let target = target_allocation(profile);
    let min_amount = config.rebalance_threshold * total;

    let mut actions: Vec<RebalanceAction> = AssetClass::ALL
        .iter()
        .filter_map(|&class| {
            let current_weight = current.weight(class);
            let target_weight = target.weight(class);
            let delta = (target_weight - current_weight) * total;
            if delta.abs() <= min_amount {
                return None;
            }
            let action = if delta > 0.0 {
                ActionKind::Buy
            } else {
                ActionKind::Sell
            };
            Some(RebalanceAction {
                asset_class: class,
                action,
                amount: delta.abs(),
                current_weight,
                target_weight,
                reason: describe(class, action, current_weight, target_weight),
            })
        })
        .collect();

    actions.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(Ordering::Equal)
            .then(a.asset_class.cmp(&b.asset_class))
    });
    Ok(actions)
}

pub fn rebalance_report(
    holdings: &[Holding],
    profile: RiskProfile,
    config: &EngineConfig,
) -> EngineResult<RebalanceReport> {
    let actions = compute_rebalance(holdings, profile, config)?;
    let overall = match actions.first() {
        None => ActionKind::Hold,
        Some(largest) => largest.action,
    };
    Ok(RebalanceReport {
        risk_profile: profile,
        total_value: total_value(holdings)?,
        overall,
        actions,
    })
}

fn describe(class: AssetClass, action: ActionKind, current: f64, target: f64) -> String {
    let verb = match action {
        ActionKind::Buy => "Buy",
        ActionKind::Sell => "Sell",
        ActionKind::Hold => "Hold",
    };
    format!(
        "{verb} {class} to reach target {:.0}% (current {:.0}%)",
        target * 100.0,
        current * 100.0
    )
}
