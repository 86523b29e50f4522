use super::error::{EngineResult, IncompleteData, ensure_non_negative};
use super::types::{Allocation, AllocationRecommendation, AssetClass, Holding, RiskProfile};

const CONSERVATIVE_TARGETS: [(AssetClass, f64); 5] = [
    (AssetClass::Stocks, 0.20),
    (AssetClass::Bonds, 0.40),
    (AssetClass::Crypto, 0.05),
    (AssetClass::Etf, 0.25),
    (AssetClass::Cash, 0.10),
];

const MODERATE_TARGETS: [(AssetClass, f64); 5] = [
    (AssetClass::Stocks, 0.30),
    (AssetClass::Bonds, 0.15),
    (AssetClass::Crypto, 0.05),
    (AssetClass::Etf, 0.40),
    (AssetClass::Cash, 0.10),
];

const AGGRESSIVE_TARGETS: [(AssetClass, f64); 5] = [
    (AssetClass::Stocks, 0.60),
    (AssetClass::Bonds, 0.05),
    (AssetClass::Crypto, 0.20),
    (AssetClass::Etf, 0.15),
    (AssetClass::Cash, 0.00),
];

pub fn target_allocation(profile: RiskProfile) -> Allocation {
    let weights = match profile {
        RiskProfile::Conservative => &CONSERVATIVE_TARGETS,
        RiskProfile::Moderate => &MODERATE_TARGETS,
        RiskProfile::Aggressive => &AGGRESSIVE_TARGETS,
    };
    Allocation::from_weights(weights)
}

pub fn total_value(holdings: &[Holding]) -> EngineResult<f64> {
    holdings
        .iter()
        .try_fold(0.0, |acc, holding| -> EngineResult<f64> {
            Ok(acc + ensure_non_negative("market_value", holding.market_value)?)
        })
}

pub fn current_allocation(holdings: &[Holding]) -> EngineResult<Allocation> {
    let total = total_value(holdings)?;
    if total == 0.0 {
        return Ok(Allocation::zero());
    }

    let mut sums = [0.0; AssetClass::ALL.len()];
    for holding in holdings {
        sums[class_index(holding.asset_class)] += holding.market_value;
    }
    let weights: Vec<_> = AssetClass::ALL
        .iter()
        .zip(sums)
        .map(|(&class, value)| (class, value / total))
        .collect();
    Ok(Allocation::from_weights(&weights))
}

pub fn alignment_score(current: &Allocation, target: &Allocation) -> f64 {
    let distance: f64 = AssetClass::ALL
        .iter()
        .map(|&class| (current.weight(class) - target.weight(class)).abs())
        .sum();
    (100.0 - distance / 2.0 * 100.0).clamp(0.0, 100.0)
}

pub fn recommend_allocation(
    profile: RiskProfile,
    holdings: &[Holding],
) -> EngineResult<AllocationRecommendation> {
    let total_value = total_value(holdings)?;
    let current_allocation = current_allocation(holdings)?;
    let target_allocation = target_allocation(profile);
    let alignment_score = alignment_score(&current_allocation, &target_allocation);

    let target_values: Vec<_> = target_allocation
        .iter()
        .map(|(class, weight)| (class, weight * total_value))
        .collect();

    let mut warnings = Vec::new();
    if total_value == 0.0 {
        warnings.push(IncompleteData::ZeroPortfolioValue);
    }

    Ok(AllocationRecommendation {
        risk_profile: profile,
        total_value,
        current_allocation,
        target_allocation,
        target_values: Allocation::from_weights(&target_values),
        alignment_score,
        warnings,
    })
}

fn class_index(class: AssetClass) -> usize {
    match class {
        AssetClass::Stocks => 0,
        AssetClass::Bonds => 1,
        AssetClass::Crypto => 2,
        AssetClass::Etf => 3,
        AssetClass::Cash => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn every_profile_target_sums_to_one() {
        for profile in [
            RiskProfile::Conservative,
            RiskProfile::Moderate,
            RiskProfile::Aggressive,
        ] {
            let target = target_allocation(profile);
            assert!(
                (target.total() - 1.0).abs() <= 1e-9,
                "{profile:?} sums to {}",
                target.total()
            );
            assert!(target.iter().all(|(_, w)| (0.0..=1.0).contains(&w)));
        }
    }

    #[test]
    fn target_rows_list_every_class_once() {
        for row in [CONSERVATIVE_TARGETS, MODERATE_TARGETS, AGGRESSIVE_TARGETS] {
            let classes: Vec<AssetClass> = row.iter().map(|&(class, _)| class).collect();
            assert_eq!(classes, AssetClass::ALL.to_vec());
        }
        for (i, class) in AssetClass::ALL.into_iter().enumerate() {
            assert_eq!(class_index(class), i);
        }
    }

    #[test]
    fn current_allocation_aggregates_duplicate_classes() {
        let holdings = [
            Holding::new(AssetClass::Stocks, 30_000.0),
            Holding::new(AssetClass::Stocks, 10_000.0),
            Holding::new(AssetClass::Bonds, 60_000.0),
        ];
        let allocation = current_allocation(&holdings).expect("valid holdings");
        assert_approx(allocation.weight(AssetClass::Stocks), 0.4);
        assert_approx(allocation.weight(AssetClass::Bonds), 0.6);
        assert_approx(allocation.weight(AssetClass::Cash), 0.0);
    }

    #[test]
    fn empty_portfolio_yields_zero_allocation_and_warning() {
        let recommendation =
            recommend_allocation(RiskProfile::Moderate, &[]).expect("empty is not an error");
        assert_eq!(recommendation.current_allocation, Allocation::zero());
        assert_eq!(recommendation.total_value, 0.0);
        assert_eq!(recommendation.warnings, vec![IncompleteData::ZeroPortfolioValue]);
        assert_approx(recommendation.alignment_score, 50.0);
    }

    #[test]
    fn negative_market_value_is_rejected() {
        let holdings = [Holding::new(AssetClass::Cash, -5.0)];
        assert!(current_allocation(&holdings).is_err());
        let holdings = [Holding::new(AssetClass::Cash, f64::NAN)];
        assert!(recommend_allocation(RiskProfile::Moderate, &holdings).is_err());
    }

    #[test]
    fn alignment_is_perfect_for_matching_and_zero_for_disjoint() {
        let target = target_allocation(RiskProfile::Moderate);
        assert_approx(alignment_score(&target, &target), 100.0);

        let all_stocks = Allocation::from_weights(&[(AssetClass::Stocks, 1.0)]);
        let all_cash = Allocation::from_weights(&[(AssetClass::Cash, 1.0)]);
        assert_approx(alignment_score(&all_stocks, &all_cash), 0.0);
    }

    #[test]
    fn recommendation_scores_drifted_portfolio_and_prices_targets() {
        let holdings = [
            Holding::new(AssetClass::Stocks, 35_000.0),
            Holding::new(AssetClass::Bonds, 8_000.0),
            Holding::new(AssetClass::Crypto, 7_000.0),
            Holding::new(AssetClass::Etf, 40_000.0),
            Holding::new(AssetClass::Cash, 10_000.0),
        ];
        let recommendation =
            recommend_allocation(RiskProfile::Moderate, &holdings).expect("valid holdings");
        // |+5| + |-7| + |+2| = 14 points of L1 distance
        assert_approx(recommendation.alignment_score, 93.0);
        assert_approx(recommendation.total_value, 100_000.0);
        assert_approx(recommendation.target_values.weight(AssetClass::Bonds), 15_000.0);
        assert!(recommendation.warnings.is_empty());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_alignment_score_is_bounded(
            values in proptest::collection::vec(0.0f64..1_000_000.0, 5),
            aggressive in proptest::bool::ANY,
        ) {
            let holdings: Vec<_> = AssetClass::ALL
                .iter()
                .zip(&values)
                .map(|(&class, &value)| Holding::new(class, value))
                .collect();
            let profile = if aggressive { RiskProfile::Aggressive } else { RiskProfile::Conservative };
            let recommendation = recommend_allocation(profile, &holdings).expect("valid");
            prop_assert!((0.0..=100.0).contains(&recommendation.alignment_score));
            let total = recommendation.current_allocation.total();
            prop_assert!(total == 0.0 || (total - 1.0).abs() <= 1e-9);
        }
    }
}
