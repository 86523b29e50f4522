use super::error::{EngineError, EngineResult, ensure_finite, ensure_rate};

const MONTHS_PER_YEAR: f64 = 12.0;

fn ensure_periods(periods: f64) -> EngineResult<f64> {
    let periods = ensure_finite("periods", periods)?;
    if periods < 0.0 {
        return Err(EngineError::domain("periods", "must be >= 0"));
    }
    Ok(periods)
}

pub fn monthly_rate_from_annual(annual_rate: f64) -> EngineResult<f64> {
    let annual_rate = ensure_rate("annual_rate", annual_rate)?;
    Ok((1.0 + annual_rate).powf(1.0 / MONTHS_PER_YEAR) - 1.0)
}

pub fn future_value_of_lump_sum(
    principal: f64,
    periodic_rate: f64,
    periods: f64,
) -> EngineResult<f64> {
    let principal = ensure_finite("principal", principal)?;
    let rate = ensure_rate("periodic_rate", periodic_rate)?;
    let periods = ensure_periods(periods)?;
    Ok(principal * (1.0 + rate).powf(periods))
}

pub fn future_value_of_annuity(
    payment: f64,
    periodic_rate: f64,
    periods: f64,
) -> EngineResult<f64> {
    let payment = ensure_finite("payment", payment)?;
    let rate = ensure_rate("periodic_rate", periodic_rate)?;
    let periods = ensure_periods(periods)?;
    Ok(payment * annuity_due_factor(rate, periods))
}

pub fn required_payment_for_target(
    target_future_value: f64,
    periodic_rate: f64,
    periods: f64,
) -> EngineResult<f64> {
    let target = ensure_finite("target_future_value", target_future_value)?;
    let rate = ensure_rate("periodic_rate", periodic_rate)?;
    let periods = ensure_finite("periods", periods)?;
    if periods <= 0.0 {
        return Err(EngineError::domain("periods", "must be > 0"));
    }
    Ok(target / annuity_due_factor(rate, periods))
}

// Each payment lands at the start of its period.
fn annuity_due_factor(rate: f64, periods: f64) -> f64 {
    if rate == 0.0 {
        return periods;
    }
    let growth = (1.0 + rate).powf(periods);
    ((growth - 1.0) / rate) * (1.0 + rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn monthly_rate_compounds_back_to_annual() {
        let monthly = monthly_rate_from_annual(0.08).expect("valid rate");
        assert_approx((1.0 + monthly).powi(12) - 1.0, 0.08);
        assert!(monthly < 0.08 / 12.0);
    }

    #[test]
    fn zero_rate_annuity_is_linear() {
        assert_approx(
            future_value_of_annuity(250.0, 0.0, 36.0).expect("valid"),
            9_000.0,
        );
        assert_approx(
            required_payment_for_target(9_000.0, 0.0, 36.0).expect("valid"),
            250.0,
        );
    }

    #[test]
    fn annuity_due_single_period_compounds_once() {
        let value = future_value_of_annuity(100.0, 0.01, 1.0).expect("valid");
        assert_approx(value, 101.0);
    }

    #[test]
    fn lump_sum_matches_hand_calculation() {
        let value = future_value_of_lump_sum(1_000.0, 0.05, 2.0).expect("valid");
        assert_approx(value, 1_102.5);
    }

    #[test]
    fn zero_periods_leave_values_unchanged() {
        assert_approx(future_value_of_lump_sum(500.0, 0.02, 0.0).expect("valid"), 500.0);
        assert_approx(future_value_of_annuity(500.0, 0.02, 0.0).expect("valid"), 0.0);
    }

    #[test]
    fn inverse_rejects_non_positive_periods() {
        assert!(required_payment_for_target(1_000.0, 0.01, 0.0).is_err());
        assert!(required_payment_for_target(1_000.0, 0.01, -3.0).is_err());
    }

    #[test]
    fn primitives_reject_nan_and_negative_periods() {
        assert!(future_value_of_lump_sum(f64::NAN, 0.01, 12.0).is_err());
        assert!(future_value_of_annuity(100.0, f64::NAN, 12.0).is_err());
        assert!(future_value_of_annuity(100.0, 0.01, -1.0).is_err());
        assert!(future_value_of_lump_sum(100.0, -1.0, 12.0).is_err());
        assert!(monthly_rate_from_annual(f64::INFINITY).is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_required_payment_inverts_annuity(
            shortfall in 1.0f64..5_000_000.0,
            annual in -0.5f64..0.3,
            months in 1u32..600,
        ) {
            let rate = monthly_rate_from_annual(annual).expect("valid rate");
            let payment = required_payment_for_target(shortfall, rate, f64::from(months))
                .expect("valid inverse");
            let rebuilt = future_value_of_annuity(payment, rate, f64::from(months))
                .expect("valid annuity");
            prop_assert!(((rebuilt - shortfall) / shortfall).abs() <= 1e-6);
        }

        #[test]
        fn prop_annuity_grows_with_rate(
            payment in 1.0f64..10_000.0,
            rate in 0.0f64..0.02,
            months in 1u32..480,
        ) {
            let flat = future_value_of_annuity(payment, 0.0, f64::from(months)).expect("valid");
            let grown = future_value_of_annuity(payment, rate, f64::from(months)).expect("valid");
            prop_assert!(grown + 1e-9 >= flat);
        }
    }
}
