//! Kani proofs for the boost curves
//!
//! - **B1: Linear Bounds** - 1.0 <= boost <= max_boost for valid linear coefficients
//! - **B2: Zero Identity** - zero locked or zero staked gives exactly 1.0
//! - **B3: Linear Monotone** - more locked balance never lowers the linear boost
//! - **B4: Ratio-Power Bounds** - 1.0 <= boost <= max_boost for valid ratio-power
//!   coefficients with a whole exponent (fractional exponents go through Newton
//!   square roots and are covered by the property suite instead)

#[cfg(kani)]
mod kani_proofs {
    use reward_model::fixed::SCALE;
    use reward_model::{BoostCurve, LinearCoefficients, RatioPowerCoefficients};

    fn any_linear() -> BoostCurve {
        let min_boost: u128 = kani::any();
        let extra: u128 = kani::any();
        let ratio_at_max: u128 = kani::any();

        kani::assume(min_boost >= SCALE && min_boost <= 2 * SCALE);
        kani::assume(extra <= 4 * SCALE);
        kani::assume(ratio_at_max > 0 && ratio_at_max <= 10 * SCALE);

        BoostCurve::Linear(LinearCoefficients {
            min_boost,
            max_boost: min_boost + extra,
            ratio_at_max,
        })
    }

    fn any_ratio_power() -> BoostCurve {
        let min_boost: u128 = kani::any();
        let extra: u128 = kani::any();
        let coeff: u128 = kani::any();
        let floor_ratio: u128 = kani::any();
        let price_coeff: u128 = kani::any();

        kani::assume(min_boost >= SCALE && min_boost <= 2 * SCALE);
        kani::assume(extra <= 4 * SCALE);
        kani::assume(coeff <= 2 * SCALE);
        kani::assume(floor_ratio <= SCALE);
        kani::assume(price_coeff > 0 && price_coeff <= 10 * SCALE);

        BoostCurve::RatioPower(RatioPowerCoefficients {
            min_boost,
            max_boost: min_boost + extra,
            coeff,
            exponent_quarters: 4,
            floor_ratio,
            price_coeff,
        })
    }

    /// B1: Output stays within the configured bounds
    #[kani::proof]
    #[kani::unwind(130)]
    fn b1_bounds() {
        let curve = any_linear();
        let raw: u128 = kani::any();
        let locked: u128 = kani::any();
        kani::assume(raw < (1u128 << 90));
        kani::assume(locked < (1u128 << 90));

        let b = curve.evaluate(raw, locked);
        assert!(b >= SCALE, "B1: boost below 1.0");
        assert!(b <= curve.max_boost(), "B1: boost above max");
    }

    /// B2: Either balance at zero means no boost
    #[kani::proof]
    fn b2_zero_identity() {
        let curve = any_linear();
        let x: u128 = kani::any();

        assert!(curve.evaluate(x, 0) == SCALE, "B2: zero locked must be 1.0");
        assert!(curve.evaluate(0, x) == SCALE, "B2: zero staked must be 1.0");
    }

    /// B3: Linear curve is non-decreasing in the locked balance
    #[kani::proof]
    #[kani::unwind(130)]
    fn b3_linear_monotone() {
        let curve = any_linear();
        let raw: u128 = kani::any();
        let l1: u128 = kani::any();
        let l2: u128 = kani::any();
        kani::assume(raw > 0 && raw < (1u128 << 80));
        kani::assume(l1 <= l2 && l2 < (1u128 << 80));

        assert!(curve.evaluate(raw, l2) >= curve.evaluate(raw, l1), "B3: boost must not decrease");
    }

    /// B4: Ratio-power output stays within the configured bounds
    #[kani::proof]
    #[kani::unwind(130)]
    fn b4_ratio_power_bounds() {
        let curve = any_ratio_power();
        assert!(curve.validate().is_ok(), "B4: generated coefficients must be valid");

        let raw: u128 = kani::any();
        let locked: u128 = kani::any();
        kani::assume(raw < (1u128 << 90));
        kani::assume(locked < (1u128 << 90));

        let b = curve.evaluate(raw, locked);
        assert!(b >= SCALE, "B4: boost below 1.0");
        assert!(b <= curve.max_boost(), "B4: boost above max");
    }
}
