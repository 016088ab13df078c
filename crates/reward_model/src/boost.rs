//! Boost curves
//!
//! Maps (raw staked balance, locked governance balance) to a reward multiplier
//! in `[1, max_boost]`, scaled so that 1.0 == `SCALE`. Each vault carries its own
//! curve:
//!
//! - **RatioPower**: `min + coeff * ratio^(q/4)` above a floor ratio, where
//!   `ratio = locked / (raw * price_coeff)`. Fractional powers come from exact
//!   integer square roots, so the curve is deterministic and monotone.
//! - **Linear**: interpolates `min → max` as the ratio goes `0 → ratio_at_max`.
//!
//! Either curve returns exactly 1.0 when either balance is zero and never
//! divides by zero.

use core::fmt;

use crate::fixed::{
    mul_div, saturating_div_precisely, saturating_mul_truncate, sqrt_scaled, SCALE,
};

/// Invalid curve coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostError {
    /// `min_boost` below 1.0
    MinBelowOne,
    /// `max_boost` below `min_boost`
    MaxBelowMin,
    /// Exponent outside 1..=4 quarters
    InvalidExponent,
    /// Zero price coefficient would zero every deposit
    ZeroPriceCoeff,
    /// Linear curve needs a positive saturation ratio
    ZeroRatioAtMax,
}

impl fmt::Display for BoostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoostError::MinBelowOne => write!(f, "min boost must be at least 1.0"),
            BoostError::MaxBelowMin => write!(f, "max boost must not be below min boost"),
            BoostError::InvalidExponent => write!(f, "exponent must be 1..=4 quarters"),
            BoostError::ZeroPriceCoeff => write!(f, "price coefficient must be positive"),
            BoostError::ZeroRatioAtMax => write!(f, "ratio at max must be positive"),
        }
    }
}

impl core::error::Error for BoostError {}

/// Coefficients of the ratio-power curve (all scaled except the exponent)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioPowerCoefficients {
    pub min_boost: u128,
    pub max_boost: u128,
    pub coeff: u128,
    /// Exponent in quarters: 1 => ratio^0.25, 2 => sqrt, 3 => ratio^0.75, 4 => ratio
    pub exponent_quarters: u8,
    /// Below this ratio the multiplier is exactly 1.0
    pub floor_ratio: u128,
    /// Converts the staked balance into governance-token terms
    pub price_coeff: u128,
}

impl Default for RatioPowerCoefficients {
    fn default() -> Self {
        Self {
            min_boost: SCALE,
            max_boost: 3 * SCALE,
            coeff: 9 * SCALE / 10, // 0.9
            exponent_quarters: 2,
            floor_ratio: 0,
            price_coeff: SCALE,
        }
    }
}

/// Coefficients of the linear curve (scaled)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearCoefficients {
    pub min_boost: u128,
    pub max_boost: u128,
    /// Ratio at which the multiplier reaches `max_boost`
    pub ratio_at_max: u128,
}

impl Default for LinearCoefficients {
    fn default() -> Self {
        Self {
            min_boost: SCALE,
            max_boost: 3 * SCALE,
            ratio_at_max: 2 * SCALE,
        }
    }
}

/// Per-vault boost curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostCurve {
    RatioPower(RatioPowerCoefficients),
    Linear(LinearCoefficients),
}

impl Default for BoostCurve {
    fn default() -> Self {
        BoostCurve::RatioPower(RatioPowerCoefficients::default())
    }
}

impl BoostCurve {
    /// Reject coefficients that cannot satisfy `1 <= boost <= max`
    pub fn validate(&self) -> Result<(), BoostError> {
        let (min, max) = self.bounds();
        if min < SCALE {
            return Err(BoostError::MinBelowOne);
        }
        if max < min {
            return Err(BoostError::MaxBelowMin);
        }
        match self {
            BoostCurve::RatioPower(c) => {
                if !(1..=4).contains(&c.exponent_quarters) {
                    return Err(BoostError::InvalidExponent);
                }
                if c.price_coeff == 0 {
                    return Err(BoostError::ZeroPriceCoeff);
                }
            }
            BoostCurve::Linear(c) => {
                if c.ratio_at_max == 0 {
                    return Err(BoostError::ZeroRatioAtMax);
                }
            }
        }
        Ok(())
    }

    /// Configured (min_boost, max_boost)
    #[inline]
    pub fn bounds(&self) -> (u128, u128) {
        match self {
            BoostCurve::RatioPower(c) => (c.min_boost, c.max_boost),
            BoostCurve::Linear(c) => (c.min_boost, c.max_boost),
        }
    }

    #[inline]
    pub fn max_boost(&self) -> u128 {
        self.bounds().1
    }

    /// Multiplier for the given balances, clamped to `[1.0, max_boost]`
    pub fn evaluate(&self, raw_staked: u128, locked_governance: u128) -> u128 {
        if raw_staked == 0 || locked_governance == 0 {
            return SCALE;
        }

        let raw = match self {
            BoostCurve::RatioPower(c) => ratio_power(c, raw_staked, locked_governance),
            BoostCurve::Linear(c) => linear(c, raw_staked, locked_governance),
        };

        let upper = self.max_boost().max(SCALE);
        raw.clamp(SCALE, upper)
    }

    /// Staked balance with this curve's multiplier applied
    pub fn boosted_balance(&self, raw_staked: u128, locked_governance: u128) -> u128 {
        saturating_mul_truncate(raw_staked, self.evaluate(raw_staked, locked_governance))
    }
}

fn ratio_power(c: &RatioPowerCoefficients, raw_staked: u128, locked: u128) -> u128 {
    let deposit = saturating_mul_truncate(raw_staked, c.price_coeff);
    if deposit == 0 {
        return SCALE;
    }

    let ratio = saturating_div_precisely(locked, deposit);
    if ratio < c.floor_ratio {
        return SCALE;
    }

    let curve = saturating_mul_truncate(c.coeff, pow_quarters(ratio, c.exponent_quarters));
    c.min_boost.saturating_add(curve)
}

fn linear(c: &LinearCoefficients, raw_staked: u128, locked: u128) -> u128 {
    if c.ratio_at_max == 0 {
        return c.max_boost;
    }

    let ratio = saturating_div_precisely(locked, raw_staked).min(c.ratio_at_max);
    let span = c.max_boost.saturating_sub(c.min_boost);
    // ratio <= ratio_at_max, so the quotient is at most `span`
    let step = mul_div(span, ratio, c.ratio_at_max).unwrap_or(span);
    c.min_boost.saturating_add(step)
}

/// ratio^(q/4) for a scaled ratio; q outside 1..=4 is treated as 0 or 4
fn pow_quarters(ratio: u128, quarters: u8) -> u128 {
    match quarters {
        0 => SCALE,
        1 => sqrt_scaled(sqrt_scaled(ratio)),
        2 => sqrt_scaled(ratio),
        3 => {
            let half = sqrt_scaled(ratio);
            saturating_mul_truncate(half, sqrt_scaled(half))
        }
        _ => ratio,
    }
}
