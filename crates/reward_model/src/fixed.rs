//! 18-decimal fixed-point math
//!
//! Every reward quantity is a `u128` carrying an implicit scale of 1e18.
//! Products are widened to 256 bits before rescaling, so `a * b` never wraps;
//! only a final quotient that does not fit `u128` is an error.

use alloc::string::String;
use core::fmt::Write;

use crate::MathError;

/// Number of implicit decimals
pub const DECIMALS: u32 = 18;

/// Scaling factor (1e18)
pub const SCALE: u128 = 1_000_000_000_000_000_000;

const LO_MASK: u128 = u64::MAX as u128;

/// Whole units to scaled value
#[inline]
pub const fn units(x: u64) -> u128 {
    (x as u128) * SCALE
}

/// Full 256-bit product of two `u128` values, returned as `(hi, lo)`
#[inline]
pub fn mul_wide(a: u128, b: u128) -> (u128, u128) {
    let (a0, a1) = (a & LO_MASK, a >> 64);
    let (b0, b1) = (b & LO_MASK, b >> 64);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    // Middle column collects the cross terms plus the carry out of p00
    let mid = (p00 >> 64) + (p01 & LO_MASK) + (p10 & LO_MASK);

    let lo = (p00 & LO_MASK) | (mid << 64);
    let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (hi, lo)
}

/// floor((hi·2^128 + lo) / d)
///
/// Restoring long division over the low word; the high word must already be
/// smaller than `d` or the quotient would not fit.
pub fn div_wide(hi: u128, lo: u128, d: u128) -> Result<u128, MathError> {
    if d == 0 {
        return Err(MathError::DivisionByZero);
    }
    if hi == 0 {
        return Ok(lo / d);
    }
    if hi >= d {
        return Err(MathError::Overflow);
    }

    let mut rem = hi;
    let mut quot: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        quot <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quot |= 1;
        }
    }
    Ok(quot)
}

/// floor(a * b / d) with a 256-bit intermediate
#[inline]
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128, MathError> {
    let (hi, lo) = mul_wide(a, b);
    div_wide(hi, lo, d)
}

/// floor(a * b / SCALE): multiply two scaled values, truncating
#[inline]
pub fn mul_truncate(a: u128, b: u128) -> Result<u128, MathError> {
    mul_div(a, b, SCALE)
}

/// floor(a * SCALE / b): divide two scaled values, preserving scale
#[inline]
pub fn div_precisely(a: u128, b: u128) -> Result<u128, MathError> {
    mul_div(a, SCALE, b)
}

/// [`mul_truncate`] clamped to `u128::MAX`
#[inline]
pub fn saturating_mul_truncate(a: u128, b: u128) -> u128 {
    mul_truncate(a, b).unwrap_or(u128::MAX)
}

/// [`div_precisely`] clamped to `u128::MAX`; callers guard `b != 0`
#[inline]
pub fn saturating_div_precisely(a: u128, b: u128) -> u128 {
    div_precisely(a, b).unwrap_or(u128::MAX)
}

/// floor(sqrt(n))
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let bits = 128 - n.leading_zeros();
    let mut x: u128 = 1 << ((bits + 1) / 2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// floor(sqrt(hi·2^128 + lo)); the root of a 256-bit value always fits `u128`
pub fn isqrt_wide(hi: u128, lo: u128) -> u128 {
    if hi == 0 {
        return isqrt(lo);
    }

    // Start at or above the root so Newton descends monotonically
    let bits = 256 - hi.leading_zeros();
    let shift = (bits + 1) / 2;
    let mut x: u128 = if shift >= 128 { u128::MAX } else { 1 << shift };

    loop {
        // x >= sqrt(n) keeps hi < x, so the quotient fits
        let q = match div_wide(hi, lo, x) {
            Ok(q) => q,
            Err(_) => return x,
        };
        let y = x / 2 + q / 2 + (x & q & 1);
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Square root of a scaled value, still scaled: sqrt(x · SCALE)
#[inline]
pub fn sqrt_scaled(x: u128) -> u128 {
    let (hi, lo) = mul_wide(x, SCALE);
    isqrt_wide(hi, lo)
}

/// Parse a decimal string ("12", "0.5", "1000.000000000000000001") into a scaled value
pub fn parse_units(s: &str) -> Result<u128, MathError> {
    let s = s.trim();
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(MathError::InvalidDecimal);
    }
    if frac_part.len() > DECIMALS as usize {
        return Err(MathError::InvalidDecimal);
    }

    let mut whole: u128 = 0;
    for c in int_part.chars() {
        let d = c.to_digit(10).ok_or(MathError::InvalidDecimal)? as u128;
        whole = whole
            .checked_mul(10)
            .and_then(|w| w.checked_add(d))
            .ok_or(MathError::Overflow)?;
    }

    let mut frac: u128 = 0;
    for c in frac_part.chars() {
        let d = c.to_digit(10).ok_or(MathError::InvalidDecimal)? as u128;
        frac = frac * 10 + d;
    }
    frac *= 10u128.pow(DECIMALS - frac_part.len() as u32);

    whole
        .checked_mul(SCALE)
        .and_then(|w| w.checked_add(frac))
        .ok_or(MathError::Overflow)
}

/// Render a scaled value with `shown` decimals, truncating (never rounding up)
pub fn format_units(value: u128, shown: u32) -> String {
    let shown = shown.min(DECIMALS);
    let whole = value / SCALE;
    let mut out = String::new();
    let _ = write!(out, "{}", whole);
    if shown > 0 {
        let frac = (value % SCALE) / 10u128.pow(DECIMALS - shown);
        let _ = write!(out, ".{:0width$}", frac, width = shown as usize);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_truncate_floors() {
        // 1.5 * 1.5 = 2.25
        let x = SCALE + SCALE / 2;
        assert_eq!(mul_truncate(x, x).unwrap(), 2 * SCALE + SCALE / 4);

        // 1 wei * 0.5 truncates to zero
        assert_eq!(mul_truncate(1, SCALE / 2).unwrap(), 0);
    }

    #[test]
    fn test_div_precisely() {
        assert_eq!(div_precisely(units(1), units(3)).unwrap(), 333_333_333_333_333_333);
        assert_eq!(div_precisely(units(10), units(4)).unwrap(), 2 * SCALE + SCALE / 2);
        assert_eq!(div_precisely(1, 0), Err(MathError::DivisionByZero));
    }

    #[test]
    fn test_wide_intermediate_does_not_wrap() {
        // 1e24 * 1e24 overflows u128 but the rescaled result (1e30) fits
        let a = units(1_000_000);
        assert_eq!(mul_truncate(a, a).unwrap(), units(1_000_000_000_000));

        // A quotient above u128::MAX is reported, not wrapped
        assert_eq!(mul_div(u128::MAX, u128::MAX, 1), Err(MathError::Overflow));
    }

    #[test]
    fn test_mul_wide_matches_native_when_small() {
        let (hi, lo) = mul_wide(u64::MAX as u128, u64::MAX as u128);
        assert_eq!(hi, 0);
        assert_eq!(lo, (u64::MAX as u128) * (u64::MAX as u128));

        let (hi, lo) = mul_wide(u128::MAX, 2);
        assert_eq!(hi, 1);
        assert_eq!(lo, u128::MAX - 1);
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(u128::MAX), u64::MAX as u128);

        // sqrt(2^256 - 2^129 + 1) = 2^128 - 1
        let (hi, lo) = mul_wide(u128::MAX, u128::MAX);
        assert_eq!(isqrt_wide(hi, lo), u128::MAX);
    }

    #[test]
    fn test_sqrt_scaled() {
        assert_eq!(sqrt_scaled(units(4)), units(2));
        assert_eq!(sqrt_scaled(SCALE / 4), SCALE / 2);
        assert_eq!(sqrt_scaled(units(1_000_000)), units(1_000));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("12").unwrap(), units(12));
        assert_eq!(parse_units("0.5").unwrap(), SCALE / 2);
        assert_eq!(parse_units(".25").unwrap(), SCALE / 4);
        assert_eq!(parse_units("0.000000000000000001").unwrap(), 1);
        assert_eq!(parse_units("1.0000000000000000001"), Err(MathError::InvalidDecimal));
        assert_eq!(parse_units("abc"), Err(MathError::InvalidDecimal));
        assert_eq!(parse_units(""), Err(MathError::InvalidDecimal));
    }

    #[test]
    fn test_format_units_truncates() {
        assert_eq!(format_units(SCALE + SCALE / 2, 4), "1.5000");
        assert_eq!(format_units(units(500), 0), "500");
        assert_eq!(format_units(999_999_999_999_999_999, 2), "0.99");
    }
}
