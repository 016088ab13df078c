//! Kani proofs for the fixed-point operators
//!
//! - **F1: Floor Semantics** - `mul_truncate` matches floor(a·b / SCALE) when the product fits
//! - **F2: Division Floor** - `div_precisely` matches floor(a·SCALE / b)
//! - **F3: Wide Product** - `mul_wide` agrees with native multiplication below 2^128

#[cfg(kani)]
mod kani_proofs {
    use reward_model::fixed::{div_precisely, mul_truncate, mul_wide, SCALE};

    /// F1: For products that fit in u128 the wide path equals the native formula
    #[kani::proof]
    #[kani::unwind(130)]
    fn f1_mul_truncate_floor() {
        let a: u128 = kani::any();
        let b: u128 = kani::any();

        kani::assume(a < (1u128 << 60));
        kani::assume(b < (1u128 << 60));

        let got = mul_truncate(a, b).unwrap();
        assert!(got == (a * b) / SCALE, "F1: mul_truncate must floor");
    }

    /// F2: div_precisely floors and never exceeds the exact quotient
    #[kani::proof]
    #[kani::unwind(130)]
    fn f2_div_precisely_floor() {
        let a: u128 = kani::any();
        let b: u128 = kani::any();

        kani::assume(a < (1u128 << 64));
        kani::assume(b > 0 && b < (1u128 << 64));

        let q = div_precisely(a, b).unwrap();
        assert!(q == (a * SCALE) / b, "F2: div_precisely must floor");
        assert!(q * b <= a * SCALE, "F2: quotient never rounds up");
    }

    /// F3: High word is zero and low word exact when the product fits
    #[kani::proof]
    fn f3_mul_wide_small() {
        let a: u64 = kani::any();
        let b: u64 = kani::any();

        let (hi, lo) = mul_wide(a as u128, b as u128);
        assert!(hi == 0, "F3: high word must be zero");
        assert!(lo == (a as u128) * (b as u128), "F3: low word must be the product");
    }
}
