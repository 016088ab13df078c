//! Reward stream accounting and boost curves
//!
//! Off-chain mirror of a streaming reward vault. Given a polled vault/account
//! snapshot and the current time, [`aggregate::recompute`] rebuilds the account's
//! entitlement exactly as the contract's integer accounting would:
//! reward-per-token accrual, linear vesting tranches split at "now", and the
//! tranche a claim would lock up. [`boost::BoostCurve`] maps staked and locked
//! governance balances to a reward multiplier.
//!
//! All arithmetic is 18-decimal fixed point on `u128` with 256-bit
//! intermediates. No floating point, no panics, no hidden state.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

use core::fmt;

pub mod fixed;
pub mod state;
pub mod stream;
pub mod accumulator;
pub mod tranche;
pub mod aggregate;
pub mod boost;

pub use fixed::{div_precisely, mul_truncate, SCALE};
pub use state::{AccountState, RewardEntry, Snapshot, VaultState};
pub use stream::{Stream, StreamType, TypedAmounts};
pub use accumulator::{earned_since_checkpoint, reward_per_token, AccrualMode, Earned};
pub use tranche::{partition, Partition};
pub use aggregate::{compute, project, recompute, ChartSample, RewardStreams, StreamTotals};
pub use boost::{BoostCurve, BoostError, LinearCoefficients, RatioPowerCoefficients};

/// Arithmetic failures in the fixed-point layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Result does not fit in `u128`
    Overflow,
    /// Zero denominator
    DivisionByZero,
    /// Malformed decimal string
    InvalidDecimal,
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathError::Overflow => write!(f, "fixed-point overflow"),
            MathError::DivisionByZero => write!(f, "division by zero"),
            MathError::InvalidDecimal => write!(f, "invalid decimal amount"),
        }
    }
}

impl core::error::Error for MathError {}
