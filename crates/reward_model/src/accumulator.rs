//! Reward-per-token accumulator
//!
//! Reproduces the staking contract's reward-rate integral:
//!
//! ```text
//! rpt(now) = stored + rate * (min(period_finish, now) - last_update) * SCALE / total_supply
//! ```
//!
//! and splits what an account earned since its checkpoint into the portion
//! released immediately and the portion a claim would lock up.

use crate::fixed::{div_precisely, mul_truncate};
use crate::state::{AccountState, VaultState};
use crate::MathError;

/// How accrual treats the end of the reward period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccrualMode {
    /// Stop accruing at `period_finish`, as the contract does
    #[default]
    Actual,
    /// Keep the current rate past `period_finish`; previews only
    SimulateConstant,
}

/// Rewards accrued since the account's last checkpoint (scaled)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Earned {
    pub total: u128,
    pub unlocked: u128,
    pub locked: u128,
}

/// Accumulator value as of `now`
///
/// A clock behind `last_update_time` yields zero elapsed time rather than a
/// negative window. An empty vault keeps the stored value.
pub fn reward_per_token(vault: &VaultState, now: u64, mode: AccrualMode) -> Result<u128, MathError> {
    let last_applicable = match mode {
        AccrualMode::Actual => vault.period_finish.min(now),
        AccrualMode::SimulateConstant => now,
    };

    let delta_t = last_applicable.saturating_sub(vault.last_update_time);
    if delta_t == 0 {
        return Ok(vault.reward_per_token_stored);
    }

    let to_distribute = vault
        .reward_rate
        .checked_mul(delta_t as u128)
        .ok_or(MathError::Overflow)?;
    if vault.total_supply == 0 || to_distribute == 0 {
        return Ok(vault.reward_per_token_stored);
    }

    let per_token = div_precisely(to_distribute, vault.total_supply)?;
    vault
        .reward_per_token_stored
        .checked_add(per_token)
        .ok_or(MathError::Overflow)
}

/// Split the account's new reward at `reward_per_token` into unlocked and locked parts
///
/// A polled accumulator can momentarily trail a fresher `reward_per_token_paid`;
/// that reads as no new reward instead of a negative one.
pub fn earned_since_checkpoint(
    vault: &VaultState,
    account: &AccountState,
    reward_per_token: u128,
) -> Result<Earned, MathError> {
    let delta = reward_per_token.saturating_sub(account.reward_per_token_paid);
    if delta == 0 {
        return Ok(Earned::default());
    }

    let new_reward = mul_truncate(account.boosted_balance, delta)?;
    let unlocked_new = mul_truncate(new_reward, vault.unlock_percentage)?;

    let unlocked = unlocked_new
        .checked_add(account.accrued_rewards)
        .ok_or(MathError::Overflow)?;
    let locked = new_reward.saturating_sub(unlocked_new);
    let total = unlocked.checked_add(locked).ok_or(MathError::Overflow)?;

    Ok(Earned { total, unlocked, locked })
}
