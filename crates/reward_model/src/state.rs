//! Vault and account snapshots (simplified mirror of on-chain state)

use alloc::vec::Vec;

use crate::boost::BoostCurve;
use crate::MathError;

/// Vault-wide reward program state as of one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultState {
    /// Reward units per second (scaled)
    pub reward_rate: u128,
    /// Accumulator checkpoint (scaled, non-decreasing on-chain)
    pub reward_per_token_stored: u128,
    /// Unix seconds of the last accumulator checkpoint
    pub last_update_time: u64,
    /// Unix seconds when the current reward period ends
    pub period_finish: u64,
    /// Total boosted stake in the vault (scaled)
    pub total_supply: u128,
    /// Fraction of new rewards released immediately (scaled, in [0, 1])
    pub unlock_percentage: u128,
    /// Seconds the remainder stays locked after a claim
    pub lockup_duration: u64,
    /// Boost curve this vault applies
    pub boost_curve: BoostCurve,
}

/// Linear vesting tranche created by a past claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardEntry {
    pub start: u64,
    pub finish: u64,
    /// Reward units released per second (scaled)
    pub rate: u128,
    pub index: u32,
}

impl RewardEntry {
    /// (finish - start) * rate
    #[inline]
    pub fn amount(&self) -> Result<u128, MathError> {
        span_amount(self.start, self.finish, self.rate)
    }
}

/// Amount released by `rate` over `[start, finish]`; an inverted window is empty
#[inline]
pub(crate) fn span_amount(start: u64, finish: u64, rate: u128) -> Result<u128, MathError> {
    let secs = finish.saturating_sub(start) as u128;
    secs.checked_mul(rate).ok_or(MathError::Overflow)
}

/// One user's position in the vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    /// Staked balance with the current boost applied (scaled)
    pub boosted_balance: u128,
    /// Unboosted staked balance (scaled)
    pub raw_balance: u128,
    /// Accumulator value at the account's last interaction (scaled)
    pub reward_per_token_paid: u128,
    /// Rewards accrued on-chain but not yet folded into a tranche (scaled)
    pub accrued_rewards: u128,
    /// Vesting tranches, ascending by `start`
    pub reward_entries: Vec<RewardEntry>,
    /// Unix seconds of the last claim, 0 if never claimed
    pub last_claim: u64,
    /// Unix seconds of the last stake/withdraw/claim
    pub last_action: u64,
    /// Locked governance balance feeding the boost curve (scaled)
    pub locked_governance_balance: u128,
}

impl AccountState {
    /// Last claim as an option; 0 means the account never claimed
    #[inline]
    pub fn last_claim(&self) -> Option<u64> {
        if self.last_claim == 0 {
            None
        } else {
            Some(self.last_claim)
        }
    }

    /// Multiplier the vault's curve assigns to this account right now
    pub fn boost(&self, vault: &VaultState) -> u128 {
        vault
            .boost_curve
            .evaluate(self.raw_balance, self.locked_governance_balance)
    }
}

/// Vault and account as observed at the same block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub vault: VaultState,
    pub account: AccountState,
}
