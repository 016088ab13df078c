//! Stream aggregation
//!
//! Builds the full [`RewardStreams`] view for one account at one instant:
//! named totals, the tranche index range a claim would settle, the next
//! unlock, a step-shaped chart series and the preview tranche a claim made
//! right now would create.
//!
//! Everything is recomputed from the snapshot on every call. Nothing is cached
//! or shared between calls, so equal inputs always produce equal outputs.

use alloc::vec::Vec;

use crate::accumulator::{earned_since_checkpoint, reward_per_token, AccrualMode, Earned};
use crate::state::{AccountState, Snapshot, VaultState};
use crate::stream::{Stream, StreamType, TypedAmounts};
use crate::tranche::partition;
use crate::MathError;

/// Named totals (all scaled)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamTotals {
    /// Accrued since the last checkpoint
    pub earned: Earned,
    /// Still vesting in existing tranches
    pub locked: u128,
    /// Would be locked into a new tranche by claiming now
    pub preview_locked: u128,
    /// Claimable right now: unlocked tranches plus the unlocked part of `earned`
    pub received: u128,
    /// Vested out of existing tranches
    pub unlocked: u128,
    /// Unlocked tranches plus everything earned
    pub unclaimed: u128,
}

/// One point of the chart series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSample {
    pub time: u64,
    pub amounts: TypedAmounts,
}

/// Engine output for one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardStreams {
    pub current_time: u64,
    /// Inclusive (min, max) tranche indices a claim would settle
    pub claim_range: (u32, u32),
    pub amounts: StreamTotals,
    /// Start of the earliest tranche that has not begun vesting
    pub next_unlock: Option<u64>,
    pub chart_data: Vec<ChartSample>,
    pub earned_stream: Stream,
    pub unlocked_streams: Vec<Stream>,
    pub locked_streams: Vec<Stream>,
    pub preview_stream: Stream,
}

#[inline]
fn add(a: u128, b: u128) -> Result<u128, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

/// Full stream view of `account` in `vault` at `now`
pub fn compute(
    vault: &VaultState,
    account: &AccountState,
    now: u64,
    mode: AccrualMode,
) -> Result<RewardStreams, MathError> {
    // 1. Existing tranches
    let parts = partition(&account.reward_entries, account.last_claim, now)?;
    let unlocked = parts.unlocked_total()?;
    let locked = parts.locked_total()?;

    // 2. Fresh accrual
    let rpt = reward_per_token(vault, now, mode)?;
    let earned = earned_since_checkpoint(vault, account, rpt)?;

    // 3. Derived totals
    let amounts = StreamTotals {
        earned,
        locked,
        preview_locked: earned.locked,
        received: add(unlocked, earned.unlocked)?,
        unlocked,
        unclaimed: add(unlocked, earned.total)?,
    };

    // 4. Synthetic streams
    let earned_start = match account.last_claim() {
        Some(claim) => claim.min(account.last_action),
        None => account.last_action,
    };
    let earned_stream = Stream {
        kind: StreamType::Earned,
        start: earned_start,
        // A clock behind the checkpoint collapses the span instead of inverting it
        finish: now.max(earned_start),
        amount: earned.total,
        index: None,
    };
    let preview_start = account.last_action.saturating_add(vault.lockup_duration);
    let preview_stream = Stream {
        kind: StreamType::LockedPreview,
        start: preview_start,
        finish: now.saturating_add(vault.lockup_duration).max(preview_start),
        amount: earned.locked,
        index: None,
    };

    // 5. Claim range; an empty range is a no-op claim downstream
    let claim_range = parts
        .unlocked
        .iter()
        .filter_map(|s| s.index)
        .fold(None, |range: Option<(u32, u32)>, i| match range {
            Some((lo, hi)) => Some((lo.min(i), hi.max(i))),
            None => Some((i, i)),
        })
        .unwrap_or((0, 0));

    // 6. Split remainders start at `now`; only tranches that begin later count
    let next_unlock = parts
        .locked
        .iter()
        .filter(|s| s.start > now)
        .map(|s| s.start)
        .min();

    let chart_data = chart_series(
        core::iter::once(&earned_stream)
            .chain(parts.unlocked.iter())
            .chain(parts.locked.iter())
            .chain(core::iter::once(&preview_stream)),
    );

    Ok(RewardStreams {
        current_time: now,
        claim_range,
        amounts,
        next_unlock,
        chart_data,
        earned_stream,
        unlocked_streams: parts.unlocked,
        locked_streams: parts.locked,
        preview_stream,
    })
}

/// Step series: zero at `start`, the amount at `finish`, zero again just after
///
/// Streams starting at 0 are uninitialised and skipped. Samples are stably
/// ordered by time so coincident points keep stream order.
fn chart_series<'a>(streams: impl Iterator<Item = &'a Stream>) -> Vec<ChartSample> {
    let mut samples = Vec::new();
    for s in streams.filter(|s| s.start > 0) {
        samples.push(ChartSample { time: s.start, amounts: TypedAmounts::default() });
        samples.push(ChartSample { time: s.finish, amounts: s.amounts() });
        samples.push(ChartSample {
            time: s.finish.saturating_add(1),
            amounts: TypedAmounts::default(),
        });
    }
    samples.sort_by_key(|p| p.time);
    samples
}

/// Tick entry point: `None` while the snapshot has not loaded yet
pub fn recompute(snapshot: Option<&Snapshot>, now: u64) -> Result<Option<RewardStreams>, MathError> {
    snapshot
        .map(|s| compute(&s.vault, &s.account, now, AccrualMode::Actual))
        .transpose()
}

/// What-if view `horizon` seconds ahead, assuming the current rate continues
pub fn project(snapshot: &Snapshot, now: u64, horizon: u64) -> Result<RewardStreams, MathError> {
    compute(
        &snapshot.vault,
        &snapshot.account,
        now.saturating_add(horizon),
        AccrualMode::SimulateConstant,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boost::BoostCurve;
    use crate::fixed::{units, SCALE};
    use crate::state::RewardEntry;
    use alloc::vec;

    fn snapshot() -> Snapshot {
        Snapshot {
            vault: VaultState {
                reward_rate: 0,
                reward_per_token_stored: 0,
                last_update_time: 900,
                period_finish: 10_000,
                total_supply: units(1000),
                unlock_percentage: SCALE / 5,
                lockup_duration: 600,
                boost_curve: BoostCurve::default(),
            },
            account: AccountState {
                boosted_balance: units(100),
                raw_balance: units(100),
                reward_per_token_paid: 0,
                accrued_rewards: 0,
                reward_entries: vec![RewardEntry { start: 1000, finish: 2000, rate: SCALE, index: 0 }],
                last_claim: 0,
                last_action: 900,
                locked_governance_balance: 0,
            },
        }
    }

    #[test]
    fn test_mid_tranche() {
        let s = snapshot();
        let r = recompute(Some(&s), 1500).unwrap().unwrap();

        assert_eq!(r.amounts.unlocked, units(500));
        assert_eq!(r.amounts.locked, units(500));
        assert_eq!(r.claim_range, (0, 0));
        assert_eq!(r.next_unlock, None);
        assert_eq!(r.amounts.earned, Earned::default());
    }

    #[test]
    fn test_after_tranche() {
        let s = snapshot();
        let r = recompute(Some(&s), 2500).unwrap().unwrap();

        assert_eq!(r.amounts.unlocked, units(1000));
        assert_eq!(r.amounts.locked, 0);
        assert_eq!(r.amounts.received, units(1000));
    }

    #[test]
    fn test_missing_snapshot_is_none() {
        assert_eq!(recompute(None, 1500).unwrap(), None);
    }

    #[test]
    fn test_claim_range_and_next_unlock() {
        let mut s = snapshot();
        s.account.reward_entries = vec![
            RewardEntry { start: 100, finish: 200, rate: SCALE, index: 4 },
            RewardEntry { start: 200, finish: 300, rate: SCALE, index: 5 },
            RewardEntry { start: 300, finish: 400, rate: SCALE, index: 6 },
            RewardEntry { start: 800, finish: 900, rate: SCALE, index: 7 },
        ];
        let r = recompute(Some(&s), 350).unwrap().unwrap();

        assert_eq!(r.claim_range, (4, 6));
        assert_eq!(r.next_unlock, Some(800));
        assert_eq!(r.amounts.unlocked, units(250));
        assert_eq!(r.amounts.locked, units(150));
    }

    #[test]
    fn test_earned_and_preview() {
        let mut s = snapshot();
        s.vault.reward_rate = units(1);
        s.account.reward_entries.clear();
        s.account.last_claim = 950;

        // 100s at 1/s over 1000 staked => 0.1 per token, 100 staked => 10 earned
        let r = recompute(Some(&s), 1000).unwrap().unwrap();
        assert_eq!(r.amounts.earned.total, units(10));
        assert_eq!(r.amounts.earned.unlocked, units(2));
        assert_eq!(r.amounts.preview_locked, units(8));
        assert_eq!(r.amounts.unclaimed, units(10));
        assert_eq!(r.amounts.received, units(2));

        assert_eq!((r.earned_stream.start, r.earned_stream.finish), (900, 1000));
        assert_eq!((r.preview_stream.start, r.preview_stream.finish), (1500, 1600));
        assert_eq!(r.preview_stream.amount, units(8));
    }

    #[test]
    fn test_clock_behind_last_action() {
        let s = snapshot();
        let r = recompute(Some(&s), 800).unwrap().unwrap();

        assert_eq!((r.earned_stream.start, r.earned_stream.finish), (900, 900));
        assert_eq!((r.preview_stream.start, r.preview_stream.finish), (1500, 1500));
        assert_eq!(r.amounts.earned, Earned::default());

        // No sample lands before the earliest stream start
        assert_eq!(r.chart_data.first().map(|p| p.time), Some(900));
        assert!(r.chart_data.windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[test]
    fn test_chart_is_stepped_and_ordered() {
        let s = snapshot();
        let r = recompute(Some(&s), 1500).unwrap().unwrap();

        // earned, unlocked piece, locked piece, preview: 3 samples each
        assert_eq!(r.chart_data.len(), 12);
        assert!(r.chart_data.windows(2).all(|w| w[0].time <= w[1].time));

        let peak = r
            .chart_data
            .iter()
            .find(|p| p.amounts.get(StreamType::Locked) > 0)
            .unwrap();
        assert_eq!(peak.time, 2000);
        assert_eq!(peak.amounts.get(StreamType::Locked), units(500));
    }

    #[test]
    fn test_uninitialised_streams_skipped() {
        let mut s = snapshot();
        s.account.last_action = 0;
        s.account.reward_entries.clear();
        s.vault.lockup_duration = 0;

        let r = recompute(Some(&s), 1500).unwrap().unwrap();
        assert!(r.chart_data.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let s = snapshot();
        let a = recompute(Some(&s), 1234).unwrap();
        let b = recompute(Some(&s), 1234).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_projection_runs_past_period() {
        let mut s = snapshot();
        s.vault.reward_rate = units(1);
        s.vault.period_finish = 1000;

        let actual = compute(&s.vault, &s.account, 5000, AccrualMode::Actual).unwrap();
        let projected = project(&s, 4000, 1000).unwrap();
        assert!(projected.amounts.earned.total > actual.amounts.earned.total);
        assert_eq!(projected.current_time, 5000);
    }
}
