//! Tranche partitioning
//!
//! Splits an account's vesting tranches into what has already unlocked and
//! what is still locked at `now`. A tranche straddling `now` becomes two
//! streams that share its index:
//!
//! ```text
//! [start ........ now ........ finish]
//!  \_ Unlocked _/   \__ Locked __/
//! ```
//!
//! Each piece is priced as `(finish - start) * rate`, so the two halves always
//! sum to the original tranche exactly.

use alloc::vec::Vec;

use crate::state::{span_amount, RewardEntry};
use crate::stream::{Stream, StreamType};
use crate::MathError;

/// Unlocked and locked streams, each in tranche order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub unlocked: Vec<Stream>,
    pub locked: Vec<Stream>,
}

impl Partition {
    pub fn unlocked_total(&self) -> Result<u128, MathError> {
        sum(&self.unlocked)
    }

    pub fn locked_total(&self) -> Result<u128, MathError> {
        sum(&self.locked)
    }
}

fn sum(streams: &[Stream]) -> Result<u128, MathError> {
    streams
        .iter()
        .try_fold(0u128, |acc, s| acc.checked_add(s.amount).ok_or(MathError::Overflow))
}

fn piece(entry: &RewardEntry, kind: StreamType, start: u64, finish: u64) -> Result<Stream, MathError> {
    Ok(Stream {
        kind,
        start,
        finish,
        amount: span_amount(start, finish, entry.rate)?,
        index: Some(entry.index),
    })
}

/// Partition `entries` around `now`, skipping tranches settled by the last claim
///
/// `last_claim == 0` means the account never claimed and nothing is skipped.
pub fn partition(entries: &[RewardEntry], last_claim: u64, now: u64) -> Result<Partition, MathError> {
    let mut out = Partition::default();

    for entry in entries {
        // Fully settled by a previous claim
        if last_claim > 0 && entry.finish <= last_claim {
            continue;
        }

        if entry.start <= now && now <= entry.finish {
            out.unlocked
                .push(piece(entry, StreamType::Unlocked, entry.start, now)?);
            out.locked
                .push(piece(entry, StreamType::Locked, now, entry.finish)?);
        } else if entry.start <= now {
            out.unlocked
                .push(piece(entry, StreamType::Unlocked, entry.start, entry.finish)?);
        } else {
            out.locked
                .push(piece(entry, StreamType::Locked, entry.start, entry.finish)?);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{units, SCALE};
    use alloc::vec;

    fn entry(start: u64, finish: u64, index: u32) -> RewardEntry {
        RewardEntry { start, finish, rate: SCALE, index }
    }

    #[test]
    fn test_straddling_entry_splits() {
        let p = partition(&[entry(1000, 2000, 0)], 0, 1500).unwrap();

        assert_eq!(p.unlocked.len(), 1);
        assert_eq!(p.locked.len(), 1);
        assert_eq!((p.unlocked[0].start, p.unlocked[0].finish), (1000, 1500));
        assert_eq!((p.locked[0].start, p.locked[0].finish), (1500, 2000));
        assert_eq!(p.unlocked[0].index, Some(0));
        assert_eq!(p.locked[0].index, Some(0));
        assert_eq!(p.unlocked_total().unwrap(), units(500));
        assert_eq!(p.locked_total().unwrap(), units(500));
    }

    #[test]
    fn test_past_and_future_entries() {
        let entries = vec![entry(100, 200, 0), entry(300, 400, 1), entry(500, 600, 2)];
        let p = partition(&entries, 0, 350).unwrap();

        assert_eq!(p.unlocked_total().unwrap(), units(100 + 50));
        assert_eq!(p.locked_total().unwrap(), units(50 + 100));
        assert_eq!(p.locked.last().map(|s| s.start), Some(500));
    }

    #[test]
    fn test_claimed_entries_dropped() {
        let entries = vec![entry(100, 200, 0), entry(300, 400, 1)];
        let p = partition(&entries, 200, 1000).unwrap();

        assert_eq!(p.unlocked.len(), 1);
        assert_eq!(p.unlocked[0].index, Some(1));
        assert!(p.locked.is_empty());
    }

    #[test]
    fn test_split_at_edges() {
        let e = [entry(1000, 2000, 3)];

        let at_finish = partition(&e, 0, 2000).unwrap();
        assert_eq!(at_finish.unlocked_total().unwrap(), units(1000));
        assert_eq!(at_finish.locked_total().unwrap(), 0);

        let at_start = partition(&e, 0, 1000).unwrap();
        assert_eq!(at_start.unlocked_total().unwrap(), 0);
        assert_eq!(at_start.locked_total().unwrap(), units(1000));
    }
}
