//! Kani proofs for tranche partitioning
//!
//! - **S1: Conservation** - unlocked + locked equals the tranche amount for any `now`
//! - **S2: Edge Idempotence** - `now == finish` is fully unlocked, `now == start` fully locked
//! - **S3: Settled Tranches** - entries finished by the last claim never appear

#[cfg(kani)]
mod kani_proofs {
    use reward_model::{partition, RewardEntry};

    fn any_entry() -> RewardEntry {
        let start: u64 = kani::any();
        let len: u64 = kani::any();
        let rate: u128 = kani::any();

        kani::assume(start > 0 && start < 1_000_000);
        kani::assume(len < 1_000_000);
        kani::assume(rate < (1u128 << 80));

        RewardEntry { start, finish: start + len, rate, index: 0 }
    }

    /// S1: Splitting conserves the amount exactly
    #[kani::proof]
    #[kani::unwind(3)]
    fn s1_split_conserves() {
        let e = any_entry();
        let now: u64 = kani::any();
        kani::assume(now < 3_000_000);

        let p = partition(&[e], 0, now).unwrap();
        let total = p.unlocked_total().unwrap() + p.locked_total().unwrap();
        assert!(total == e.amount().unwrap(), "S1: split must conserve amount");
    }

    /// S2: Partitioning at the edges leaves no remainder
    #[kani::proof]
    #[kani::unwind(3)]
    fn s2_split_edges() {
        let e = any_entry();

        let at_finish = partition(&[e], 0, e.finish).unwrap();
        assert!(at_finish.locked_total().unwrap() == 0, "S2: nothing locked at finish");

        let at_start = partition(&[e], 0, e.start).unwrap();
        assert!(at_start.unlocked_total().unwrap() == 0, "S2: nothing unlocked at start");
    }

    /// S3: A claim at or after finish settles the tranche
    #[kani::proof]
    #[kani::unwind(3)]
    fn s3_claimed_dropped() {
        let e = any_entry();
        let claim: u64 = kani::any();
        let now: u64 = kani::any();
        kani::assume(claim >= e.finish && claim > 0);

        let p = partition(&[e], claim, now).unwrap();
        assert!(p.unlocked.is_empty() && p.locked.is_empty(), "S3: settled tranche must be dropped");
    }
}
