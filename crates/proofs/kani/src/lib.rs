//! Kani harnesses for the reward stream engine
//!
//! Run with: cargo kani -p proofs-kani
//!
//! Every harness is compiled only under `cfg(kani)`; a normal build of this
//! crate is empty.

#![no_std]

#[cfg(kani)]
extern crate kani;

pub mod fixed_point;
pub mod vesting_split;
pub mod boost;
