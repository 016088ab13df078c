//! Vault/account snapshots as written by the vault poller
//!
//! Scaled amounts are accepted as decimal strings (`"1.5"` is 1.5e18), as
//! whole-token JSON integers (`1000` is 1000e18) or as raw scaled integers
//! (`{ "raw": "1500000000000000000" }`). Times are unix seconds.

use reward_model::fixed::{parse_units, units, SCALE};
use reward_model::{
    AccountState, BoostCurve, BoostError, LinearCoefficients, MathError, RatioPowerCoefficients,
    RewardEntry, Snapshot, VaultState,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid amount {value:?}: {source}")]
    Amount {
        value: String,
        #[source]
        source: MathError,
    },
    #[error("invalid boost curve: {0}")]
    BoostCurve(#[from] BoostError),
    #[error("reward entry {index} finishes before it starts")]
    InvertedEntry { index: u32 },
}

/// Scaled amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AmountRepr")]
pub struct Amount(pub u128);

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Decimal(String),
    Whole(u64),
    Raw { raw: String },
}

impl TryFrom<AmountRepr> for Amount {
    type Error = SnapshotError;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Decimal(s) => parse_units(&s)
                .map(Amount)
                .map_err(|source| SnapshotError::Amount { value: s, source }),
            // u64::MAX * 1e18 still fits in u128
            AmountRepr::Whole(n) => Ok(Amount(units(n))),
            AmountRepr::Raw { raw } => raw
                .trim()
                .parse::<u128>()
                .map(Amount)
                .map_err(|_| SnapshotError::Amount { value: raw, source: MathError::InvalidDecimal }),
        }
    }
}

fn one() -> Amount {
    Amount(SCALE)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoostCurveFile {
    RatioPower {
        min_boost: Amount,
        max_boost: Amount,
        coeff: Amount,
        exponent_quarters: u8,
        #[serde(default)]
        floor_ratio: Amount,
        #[serde(default = "one")]
        price_coeff: Amount,
    },
    Linear {
        min_boost: Amount,
        max_boost: Amount,
        ratio_at_max: Amount,
    },
}

impl From<BoostCurveFile> for BoostCurve {
    fn from(file: BoostCurveFile) -> Self {
        match file {
            BoostCurveFile::RatioPower {
                min_boost,
                max_boost,
                coeff,
                exponent_quarters,
                floor_ratio,
                price_coeff,
            } => BoostCurve::RatioPower(RatioPowerCoefficients {
                min_boost: min_boost.0,
                max_boost: max_boost.0,
                coeff: coeff.0,
                exponent_quarters,
                floor_ratio: floor_ratio.0,
                price_coeff: price_coeff.0,
            }),
            BoostCurveFile::Linear { min_boost, max_boost, ratio_at_max } => {
                BoostCurve::Linear(LinearCoefficients {
                    min_boost: min_boost.0,
                    max_boost: max_boost.0,
                    ratio_at_max: ratio_at_max.0,
                })
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaultFile {
    pub reward_rate: Amount,
    pub reward_per_token_stored: Amount,
    pub last_update_time: u64,
    pub period_finish: u64,
    pub total_supply: Amount,
    pub unlock_percentage: Amount,
    pub lockup_duration: u64,
    #[serde(default)]
    pub boost_curve: Option<BoostCurveFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewardEntryFile {
    pub start: u64,
    pub finish: u64,
    pub rate: Amount,
    pub index: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountFile {
    pub boosted_balance: Amount,
    pub raw_balance: Amount,
    pub reward_per_token_paid: Amount,
    #[serde(default)]
    pub accrued_rewards: Amount,
    #[serde(default)]
    pub reward_entries: Vec<RewardEntryFile>,
    #[serde(default)]
    pub last_claim: Option<u64>,
    pub last_action: u64,
    #[serde(default)]
    pub locked_governance_balance: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotFile {
    pub vault: VaultFile,
    pub account: AccountFile,
}

impl TryFrom<SnapshotFile> for Snapshot {
    type Error = SnapshotError;

    fn try_from(file: SnapshotFile) -> Result<Self, Self::Error> {
        let v = file.vault;
        let boost_curve: BoostCurve = v.boost_curve.map(Into::into).unwrap_or_default();
        boost_curve.validate()?;

        let a = file.account;
        let mut reward_entries = Vec::with_capacity(a.reward_entries.len());
        for e in a.reward_entries {
            if e.finish < e.start {
                return Err(SnapshotError::InvertedEntry { index: e.index });
            }
            reward_entries.push(RewardEntry {
                start: e.start,
                finish: e.finish,
                rate: e.rate.0,
                index: e.index,
            });
        }

        Ok(Snapshot {
            vault: VaultState {
                reward_rate: v.reward_rate.0,
                reward_per_token_stored: v.reward_per_token_stored.0,
                last_update_time: v.last_update_time,
                period_finish: v.period_finish,
                total_supply: v.total_supply.0,
                unlock_percentage: v.unlock_percentage.0,
                lockup_duration: v.lockup_duration,
                boost_curve,
            },
            account: AccountState {
                boosted_balance: a.boosted_balance.0,
                raw_balance: a.raw_balance.0,
                reward_per_token_paid: a.reward_per_token_paid.0,
                accrued_rewards: a.accrued_rewards.0,
                reward_entries,
                last_claim: a.last_claim.unwrap_or(0),
                last_action: a.last_action,
                locked_governance_balance: a.locked_governance_balance.0,
            },
        })
    }
}

/// Supplies the latest vault/account snapshot
///
/// `Ok(None)` means the snapshot has not been produced yet.
pub trait SnapshotSource {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError>;
}

/// Snapshot JSON on disk
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for FileSnapshotSource {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path).map_err(|source| SnapshotError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_snapshot(&data)
            .map_err(|e| match e {
                SnapshotError::Parse { source, .. } => SnapshotError::Parse { path: self.path.clone(), source },
                other => other,
            })
            .map(Some)
    }
}

/// Parse snapshot JSON
pub fn parse_snapshot(data: &str) -> Result<Snapshot, SnapshotError> {
    let file: SnapshotFile = serde_json::from_str(data).map_err(|source| SnapshotError::Parse {
        path: PathBuf::new(),
        source,
    })?;
    file.try_into()
}
