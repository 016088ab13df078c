//! Boost calculator

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use reward_model::fixed::{format_units, parse_units};
use reward_model::{BoostCurve, LinearCoefficients, RatioPowerCoefficients};

use crate::config::AppConfig;
use crate::snapshot::{FileSnapshotSource, SnapshotSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CurveKind {
    RatioPower,
    Linear,
}

impl CurveKind {
    fn default_curve(self) -> BoostCurve {
        match self {
            CurveKind::RatioPower => BoostCurve::RatioPower(RatioPowerCoefficients::default()),
            CurveKind::Linear => BoostCurve::Linear(LinearCoefficients::default()),
        }
    }
}

/// Curve given on the command line, else the snapshot vault's, else the default
fn select_curve(config: &AppConfig, kind: Option<CurveKind>) -> Result<BoostCurve> {
    if let Some(kind) = kind {
        return Ok(kind.default_curve());
    }
    let snapshot = FileSnapshotSource::new(&config.snapshot_path)
        .load()
        .with_context(|| format!("Failed to load snapshot {}", config.snapshot_path.display()))?;
    Ok(match snapshot {
        Some(s) => s.vault.boost_curve,
        None => {
            log::debug!("no snapshot, using the default boost curve");
            BoostCurve::default()
        }
    })
}

pub fn calculate(
    config: &AppConfig,
    staked: &str,
    locked: &str,
    curve: Option<CurveKind>,
) -> Result<()> {
    let staked = parse_units(staked).with_context(|| format!("Invalid staked amount {:?}", staked))?;
    let locked = parse_units(locked).with_context(|| format!("Invalid locked amount {:?}", locked))?;
    let curve = select_curve(config, curve)?;

    let multiplier = curve.evaluate(staked, locked);
    let boosted = curve.boosted_balance(staked, locked);
    let (min, max) = curve.bounds();
    let decimals = config.display_decimals;

    println!("{}", "=== Boost ===".bright_green().bold());
    let name = match curve {
        BoostCurve::RatioPower(_) => "ratio-power",
        BoostCurve::Linear(_) => "linear",
    };
    println!("{} {}", "Curve:".bright_cyan(), name);
    println!(
        "{} {}x .. {}x",
        "Range:".bright_cyan(),
        format_units(min, decimals),
        format_units(max, decimals)
    );
    println!("{} {}", "Staked:".bright_cyan(), format_units(staked, decimals));
    println!("{} {}", "Locked:".bright_cyan(), format_units(locked, decimals));
    println!("\n{} {}x", "Multiplier:".bright_yellow(), format_units(multiplier, decimals).bright_green());
    println!("{} {}", "Boosted balance:".bright_yellow(), format_units(boosted, decimals));
    Ok(())
}
