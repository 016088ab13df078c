//! Stream views: show, chart, preview, watch

use anyhow::{Context, Result};
use colored::Colorize;
use reward_model::fixed::{format_units, DECIMALS};
use reward_model::{project, recompute, RewardStreams, Snapshot, Stream};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::clock::{Clock, MonotonicClock, SystemClock};
use crate::config::AppConfig;
use crate::price::{FilePriceSource, PriceCache, PriceSource};
use crate::scheduler::{self, SchedulerConfig, View};
use crate::snapshot::{FileSnapshotSource, SnapshotSource};

fn load_snapshot(config: &AppConfig) -> Result<Option<Snapshot>> {
    let source = FileSnapshotSource::new(&config.snapshot_path);
    source
        .load()
        .with_context(|| format!("Failed to load snapshot {}", source.path().display()))
}

fn now_or(at: Option<u64>) -> u64 {
    at.unwrap_or_else(|| SystemClock.now())
}

fn price_cache(config: &AppConfig, now: u64) -> PriceCache {
    let mut cache = PriceCache::new(config.price_max_age_secs);
    if let Some(path) = &config.price_path {
        refresh_price(&mut cache, &FilePriceSource::new(path), now);
    }
    cache
}

fn refresh_price(cache: &mut PriceCache, source: &dyn PriceSource, now: u64) {
    if let Err(e) = cache.refresh(source, now) {
        log::warn!("price refresh failed: {}", e);
    }
}

fn loading() {
    println!("{}", "Snapshot not loaded yet".yellow());
    println!("{}", "(Waiting for the vault poller to write it)".dimmed());
}

/// One recomputation at `at` (or now)
pub fn show(config: &AppConfig, at: Option<u64>) -> Result<()> {
    let now = now_or(at);
    let Some(snapshot) = load_snapshot(config)? else {
        loading();
        return Ok(());
    };

    let streams = recompute(Some(&snapshot), now)
        .context("Failed to recompute reward streams")?
        .context("Snapshot vanished during recompute")?;
    let prices = price_cache(config, now);

    print_streams(&streams, config.display_decimals, &prices);
    print_boost(&snapshot, config.display_decimals);
    Ok(())
}

/// What-if view `horizon` seconds ahead at the current rate
pub fn preview(config: &AppConfig, horizon: u64, at: Option<u64>) -> Result<()> {
    let now = now_or(at);
    let Some(snapshot) = load_snapshot(config)? else {
        loading();
        return Ok(());
    };

    let streams = project(&snapshot, now, horizon).context("Failed to project reward streams")?;

    println!(
        "{}",
        format!("=== Projection: {}s ahead (constant rate) ===", horizon)
            .bright_green()
            .bold()
    );
    print_streams(&streams, config.display_decimals, &price_cache(config, now));
    Ok(())
}

#[derive(Serialize)]
struct ChartPoint {
    time: u64,
    amounts: BTreeMap<&'static str, String>,
}

/// Chart samples as JSON, to `out` or stdout
pub fn chart(config: &AppConfig, out: Option<PathBuf>, at: Option<u64>) -> Result<()> {
    let now = now_or(at);
    let Some(snapshot) = load_snapshot(config)? else {
        loading();
        return Ok(());
    };

    let streams = recompute(Some(&snapshot), now)
        .context("Failed to recompute reward streams")?
        .context("Snapshot vanished during recompute")?;

    let points: Vec<ChartPoint> = streams
        .chart_data
        .iter()
        .map(|p| ChartPoint {
            time: p.time,
            amounts: p
                .amounts
                .iter()
                .map(|(kind, v)| (kind.label(), format_units(v, DECIMALS)))
                .collect(),
        })
        .collect();
    let json = serde_json::to_string_pretty(&points).context("Failed to serialize chart data")?;

    match out {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} {} ({} points)", "Chart written:".bright_green(), path.display(), points.len());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Recompute every tick until Ctrl-C or `ticks` ticks
pub async fn watch(config: &AppConfig, interval: Option<u64>, ticks: Option<u64>) -> Result<()> {
    let tick_secs = interval.unwrap_or(config.tick_interval_secs).max(1);

    println!("{}", "=== Watching Reward Streams ===".bright_green().bold());
    println!("{} {}", "Snapshot:".bright_cyan(), config.snapshot_path.display());
    println!("{} {}s", "Tick:".bright_cyan(), tick_secs);
    println!("{} {}s", "Poll:".bright_cyan(), config.poll_interval_secs);
    println!("{}", "(Press Ctrl+C to stop)".dimmed());

    let handle = scheduler::spawn(
        FileSnapshotSource::new(&config.snapshot_path),
        MonotonicClock::new(SystemClock),
        SchedulerConfig {
            tick: Duration::from_secs(tick_secs),
            poll: Duration::from_secs(config.poll_interval_secs),
            max_ticks: ticks,
        },
    );
    let mut rx = handle.subscribe();

    let price_source = config.price_path.as_ref().map(FilePriceSource::new);
    let mut prices = PriceCache::new(config.price_max_age_secs);

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let tick = rx.borrow_and_update().clone();

                if let Some(source) = &price_source {
                    if prices.is_stale(tick.now) {
                        refresh_price(&mut prices, source, tick.now);
                    }
                }

                println!(
                    "\n{}",
                    format!("[{}] tick {}", chrono::Local::now().format("%H:%M:%S"), tick.seq).dimmed()
                );
                match &tick.view {
                    View::Loading => loading(),
                    View::Ready(streams) => print_streams(streams, config.display_decimals, &prices),
                    View::Failed(e) => println!("  {} {}", "✗".bright_red(), e),
                }
                if let Some(boost) = tick.boost {
                    println!("  {} {}x", "Boost:".bright_cyan(), format_units(boost, config.display_decimals));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}", "Stopping...".yellow());
                break;
            }
        }
    }

    handle.stop().await;
    Ok(())
}

pub fn print_streams(streams: &RewardStreams, decimals: u32, prices: &PriceCache) {
    let fmt = |v: u128| format_units(v, decimals);
    let a = &streams.amounts;

    println!("{} {}", "Time:".bright_cyan(), streams.current_time);
    println!("\n{}", "Amounts:".bright_yellow());
    println!("  {} {}", "Received (claimable):".bright_cyan(), fmt(a.received).bright_green());
    println!("  {} {}", "Unclaimed:".bright_cyan(), fmt(a.unclaimed));
    println!("  {} {}", "Unlocked tranches:".bright_cyan(), fmt(a.unlocked));
    println!("  {} {}", "Locked tranches:".bright_cyan(), fmt(a.locked));
    println!(
        "  {} {} ({} unlocked, {} locked)",
        "Earned:".bright_cyan(),
        fmt(a.earned.total),
        fmt(a.earned.unlocked),
        fmt(a.earned.locked)
    );
    println!("  {} {}", "Locked by claiming now:".bright_cyan(), fmt(a.preview_locked));

    if let (Some(value), Some(at)) = (prices.value_of(a.received, streams.current_time), prices.updated_at()) {
        println!(
            "  {} ${} {}",
            "Claimable value:".bright_cyan(),
            format_units(value, 2),
            format!("(price as of {})", at).dimmed()
        );
    }

    println!("\n{}", "Claim:".bright_yellow());
    let (lo, hi) = streams.claim_range;
    if streams.unlocked_streams.is_empty() {
        println!("  {} none (claim would only settle earned rewards)", "Range:".bright_cyan());
    } else {
        println!("  {} {}..={}", "Range:".bright_cyan(), lo, hi);
    }
    match streams.next_unlock {
        Some(t) => println!("  {} {} (in {}s)", "Next unlock:".bright_cyan(), t, t - streams.current_time),
        None => println!("  {} -", "Next unlock:".bright_cyan()),
    }
    print_stream("Preview tranche:", &streams.preview_stream, decimals);
}

fn print_stream(label: &str, s: &Stream, decimals: u32) {
    println!(
        "  {} {} over [{}, {}]",
        label.bright_cyan(),
        format_units(s.amount, decimals),
        s.start,
        s.finish
    );
}

fn print_boost(snapshot: &Snapshot, decimals: u32) {
    let boost = snapshot.account.boost(&snapshot.vault);
    println!("\n{}", "Boost:".bright_yellow());
    println!("  {} {}x", "Multiplier:".bright_cyan(), format_units(boost, decimals));
    println!(
        "  {} {}x",
        "Max:".bright_cyan(),
        format_units(snapshot.vault.boost_curve.max_boost(), decimals)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::tests::SAMPLE;

    fn config_with(dir: &tempfile::TempDir) -> AppConfig {
        let path = dir.path().join("snapshot.json");
        fs::write(&path, SAMPLE).unwrap();
        AppConfig { snapshot_path: path, ..AppConfig::default() }
    }

    #[test]
    fn test_show_and_preview_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(&dir);
        show(&config, Some(1500)).unwrap();
        preview(&config, 3600, Some(1500)).unwrap();
    }

    #[test]
    fn test_show_without_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            snapshot_path: dir.path().join("missing.json"),
            ..AppConfig::default()
        };
        show(&config, Some(1500)).unwrap();
    }

    #[test]
    fn test_explicit_time_wins() {
        assert_eq!(now_or(Some(1500)), 1500);
        assert!(now_or(None) > 1_700_000_000);
    }

    #[test]
    fn test_chart_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(&dir);
        let out = dir.path().join("chart.json");

        chart(&config, Some(out.clone()), Some(1500)).unwrap();

        let points: Vec<serde_json::Value> =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(points.len(), 12);
        assert!(points[0]["amounts"]["locked"].is_string());
    }
}
