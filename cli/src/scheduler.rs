//! Recompute loop
//!
//! One task owns the snapshot, the clock and two timers: a poll timer that
//! reloads the snapshot and a tick timer that recomputes the stream view. Each
//! tick replaces the published [`Tick`] in a watch channel; nothing published
//! is ever mutated. Dropping the [`WatchHandle`] stops the task.

use reward_model::{recompute, MathError, RewardStreams, Snapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::clock::Clock;
use crate::snapshot::SnapshotSource;

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub tick: Duration,
    pub poll: Duration,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
}

/// Result of one recomputation
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// No snapshot loaded yet
    Loading,
    Ready(Arc<RewardStreams>),
    Failed(MathError),
}

#[derive(Debug, Clone)]
pub struct Tick {
    pub seq: u64,
    pub now: u64,
    pub view: View,
    /// Boost multiplier from the current snapshot, if loaded
    pub boost: Option<u128>,
}

impl Default for Tick {
    fn default() -> Self {
        Self { seq: 0, now: 0, view: View::Loading, boost: None }
    }
}

/// Handle to a running loop; dropping it stops the loop
pub struct WatchHandle {
    ticks: watch::Receiver<Tick>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Receiver of published ticks
    pub fn subscribe(&self) -> watch::Receiver<Tick> {
        self.ticks.clone()
    }

    /// Signal shutdown and wait for the loop to exit
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            log::warn!("recompute task ended abnormally: {}", e);
        }
    }
}

/// Spawn the loop on the current runtime
pub fn spawn<S, C>(source: S, clock: C, config: SchedulerConfig) -> WatchHandle
where
    S: SnapshotSource + Send + 'static,
    C: Clock + 'static,
{
    let (tx, rx) = watch::channel(Tick::default());
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let task = tokio::spawn(run(source, clock, config, tx, shutdown_rx));

    WatchHandle { ticks: rx, shutdown: Some(shutdown_tx), task }
}

async fn run<S, C>(
    source: S,
    mut clock: C,
    config: SchedulerConfig,
    tx: watch::Sender<Tick>,
    mut shutdown: oneshot::Receiver<()>,
) where
    S: SnapshotSource,
    C: Clock,
{
    let mut poll = interval(config.poll);
    let mut tick = interval(config.tick);
    // A slow tick delays the next one instead of bursting to catch up
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut snapshot: Option<Snapshot> = None;
    let mut seq = 0u64;

    loop {
        tokio::select! {
            // Poll before tick so the first tick already sees a snapshot
            biased;

            // Fires on explicit stop and when the handle is dropped
            _ = &mut shutdown => {
                log::info!("recompute loop stopped after {} ticks", seq);
                break;
            }
            _ = poll.tick() => {
                snapshot = refresh(&source, snapshot);
            }
            _ = tick.tick() => {
                seq += 1;
                let now = clock.now();
                let next = evaluate(seq, now, snapshot.as_ref());
                log::debug!("tick {} at {}", seq, now);
                tx.send_replace(next);

                if config.max_ticks.is_some_and(|max| seq >= max) {
                    log::info!("reached {} ticks", seq);
                    break;
                }
            }
        }
    }
}

/// Reload the snapshot, keeping the previous one if the reload fails
fn refresh<S: SnapshotSource>(source: &S, previous: Option<Snapshot>) -> Option<Snapshot> {
    match source.load() {
        Ok(Some(s)) => {
            if previous.as_ref() != Some(&s) {
                log::info!(
                    "snapshot updated (last_update_time {}, {} reward entries)",
                    s.vault.last_update_time,
                    s.account.reward_entries.len()
                );
            }
            Some(s)
        }
        Ok(None) => {
            if previous.is_some() {
                log::warn!("snapshot disappeared, keeping the last one");
            }
            previous
        }
        Err(e) => {
            log::warn!("snapshot reload failed, keeping the last one: {}", e);
            previous
        }
    }
}

/// One recomputation; pure apart from the inputs handed in
pub fn evaluate(seq: u64, now: u64, snapshot: Option<&Snapshot>) -> Tick {
    let view = match recompute(snapshot, now) {
        Ok(Some(streams)) => View::Ready(Arc::new(streams)),
        Ok(None) => View::Loading,
        Err(e) => {
            log::warn!("recompute failed at {}: {}", now, e);
            View::Failed(e)
        }
    };
    let boost = snapshot.map(|s| s.account.boost(&s.vault));
    Tick { seq, now, view, boost }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::snapshot::{parse_snapshot, tests::SAMPLE, SnapshotError};
    use reward_model::fixed::{units, SCALE};

    struct Static(Option<Snapshot>);

    impl SnapshotSource for Static {
        fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
            Ok(self.0.clone())
        }
    }

    fn config(max_ticks: Option<u64>) -> SchedulerConfig {
        SchedulerConfig {
            tick: Duration::from_millis(5),
            poll: Duration::from_millis(20),
            max_ticks,
        }
    }

    #[test]
    fn test_evaluate_without_snapshot_is_loading() {
        let tick = evaluate(1, 1500, None);
        assert_eq!(tick.view, View::Loading);
        assert_eq!(tick.boost, None);
    }

    #[test]
    fn test_evaluate_with_snapshot() {
        let s = parse_snapshot(SAMPLE).unwrap();
        let tick = evaluate(1, 1500, Some(&s));

        match tick.view {
            View::Ready(r) => {
                assert_eq!(r.amounts.unlocked, units(500));
                assert_eq!(r.amounts.locked, units(500));
            }
            other => panic!("expected ready view, got {:?}", other),
        }
        assert_eq!(tick.boost, Some(2 * SCALE));
    }

    #[tokio::test]
    async fn test_runs_until_max_ticks() {
        let s = parse_snapshot(SAMPLE).unwrap();
        let handle = spawn(Static(Some(s)), FixedClock(2500), config(Some(3)));
        let mut rx = handle.subscribe();

        // Sender is dropped when the loop exits
        while rx.changed().await.is_ok() {}

        let last = rx.borrow().clone();
        assert_eq!(last.seq, 3);
        assert_eq!(last.now, 2500);
        match last.view {
            View::Ready(r) => assert_eq!(r.amounts.unlocked, units(1000)),
            other => panic!("expected ready view, got {:?}", other),
        }
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_reports_loading_without_snapshot() {
        let handle = spawn(Static(None), FixedClock(1500), config(Some(1)));
        let mut rx = handle.subscribe();
        while rx.changed().await.is_ok() {}

        assert_eq!(rx.borrow().view, View::Loading);
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_drop_stops_loop() {
        let handle = spawn(Static(None), FixedClock(1500), config(None));
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();

        drop(handle);
        // Loop exits and drops the sender
        let closed = tokio::time::timeout(Duration::from_secs(2), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
