use log::{debug, info};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::client::Config;
use crate::engine::Engine;
use crate::snapshot::StatusSnapshot;

pub struct Timers {
    refresh: Interval,
}

impl Timers {
    pub fn new(config: &Config) -> Self {
        let mut refresh = interval(config.refresh_interval);
        // Skipped ticks are not replayed.
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { refresh }
    }

    pub async fn tick(&mut self) -> Instant {
        self.refresh.tick().await
    }
}

/// Refreshes `snapshot` on every tick until `shutdown` is cancelled.
///
/// `on_refresh` runs after every successful refresh and may subscribe to newly created file
/// snapshots. An engine error ends the loop and is
/// returned to the caller.
pub async fn run<E, F>(
    snapshot: &mut StatusSnapshot<E>,
    config: &Config,
    shutdown: CancellationToken,
    mut on_refresh: F,
) -> anyhow::Result<()>
where
    E: Engine,
    F: FnMut(&mut StatusSnapshot<E>),
{
    let mut timers = Timers::new(config);
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                debug!("refresh loop cancelled");
                return Ok(());
            }
            now = timers.tick() => {
                snapshot.update_at(now)?;
                on_refresh(snapshot);
                if config.stop_when_complete && snapshot.is_complete() {
                    info!("{} complete", snapshot.name());
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use size::Size;

    use super::*;
    use crate::engine::testing::FakeEngine;
    use crate::engine::{EngineStatus, TorrentState};
    use crate::snapshot::Field;

    fn engine() -> FakeEngine {
        FakeEngine::new(
            EngineStatus::builder()
                .name("movie")
                .state(TorrentState::Downloading)
                .progress(10.0)
                .build()
                .unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_on_every_tick() {
        let engine = engine();
        let mut snapshot = StatusSnapshot::new(engine.clone()).unwrap();
        let config = Config::new().with_refresh_interval(Duration::from_secs(1));
        let shutdown = CancellationToken::new();
        let (_, mut changes) = snapshot.changes();

        let token = shutdown.clone();
        let mut refreshes = 0;
        run(&mut snapshot, &config, shutdown, |snapshot| {
            refreshes += 1;
            if refreshes == 3 {
                assert_eq!(snapshot.name(), "movie");
                token.cancel();
            }
        })
        .await
        .unwrap();

        assert_eq!(refreshes, 3);
        // Only the elapsed time moves, so the estimate is all that changes.
        while let Ok(field) = changes.try_recv() {
            assert_eq!(field, Field::EstimatedTime);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_complete() {
        let engine = engine();
        let mut snapshot = StatusSnapshot::new(engine.clone()).unwrap();
        let config = Config::new().with_stop_when_complete(true);
        let shutdown = CancellationToken::new();

        let mut refreshes = 0;
        run(&mut snapshot, &config, shutdown, |_| {
            refreshes += 1;
            if refreshes == 2 {
                engine.modify(|status| {
                    status.complete = true;
                    status.downloaded = Size::from_kibibytes(1);
                });
            }
        })
        .await
        .unwrap();

        assert_eq!(refreshes, 3);
        assert!(snapshot.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn engine_error_ends_the_loop() {
        let engine = engine();
        let mut snapshot = StatusSnapshot::new(engine.clone()).unwrap();
        engine.set_failing(true);

        let result = run(
            &mut snapshot,
            &Config::new(),
            CancellationToken::new(),
            |_| panic!("refresh must not succeed"),
        )
        .await;

        assert!(result.is_err());
    }
}
