use std::time::Duration;

use crate::core::Percent;

/// Configuration settings for refreshing a snapshot
#[derive(Clone, Debug)]
pub struct Config {
    // Driver Settings
    /// Interval between refreshes of the snapshot
    pub refresh_interval: Duration,
    /// Stop refreshing once the engine reports the torrent complete
    pub stop_when_complete: bool,

    // Snapshot Settings
    /// Progress at or below which the estimated time is reported as unknown
    pub min_eta_progress: Percent,
}

impl Config {
    pub fn new() -> Self {
        Self {
            refresh_interval: Duration::from_secs(1),
            stop_when_complete: false,
            min_eta_progress: Percent::ZERO,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_stop_when_complete(mut self, stop: bool) -> Self {
        self.stop_when_complete = stop;
        self
    }

    pub fn with_min_eta_progress(mut self, progress: Percent) -> Self {
        self.min_eta_progress = progress;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
