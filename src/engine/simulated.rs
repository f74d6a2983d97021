use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use size::Size;
use tokio::time::Instant;

use crate::core::TransferRate;
use crate::engine::{Engine, EngineStatus, FileStatus, TorrentState};

/// Stand-in engine that downloads at a jittered constant speed.
///
/// Magnet torrents spend `metadata_delay` in the metadata state, during which their size and
/// file list are unknown. Files are filled in order, then the torrent seeds.
pub struct SimulatedEngine {
    name: String,
    files: Vec<(PathBuf, Size)>,
    speed: Size,
    is_magnet: bool,
    metadata_delay: Duration,
    started_at: Instant,
}

impl SimulatedEngine {
    pub fn new(name: impl Into<String>, files: Vec<(PathBuf, Size)>, speed: Size) -> Self {
        Self {
            name: name.into(),
            files,
            speed,
            is_magnet: false,
            metadata_delay: Duration::ZERO,
            started_at: Instant::now(),
        }
    }

    pub fn with_magnet(mut self, metadata_delay: Duration) -> Self {
        self.is_magnet = true;
        self.metadata_delay = metadata_delay;
        self
    }

    fn total(&self) -> Size {
        self.files
            .iter()
            .fold(Size::from_const(0), |total, (_, length)| total + *length)
    }

    fn status_at(&self, now: Instant) -> Result<EngineStatus> {
        let elapsed = now.saturating_duration_since(self.started_at);
        let mut builder = EngineStatus::builder();
        builder.is_magnet(self.is_magnet).started_at(self.started_at);

        if self.is_magnet && elapsed < self.metadata_delay {
            return Ok(builder
                .name("magnet")
                .state(TorrentState::Metadata)
                .build()?);
        }

        let total = self.total().bytes();
        let downloading_for = elapsed - self.metadata_delay.min(elapsed);
        let downloaded =
            ((self.speed.bytes() as f64) * downloading_for.as_secs_f64()).min(total as f64) as i64;
        let uploaded = downloaded / 3;
        let complete = downloaded >= total;

        let mut rng = rand::rng();
        let download_rate = if complete {
            TransferRate::EMPTY
        } else {
            let jitter: f64 = rng.random_range(0.8..1.2);
            TransferRate::per_second(Size::from_bytes(self.speed.bytes() as f64 * jitter))
        };
        let upload_jitter: f64 = rng.random_range(0.1..0.5);
        let upload_rate =
            TransferRate::per_second(Size::from_bytes(self.speed.bytes() as f64 * upload_jitter));

        let mut remaining = downloaded;
        let files = self
            .files
            .iter()
            .map(|(path, length)| {
                let filled = remaining.min(length.bytes());
                remaining -= filled;
                FileStatus::new(path.clone(), *length).with_downloaded(Size::from_bytes(filled))
            })
            .collect();

        // Magnet torrents never learn a declared size, only their file list.
        if !self.is_magnet {
            builder.size(self.total());
        }
        Ok(builder
            .name(self.name.clone())
            .state(if complete {
                TorrentState::Seeding
            } else {
                TorrentState::Downloading
            })
            .progress(100.0 * downloaded as f64 / total.max(1) as f64)
            .download_rate(download_rate)
            .upload_rate(upload_rate)
            .downloaded(Size::from_bytes(downloaded))
            .uploaded(Size::from_bytes(uploaded))
            .complete(complete)
            .files(files)
            .build()?)
    }
}

impl Engine for SimulatedEngine {
    fn status(&self) -> Result<EngineStatus> {
        self.status_at(Instant::now())
    }
}
