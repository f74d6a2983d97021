mod simulated;
#[cfg(test)]
pub mod testing;

use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use derive_builder::Builder;
use size::Size;
use tokio::time::Instant;

use crate::core::TransferRate;

pub use simulated::SimulatedEngine;

/// Read-only view of a torrent engine.
///
/// Implementations must answer without blocking: the snapshot queries it from its refresh
/// cycle, which is expected to be driven by a timer.
pub trait Engine {
    fn status(&self) -> Result<EngineStatus>;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn status(&self) -> Result<EngineStatus> {
        (**self).status()
    }
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn status(&self) -> Result<EngineStatus> {
        (**self).status()
    }
}

/// Lifecycle of a torrent inside the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TorrentState {
    #[default]
    Stopped,
    Paused,
    /// Verifying data already on disk
    Hashing,
    /// Fetching the info dictionary from peers (magnet links)
    Metadata,
    Downloading,
    Seeding,
    Stopping,
    Error,
}

impl Display for TorrentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Stopped => "stopped",
            Self::Paused => "paused",
            Self::Hashing => "hashing",
            Self::Metadata => "fetching metadata",
            Self::Downloading => "downloading",
            Self::Seeding => "seeding",
            Self::Stopping => "stopping",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    /// Not downloaded at all
    Skip,
    Low,
    #[default]
    Normal,
    High,
}

/// One constituent file as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FileStatus {
    pub path: PathBuf,
    pub length: Size,
    pub downloaded: Size,
    pub priority: Priority,
}

impl FileStatus {
    pub fn new(path: impl Into<PathBuf>, length: Size) -> Self {
        Self {
            path: path.into(),
            length,
            downloaded: Size::from_const(0),
            priority: Priority::Normal,
        }
    }

    pub fn with_downloaded(mut self, downloaded: Size) -> Self {
        self.downloaded = downloaded;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Everything a single refresh cycle reads from the engine.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct EngineStatus {
    #[builder(setter(into), default)]
    pub name: String,
    #[builder(default)]
    pub state: TorrentState,
    /// 0 to 100
    #[builder(default)]
    pub progress: f64,
    #[builder(default)]
    pub download_rate: TransferRate,
    #[builder(default)]
    pub upload_rate: TransferRate,
    #[builder(default = "Size::from_const(0)")]
    pub downloaded: Size,
    #[builder(default = "Size::from_const(0)")]
    pub uploaded: Size,
    #[builder(default = "Instant::now()")]
    pub started_at: Instant,
    /// `None` until the engine knows the torrent's metadata
    #[builder(setter(strip_option), default)]
    pub size: Option<Size>,
    #[builder(default)]
    pub is_magnet: bool,
    #[builder(default)]
    pub complete: bool,
    /// Available once the state reaches downloading
    #[builder(setter(strip_option), default)]
    pub files: Option<Vec<FileStatus>>,
}

impl EngineStatus {
    pub fn builder() -> EngineStatusBuilder {
        EngineStatusBuilder::default()
    }

    /// Sum of all file lengths, if the file list is known.
    pub fn files_length(&self) -> Option<Size> {
        self.files.as_ref().map(|files| {
            files
                .iter()
                .fold(Size::from_const(0), |total, file| total + file.length)
        })
    }
}
