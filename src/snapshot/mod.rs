mod file;
mod notifier;

use std::fmt::Display;
use std::time::Duration;

use anyhow::Result;
use log::{debug, warn};
use size::Size;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use crate::client::Config;
use crate::core::{Estimate, Percent, Tracked, TransferRate};
use crate::engine::{Engine, EngineStatus, TorrentState};

pub use file::{FileField, FileSnapshot};
pub use notifier::{Notifier, Subscriber, SubscriptionId};

/// Published fields of a torrent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    State,
    Progress,
    DownloadRate,
    UploadRate,
    EstimatedTime,
    TotalDownloaded,
    TotalUploaded,
    Ratio,
    Complete,
    Size,
    Name,
    Files,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Self::State,
        Self::Progress,
        Self::DownloadRate,
        Self::UploadRate,
        Self::EstimatedTime,
        Self::TotalDownloaded,
        Self::TotalUploaded,
        Self::Ratio,
        Self::Complete,
        Self::Size,
        Self::Name,
        Self::Files,
    ];
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Change-tracked view of a torrent held by an [`Engine`].
///
/// The engine is polled once per [`StatusSnapshot::update`]. Every published field is cached, and
/// subscribers hear about a field only when its freshly computed value differs from the cached
/// one. The per-file snapshots are created the first time the torrent is seen downloading and
/// are kept for the life of the snapshot, whatever state the torrent moves to afterwards.
///
/// `update` takes `&mut self`, so there is a single writer; readers on other threads need to go
/// through whatever lock owns the snapshot.
#[derive(Debug)]
pub struct StatusSnapshot<E> {
    engine: E,
    min_eta_progress: Percent,
    notifier: Notifier<Field>,
    state: Tracked<TorrentState>,
    progress: Tracked<Percent>,
    download_rate: Tracked<TransferRate>,
    upload_rate: Tracked<TransferRate>,
    estimated_time: Tracked<Estimate<Duration>>,
    total_downloaded: Tracked<Size>,
    total_uploaded: Tracked<Size>,
    ratio: Tracked<Estimate<f64>>,
    complete: Tracked<bool>,
    size: Tracked<Estimate<Size>>,
    name: Tracked<String>,
    files: Option<Vec<FileSnapshot>>,
}

impl<E: Engine> StatusSnapshot<E> {
    pub fn new(engine: E) -> Result<Self> {
        Self::with_config(engine, &Config::default())
    }

    /// Binds a snapshot to `engine` and performs the first refresh.
    ///
    /// Fails if the engine cannot be queried.
    pub fn with_config(engine: E, config: &Config) -> Result<Self> {
        let mut snapshot = Self {
            engine,
            min_eta_progress: config.min_eta_progress,
            notifier: Notifier::default(),
            state: Tracked::default(),
            progress: Tracked::default(),
            download_rate: Tracked::default(),
            upload_rate: Tracked::default(),
            estimated_time: Tracked::default(),
            total_downloaded: Tracked::new(Size::from_const(0)),
            total_uploaded: Tracked::new(Size::from_const(0)),
            ratio: Tracked::default(),
            complete: Tracked::default(),
            size: Tracked::default(),
            name: Tracked::default(),
            files: None,
        };
        snapshot.update()?;
        Ok(snapshot)
    }

    pub fn update(&mut self) -> Result<()> {
        self.update_at(Instant::now())
    }

    /// Polls the engine and publishes every field whose value changed.
    ///
    /// If the engine query fails nothing is published and the error is returned; the cached
    /// values stay as they were after the previous successful refresh.
    pub fn update_at(&mut self, now: Instant) -> Result<()> {
        let status = self.engine.status()?;
        let progress = Percent::new(status.progress);
        let estimated_time = self.estimate_time(&status, progress, now);
        let size = self.declared_size(&status);

        let notifier = &mut self.notifier;
        notifier.publish(Field::State, &mut self.state, status.state);
        notifier.publish(Field::Progress, &mut self.progress, progress);
        notifier.publish(Field::DownloadRate, &mut self.download_rate, status.download_rate);
        notifier.publish(Field::UploadRate, &mut self.upload_rate, status.upload_rate);
        notifier.publish(Field::EstimatedTime, &mut self.estimated_time, estimated_time);
        notifier.publish(Field::TotalDownloaded, &mut self.total_downloaded, status.downloaded);
        notifier.publish(Field::TotalUploaded, &mut self.total_uploaded, status.uploaded);
        let ratio = ratio(status.uploaded, status.downloaded);
        notifier.publish(Field::Ratio, &mut self.ratio, ratio);
        notifier.publish(Field::Complete, &mut self.complete, status.complete);
        notifier.publish(Field::Name, &mut self.name, status.name.clone());

        self.materialize_files(&status);
        if self.notifier.publish(Field::Size, &mut self.size, size) {
            debug!("{}: size is {}", status.name, size);
        }

        self.update_files(&status);
        Ok(())
    }

    fn estimate_time(
        &self,
        status: &EngineStatus,
        progress: Percent,
        now: Instant,
    ) -> Estimate<Duration> {
        if status.state == TorrentState::Metadata || progress <= self.min_eta_progress {
            return Estimate::Unknown;
        }
        let elapsed = now.saturating_duration_since(status.started_at);
        Duration::try_from_secs_f64(elapsed.as_secs_f64() * 100.0 / progress.value())
            .ok()
            .into()
    }

    fn materialize_files(&mut self, status: &EngineStatus) {
        if status.state != TorrentState::Downloading || self.files.is_some() {
            return;
        }
        let Some(files) = &status.files else {
            warn!("{}: downloading without file metadata", status.name);
            return;
        };
        debug!("{}: tracking {} files", status.name, files.len());
        self.files = Some(
            files
                .iter()
                .enumerate()
                .map(|(index, file)| FileSnapshot::new(index, file))
                .collect(),
        );
        self.notifier.notify(Field::Files);
    }

    fn declared_size(&self, status: &EngineStatus) -> Estimate<Size> {
        if let Some(size) = status.size {
            return Estimate::Known(size);
        }
        if status.is_magnet && status.state == TorrentState::Downloading {
            if let Some(size) = status.files_length() {
                return Estimate::Known(size);
            }
        }
        *self.size.get()
    }

    fn update_files(&mut self, status: &EngineStatus) {
        let (Some(snapshots), Some(files)) = (&mut self.files, &status.files) else {
            return;
        };
        if snapshots.len() != files.len() {
            warn!(
                "{}: engine reports {} files, tracking {}",
                status.name,
                files.len(),
                snapshots.len()
            );
        }
        for (snapshot, file) in snapshots.iter_mut().zip(files) {
            snapshot.update(file);
        }
    }
}

impl<E> StatusSnapshot<E> {
    pub fn subscribe(&mut self, subscriber: impl FnMut(Field) + Send + 'static) -> SubscriptionId {
        self.notifier.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Subscribes a channel receiving the identifier of every field that changes.
    pub fn changes(&mut self) -> (SubscriptionId, UnboundedReceiver<Field>) {
        self.notifier.channel()
    }

    /// Current value of `field`, formatted for display.
    pub fn render(&self, field: Field) -> String {
        match field {
            Field::State => self.state().to_string(),
            Field::Progress => self.progress().to_string(),
            Field::DownloadRate => self.download_rate().to_string(),
            Field::UploadRate => self.upload_rate().to_string(),
            Field::EstimatedTime => self
                .estimated_time()
                .map(|eta| format!("{}s", eta.as_secs()))
                .to_string(),
            Field::TotalDownloaded => self.total_downloaded().to_string(),
            Field::TotalUploaded => self.total_uploaded().to_string(),
            Field::Ratio => self.ratio().map(|ratio| format!("{:.3}", ratio)).to_string(),
            Field::Complete => self.is_complete().to_string(),
            Field::Size => self.size().to_string(),
            Field::Name => self.name().to_string(),
            Field::Files => self
                .files()
                .map_or_else(|| String::from("none"), |files| format!("{} files", files.len())),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn state(&self) -> TorrentState {
        *self.state.get()
    }

    pub fn progress(&self) -> Percent {
        *self.progress.get()
    }

    pub fn download_rate(&self) -> TransferRate {
        *self.download_rate.get()
    }

    pub fn upload_rate(&self) -> TransferRate {
        *self.upload_rate.get()
    }

    pub fn estimated_time(&self) -> Estimate<Duration> {
        *self.estimated_time.get()
    }

    pub fn total_downloaded(&self) -> Size {
        *self.total_downloaded.get()
    }

    pub fn total_uploaded(&self) -> Size {
        *self.total_uploaded.get()
    }

    /// Uploaded over downloaded bytes; undefined until something was downloaded.
    pub fn ratio(&self) -> Estimate<f64> {
        *self.ratio.get()
    }

    pub fn is_complete(&self) -> bool {
        *self.complete.get()
    }

    pub fn size(&self) -> Estimate<Size> {
        *self.size.get()
    }

    pub fn name(&self) -> &str {
        self.name.get()
    }

    /// `None` until the torrent has been seen downloading.
    pub fn files(&self) -> Option<&[FileSnapshot]> {
        self.files.as_deref()
    }

    pub fn files_mut(&mut self) -> Option<&mut [FileSnapshot]> {
        self.files.as_deref_mut()
    }
}

fn ratio(uploaded: Size, downloaded: Size) -> Estimate<f64> {
    if downloaded.bytes() == 0 {
        return Estimate::Undefined;
    }
    Estimate::Known(uploaded.bytes() as f64 / downloaded.bytes() as f64)
}
