use std::fmt::Display;
use std::path::{Path, PathBuf};

use size::Size;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::core::{Percent, Tracked};
use crate::engine::{FileStatus, Priority};
use crate::snapshot::notifier::{Notifier, SubscriptionId};

/// Published fields of a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileField {
    Downloaded,
    Progress,
    Priority,
}

impl FileField {
    pub const ALL: [FileField; 3] = [Self::Downloaded, Self::Progress, Self::Priority];
}

impl Display for FileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Change-tracked view of one file inside a torrent.
///
/// Path and length are fixed when the snapshot is created; everything else is refreshed from the
/// engine's file status on every [`FileSnapshot::update`].
#[derive(Debug)]
pub struct FileSnapshot {
    index: usize,
    path: PathBuf,
    length: Size,
    notifier: Notifier<FileField>,
    downloaded: Tracked<Size>,
    progress: Tracked<Percent>,
    priority: Tracked<Priority>,
}

impl FileSnapshot {
    pub fn new(index: usize, file: &FileStatus) -> Self {
        let mut snapshot = Self {
            index,
            path: file.path.clone(),
            length: file.length,
            notifier: Notifier::default(),
            downloaded: Tracked::new(Size::from_const(0)),
            progress: Tracked::new(Percent::ZERO),
            priority: Tracked::new(Priority::default()),
        };
        snapshot.update(file);
        snapshot
    }

    pub fn update(&mut self, file: &FileStatus) {
        let notifier = &mut self.notifier;
        notifier.publish(FileField::Downloaded, &mut self.downloaded, file.downloaded);
        notifier.publish(
            FileField::Progress,
            &mut self.progress,
            Percent::of(file.downloaded, self.length),
        );
        notifier.publish(FileField::Priority, &mut self.priority, file.priority);
    }

    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(FileField) + Send + 'static,
    ) -> SubscriptionId {
        self.notifier.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub fn changes(&mut self) -> (SubscriptionId, UnboundedReceiver<FileField>) {
        self.notifier.channel()
    }

    pub fn render(&self, field: FileField) -> String {
        match field {
            FileField::Downloaded => self.downloaded().to_string(),
            FileField::Progress => self.progress().to_string(),
            FileField::Priority => format!("{:?}", self.priority()),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn length(&self) -> Size {
        self.length
    }

    pub fn downloaded(&self) -> Size {
        *self.downloaded.get()
    }

    pub fn progress(&self) -> Percent {
        *self.progress.get()
    }

    pub fn priority(&self) -> Priority {
        *self.priority.get()
    }
}
