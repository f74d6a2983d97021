//! Change-tracked snapshots of a torrent engine's status.
//!
//! A [`StatusSnapshot`] polls an [`Engine`] on every refresh and notifies subscribers about the
//! fields whose values actually changed. Per-file views are kept as [`FileSnapshot`]s once the
//! torrent starts downloading.

pub mod client;
pub mod core;
pub mod engine;
pub mod snapshot;

pub use client::Config;
pub use engine::{Engine, EngineStatus, FileStatus, TorrentState};
pub use snapshot::{Field, FileSnapshot, StatusSnapshot};
