use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use size::Size;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use torrent_snapshot::client::{self, Config};
use torrent_snapshot::engine::SimulatedEngine;
use torrent_snapshot::snapshot::{FileField, StatusSnapshot};

const FILES: usize = 3;

type FileChanges = Vec<(usize, UnboundedReceiver<FileField>)>;

struct Args {
    magnet: bool,
    size: Size,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        magnet: false,
        size: Size::from_mebibytes(64),
    };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--magnet" => args.magnet = true,
            mebibytes => args.size = Size::from_mebibytes(mebibytes.parse::<u64>()?),
        }
    }
    Ok(args)
}

/// Subscribes to every file once the snapshot has materialized them.
fn watch_files<E>(snapshot: &mut StatusSnapshot<E>, watched: &mut FileChanges) {
    if !watched.is_empty() {
        return;
    }
    let Some(files) = snapshot.files_mut() else {
        return;
    };
    for file in files {
        let (_, rx) = file.changes();
        watched.push((file.index(), rx));
    }
}

fn log_file_changes<E>(snapshot: &StatusSnapshot<E>, watched: &mut FileChanges) {
    let Some(files) = snapshot.files() else {
        return;
    };
    for (index, rx) in watched.iter_mut() {
        let file = &files[*index];
        while let Ok(field) = rx.try_recv() {
            debug!("{}: {} = {}", file.path().display(), field, file.render(field));
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = parse_args()?;
    let file_size = Size::from_bytes(args.size.bytes() / FILES as i64);
    let files = (1..=FILES)
        .map(|n| (PathBuf::from(format!("demo/part-{}.bin", n)), file_size))
        .collect();
    let mut engine = SimulatedEngine::new("demo", files, Size::from_mebibytes(8));
    if args.magnet {
        engine = engine.with_magnet(Duration::from_secs(3));
    }

    let config = Config::new().with_stop_when_complete(true);
    let mut snapshot = StatusSnapshot::with_config(engine, &config)?;
    let (_, mut changes) = snapshot.changes();
    let mut file_changes = FileChanges::new();
    watch_files(&mut snapshot, &mut file_changes);

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    if snapshot.size().is_known() {
        info!("watching {} ({})", snapshot.name(), snapshot.size());
    } else {
        info!("watching {}, size not yet known", snapshot.name());
    }
    client::run(&mut snapshot, &config, shutdown, |snapshot| {
        while let Ok(field) = changes.try_recv() {
            info!("{} = {}", field, snapshot.render(field));
        }
        watch_files(snapshot, &mut file_changes);
        log_file_changes(snapshot, &mut file_changes);
    })
    .await?;

    if let Some(ratio) = snapshot.ratio().known() {
        info!("share ratio {:.3}", ratio);
    }

    Ok(())
}
