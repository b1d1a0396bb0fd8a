//! hackatime-lsp - binary entry point.
//!
//! ```text
//! main() -> Settings::resolve(flags, config.toml) -> Tracker::start()
//!                                                      |
//!                                                      v
//!                          hackatime_lsp::serve(stdin, stdout) until exit/EOF
//! ```

mod settings;

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use hackatime_config::HackatimeConfig;
use hackatime_engine::{DeliveryClient, Tracker};

use settings::{Args, Settings};

const LOG_FILE_NAME: &str = "hackatime-lsp.log";

/// The log file tracing writes to, plus the candidates that had to be skipped.
struct LogTarget {
    path: PathBuf,
    file: File,
    skipped: Vec<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(target) = open_log_target() else {
        // stdout belongs to the editor connection; with no file, drop every event.
        tracing_subscriber::registry().with(filter).init();
        return;
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(target.file)),
        )
        .with(filter)
        .init();

    tracing::info!(path = %target.path.display(), "hackatime-lsp starting");
    for reason in target.skipped {
        tracing::warn!("Skipped log location: {reason}");
    }
}

fn open_log_target() -> Option<LogTarget> {
    let mut skipped = Vec::new();
    for path in log_file_candidates() {
        match create_log_file(&path) {
            Ok(file) => {
                return Some(LogTarget {
                    path,
                    file,
                    skipped,
                });
            }
            Err(e) => skipped.push(format!("{}: {e}", path.display())),
        }
    }
    None
}

fn create_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// `~/.hackatime-lsp/logs/`, then `./.hackatime-lsp/logs/` when there is no home.
fn log_file_candidates() -> Vec<PathBuf> {
    let local = PathBuf::from(".hackatime-lsp");
    hackatime_config::data_dir()
        .into_iter()
        .chain([local])
        .map(|dir| dir.join("logs").join(LOG_FILE_NAME))
        .collect()
}

fn load_config(path: Option<&Path>) -> Option<HackatimeConfig> {
    let loaded = match path {
        Some(path) => HackatimeConfig::load_from(path),
        None => HackatimeConfig::load(),
    };
    // The loader has already logged why a file was rejected.
    loaded.ok().flatten()
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing();

    let config = load_config(args.config.as_deref());
    let settings = Settings::resolve(args, config);

    let client = DeliveryClient::new(settings.cli_path).with_timeout(settings.cli_timeout);
    match client.cli_path() {
        Some(path) => tracing::info!(path = %path.display(), "Using wakatime-cli"),
        None => tracing::warn!("No wakatime-cli configured; heartbeats will be dropped"),
    }
    if let Some(path) = &settings.tracker.audit_log {
        tracing::info!(path = %path.display(), "Audit log enabled");
    }

    let (tracker, _worker) = Tracker::start(settings.tracker, client);
    hackatime_lsp::serve(Arc::new(tracker), tokio::io::stdin(), tokio::io::stdout()).await;
    tracing::info!("hackatime-lsp exiting");
}
