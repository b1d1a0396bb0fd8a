//! Runs `wakatime-cli` once per heartbeat.
//!
//! Flushed heartbeats arrive over a channel and are delivered one at a time by
//! a single worker task. Failures are logged and the heartbeat is dropped;
//! there is no retry or dead-letter storage.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use hackatime_config::WakatimeSettings;
use hackatime_types::Heartbeat;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::args::{PlatformPaths, heartbeat_args};

/// Upper bound on a single `wakatime-cli` invocation.
pub const CLI_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("wakatime-cli path not provided")]
    MissingCliPath,
    #[error("failed to spawn {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed waiting for wakatime-cli: {0}")]
    Wait(#[source] std::io::Error),
    #[error("wakatime-cli exited with {0}")]
    NonZeroExit(ExitStatus),
    #[error("wakatime-cli timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Where the wakatime credentials come from.
#[derive(Debug, Clone, Default)]
pub enum SettingsSource {
    /// `~/.wakatime.cfg`, re-read for every heartbeat.
    #[default]
    UserConfig,
    /// An explicit config file, re-read for every heartbeat.
    File(PathBuf),
    /// Fixed settings.
    Fixed(WakatimeSettings),
}

impl SettingsSource {
    fn load(&self) -> WakatimeSettings {
        match self {
            Self::UserConfig => WakatimeSettings::load(),
            Self::File(path) => WakatimeSettings::load_from(path),
            Self::Fixed(settings) => settings.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryClient {
    cli_path: Option<PathBuf>,
    timeout: Duration,
    settings: SettingsSource,
    platform: PlatformPaths,
}

impl DeliveryClient {
    /// A client for `cli_path`, or one that always fails with
    /// [`DeliveryError::MissingCliPath`] when `None`.
    #[must_use]
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self {
            cli_path: cli_path.map(|path| resolve_cli_path(&path)),
            timeout: CLI_TIMEOUT,
            settings: SettingsSource::default(),
            platform: PlatformPaths::for_current_platform(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SettingsSource) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn cli_path(&self) -> Option<&Path> {
        self.cli_path.as_deref()
    }

    /// Arguments that [`deliver`](Self::deliver) would pass for `hb`.
    #[must_use]
    pub fn args_for(&self, hb: &Heartbeat) -> Vec<String> {
        heartbeat_args(hb, &self.settings.load(), &self.platform)
    }

    /// Run `wakatime-cli` for one heartbeat, bounded by the client timeout.
    pub async fn deliver(&self, hb: &Heartbeat) -> Result<(), DeliveryError> {
        let Some(cli_path) = self.cli_path.as_deref() else {
            return Err(DeliveryError::MissingCliPath);
        };

        let mut cmd = Command::new(cli_path);
        cmd.args(self.args_for(hb));
        run_with_timeout(cmd, cli_path, self.timeout).await
    }
}

/// Resolve a bare executable name through `PATH`; anything else is used as given.
fn resolve_cli_path(path: &Path) -> PathBuf {
    if path.components().count() > 1 || path.is_absolute() {
        return path.to_path_buf();
    }
    match which::which(path) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::warn!("{} not found in PATH: {e}", path.display());
            path.to_path_buf()
        }
    }
}

async fn run_with_timeout(
    mut cmd: Command,
    program: &Path,
    timeout: Duration,
) -> Result<(), DeliveryError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| DeliveryError::Spawn {
        path: program.to_path_buf(),
        source,
    })?;

    // On timeout the child is dropped, and `kill_on_drop` reaps it.
    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(result) => result.map_err(DeliveryError::Wait)?,
        Err(_) => return Err(DeliveryError::TimedOut(timeout)),
    };

    if status.success() {
        Ok(())
    } else {
        Err(DeliveryError::NonZeroExit(status))
    }
}

/// Spawn the worker that delivers heartbeats from `rx` in arrival order.
///
/// The worker exits once every sender is dropped.
pub fn spawn_delivery_worker(
    client: DeliveryClient,
    mut rx: mpsc::UnboundedReceiver<Heartbeat>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(hb) = rx.recv().await {
            match client.deliver(&hb).await {
                Ok(()) => tracing::debug!(entity = %hb.entity, "Heartbeat delivered"),
                Err(e) => tracing::warn!(entity = %hb.entity, "Heartbeat dropped: {e}"),
            }
        }
        tracing::debug!("Delivery worker stopped");
    })
}
