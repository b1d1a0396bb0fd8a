//! Heartbeat pipeline for hackatime-lsp.
//!
//! ```text
//! DocumentEvent -> Tracker::handle -> AuditLog
//!                                  -> EventThrottle -> HeartbeatQueue
//!                                                        | flush (one record)
//!                                                        v
//!                                     delivery worker -> DeliveryClient -> wakatime-cli
//! ```
//!
//! The [`Tracker`] is the single service object that owns all mutable state.
//! It is constructed once at startup and shared with the LSP handlers.

pub mod args;
pub mod audit;
pub mod cursor;
pub mod delivery;
pub mod queue;
pub mod throttle;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use hackatime_types::{ContentChange, DocumentEvent, Heartbeat, count_lines};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use audit::AuditLog;
pub use cursor::CursorTracker;
pub use delivery::{CLI_TIMEOUT, DeliveryClient, DeliveryError, SettingsSource};
pub use queue::{BATCH_SEND_DELAY, HeartbeatQueue, MAX_QUEUE_LEN, ProjectContext, QueueConfig};
pub use throttle::{DEBOUNCE_WINDOW, EventThrottle};

/// Plugin name reported when none is configured.
pub const DEFAULT_PLUGIN: &str = "Zed";

/// Runtime settings for the [`Tracker`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub plugin: String,
    pub debounce: Duration,
    pub queue: QueueConfig,
    /// JSON-lines audit log; `None` disables it.
    pub audit_log: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            plugin: DEFAULT_PLUGIN.to_string(),
            debounce: DEBOUNCE_WINDOW,
            queue: QueueConfig::default(),
            audit_log: None,
        }
    }
}

/// Turns editor notifications into heartbeats and feeds the delivery pipeline.
#[derive(Debug)]
pub struct Tracker {
    plugin: String,
    cursors: CursorTracker,
    throttle: EventThrottle,
    queue: HeartbeatQueue,
    audit: Option<AuditLog>,
}

impl Tracker {
    /// Build the tracker and spawn its delivery worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: TrackerConfig, client: DeliveryClient) -> (Self, JoinHandle<()>) {
        let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();
        let worker = delivery::spawn_delivery_worker(client, dispatch_rx);
        (Self::with_dispatch(config, dispatch_tx), worker)
    }

    /// Build the tracker around an existing dispatch channel.
    #[must_use]
    pub fn with_dispatch(
        config: TrackerConfig,
        dispatch_tx: mpsc::UnboundedSender<Heartbeat>,
    ) -> Self {
        Self {
            plugin: config.plugin,
            cursors: CursorTracker::new(),
            throttle: EventThrottle::new(config.debounce),
            queue: HeartbeatQueue::new(config.queue, dispatch_tx),
            audit: config.audit_log.map(AuditLog::new),
        }
    }

    pub fn set_project_root(&self, root: &Path) {
        self.queue.set_project_root(root);
    }

    #[must_use]
    pub fn queue(&self) -> &HeartbeatQueue {
        &self.queue
    }

    /// Handle one editor notification.
    ///
    /// Returns whether the throttle admitted the resulting heartbeat.
    pub fn handle(&self, event: &DocumentEvent) -> bool {
        let hb = self.build_heartbeat(event);

        if let Some(audit) = &self.audit {
            audit.record(event.kind(), &hb);
        }

        if !self.throttle.admit(&hb.entity, hb.is_write) {
            tracing::trace!(entity = %hb.entity, "Event debounced");
            return false;
        }

        self.queue.enqueue(hb);
        true
    }

    fn build_heartbeat(&self, event: &DocumentEvent) -> Heartbeat {
        let mut hb = Heartbeat::new(event.entity(), self.plugin.as_str(), unix_time_now());

        match event {
            DocumentEvent::Changed { entity, changes } => {
                if changes.len() > 1 {
                    tracing::trace!(
                        entity = %entity,
                        ignored = changes.len() - 1,
                        "Only the first content change is used"
                    );
                }
                match changes.first() {
                    Some(ContentChange::Incremental { range_start, text }) => {
                        hb.line_number = range_start.line.saturating_add(1);
                        hb.cursor_pos = range_start.character;
                        hb.lines = count_lines(text);
                    }
                    Some(ContentChange::Full { text }) => {
                        hb.lines = count_lines(text);
                    }
                    None => {}
                }
                self.cursors.save(entity, hb.line_number, hb.cursor_pos);
            }
            DocumentEvent::Saved { entity, text } => {
                hb.lines = text.as_deref().map_or(1, count_lines);
                hb.cursor_pos = self.cursors.get(entity);
                hb.is_write = true;
            }
        }

        hb
    }
}

/// Seconds since the Unix epoch with millisecond precision.
fn unix_time_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
