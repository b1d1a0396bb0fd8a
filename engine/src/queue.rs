//! Heartbeat queue and batch scheduler.
//!
//! Admitted heartbeats wait here until a flush hands them to the delivery
//! channel. Each flush pops exactly one record from the head:
//!
//! - The first record into an empty queue arms a one-shot batch timer.
//! - When the timer fires it clears itself and flushes; if records remain, it
//!   re-arms.
//! - Reaching `max_len` flushes immediately, bypassing the timer.
//!
//! At most one batch timer is pending at any time. The queue, the timer
//! handle, the last-sent instant and the project context share one lock, and
//! the lock is never held while a record is being delivered.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hackatime_types::Heartbeat;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Delay before a scheduled flush fires.
pub const BATCH_SEND_DELAY: Duration = Duration::from_secs(120);

/// Queue length that triggers an immediate flush.
pub const MAX_QUEUE_LEN: usize = 100;

/// Project the editor opened, captured from `initialize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    /// Base name of the root, sent as `--alternate-project`.
    pub name: Option<String>,
    /// The root itself, sent as `--project-folder`.
    pub folder: String,
}

impl ProjectContext {
    #[must_use]
    pub fn from_root(root: &Path) -> Self {
        Self {
            name: root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            folder: root.to_string_lossy().into_owned(),
        }
    }

    fn fill(&self, hb: &mut Heartbeat) {
        if hb.alternate_project.as_deref().is_none_or(str::is_empty) {
            hb.alternate_project.clone_from(&self.name);
        }
        if hb.project_folder.as_deref().is_none_or(str::is_empty) {
            hb.project_folder = Some(self.folder.clone());
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub batch_delay: Duration,
    pub max_len: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            batch_delay: BATCH_SEND_DELAY,
            max_len: MAX_QUEUE_LEN,
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<Heartbeat>,
    batch_timer: Option<JoinHandle<()>>,
    last_sent: Option<Instant>,
    project: Option<ProjectContext>,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<QueueState>,
    config: QueueConfig,
    dispatch_tx: mpsc::UnboundedSender<Heartbeat>,
}

/// Shared handle to the heartbeat queue. Clones refer to the same queue.
///
/// Must be used from within a tokio runtime: scheduling spawns tasks.
#[derive(Debug, Clone)]
pub struct HeartbeatQueue {
    shared: Arc<Shared>,
}

impl HeartbeatQueue {
    /// Create a queue whose flushes send records to `dispatch_tx`.
    #[must_use]
    pub fn new(config: QueueConfig, dispatch_tx: mpsc::UnboundedSender<Heartbeat>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState::default()),
                config,
                dispatch_tx,
            }),
        }
    }

    /// Record the workspace root used to fill in missing project fields.
    pub fn set_project_root(&self, root: &Path) {
        let project = ProjectContext::from_root(root);
        tracing::info!(folder = %project.folder, "Project root set");
        self.shared.state.lock().project = Some(project);
    }

    #[must_use]
    pub fn project(&self) -> Option<ProjectContext> {
        self.shared.state.lock().project.clone()
    }

    pub fn enqueue(&self, mut hb: Heartbeat) {
        let mut state = self.shared.state.lock();

        if let Some(project) = &state.project {
            project.fill(&mut hb);
        }

        tracing::trace!(entity = %hb.entity, is_write = hb.is_write, "Heartbeat queued");
        state.pending.push_back(hb);

        if state.pending.len() >= self.shared.config.max_len {
            tracing::debug!(len = state.pending.len(), "Queue full, flushing now");
            let shared = Arc::clone(&self.shared);
            tokio::spawn(async move { shared.flush() });
        } else if state.pending.len() == 1 {
            self.shared.schedule_batch_send(&mut state);
        }
    }

    /// Arm the batch timer unless one is already pending.
    pub fn schedule_batch_send(&self) {
        let mut state = self.shared.state.lock();
        self.shared.schedule_batch_send(&mut state);
    }

    /// Pop one heartbeat and hand it to the delivery channel.
    pub fn flush(&self) {
        self.shared.flush();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a batch timer is armed.
    #[must_use]
    pub fn has_pending_flush(&self) -> bool {
        self.shared.state.lock().batch_timer.is_some()
    }

    /// When the most recent flush dispatched a heartbeat.
    #[must_use]
    pub fn last_sent(&self) -> Option<Instant> {
        self.shared.state.lock().last_sent
    }
}

impl Shared {
    fn schedule_batch_send(self: &Arc<Self>, state: &mut QueueState) {
        if state.batch_timer.is_some() {
            return;
        }

        let shared = Arc::clone(self);
        let delay = self.config.batch_delay;
        state.batch_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = shared.state.lock();
            state.batch_timer = None;
            shared.flush_locked(&mut state);
        }));
        tracing::debug!(delay_secs = delay.as_secs(), "Batch send scheduled");
    }

    fn flush(self: &Arc<Self>) {
        let mut state = self.state.lock();
        self.flush_locked(&mut state);
    }

    fn flush_locked(self: &Arc<Self>, state: &mut QueueState) {
        let Some(hb) = state.pending.pop_front() else {
            return;
        };

        tracing::debug!(
            entity = %hb.entity,
            remaining = state.pending.len(),
            "Flushing heartbeat"
        );
        if self.dispatch_tx.send(hb).is_err() {
            tracing::warn!("Delivery worker gone; heartbeat dropped");
        }
        state.last_sent = Some(Instant::now());

        if !state.pending.is_empty() {
            self.schedule_batch_send(state);
        }
    }
}
