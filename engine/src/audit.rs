//! Append-only JSON-lines audit trail of every handled notification.
//!
//! Entries are written before throttling, so the log records events the
//! pipeline drops too. The file is opened on first use and kept open; a
//! failed open or write drops the entry and the next record tries again.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use hackatime_types::Heartbeat;
use parking_lot::Mutex;
use serde::Serialize;

#[derive(Serialize)]
struct AuditEntry<'a> {
    timestamp: String,
    event: &'a str,
    heartbeat: &'a Heartbeat,
}

#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    // Held for the whole append so entries never interleave.
    file: Mutex<Option<File>>,
}

impl AuditLog {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, event: &str, hb: &Heartbeat) {
        let entry = AuditEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            event,
            heartbeat: hb,
        };
        let Ok(mut line) = serde_json::to_string(&entry) else {
            return;
        };
        line.push('\n');

        let mut slot = self.file.lock();
        if slot.is_none() {
            match OpenOptions::new().create(true).append(true).open(&self.path) {
                Ok(file) => *slot = Some(file),
                Err(e) => {
                    tracing::trace!("Audit log {} unavailable: {e}", self.path.display());
                    return;
                }
            }
        }
        if let Some(file) = slot.as_mut()
            && file.write_all(line.as_bytes()).is_err()
        {
            *slot = None;
        }
    }
}
