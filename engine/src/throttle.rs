//! Per-document debounce for change notifications.
//!
//! Editors send `didChange` on every keystroke. Non-write events for a
//! document are admitted at most once per debounce window; saves always pass.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Minimum interval between admitted non-write events for one document.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct EventThrottle {
    window: Duration,
    /// Document id -> time of the last admitted event.
    last_event: Mutex<HashMap<String, Instant>>,
}

impl Default for EventThrottle {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

impl EventThrottle {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_event: Mutex::new(HashMap::new()),
        }
    }

    /// Decide whether an event for `document` becomes a heartbeat.
    pub fn admit(&self, document: &str, is_write: bool) -> bool {
        self.admit_at(document, is_write, Instant::now())
    }

    /// [`admit`](Self::admit) against an explicit clock reading.
    pub fn admit_at(&self, document: &str, is_write: bool, now: Instant) -> bool {
        let mut last_event = self.last_event.lock();

        let admitted = is_write
            || last_event
                .get(document)
                .is_none_or(|last| now.saturating_duration_since(*last) >= self.window);

        if admitted {
            last_event.insert(document.to_string(), now);
        }
        admitted
    }
}
