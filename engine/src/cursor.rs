//! Last known cursor position per document.
//!
//! Save notifications carry no range, so their heartbeats reuse the column
//! recorded by the most recent change to the same document.

use std::collections::HashMap;

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CursorPosition {
    /// 1-indexed; recorded but not read back.
    line: u32,
    /// 0-indexed.
    column: u32,
}

#[derive(Debug, Default)]
pub struct CursorTracker {
    positions: Mutex<HashMap<String, CursorPosition>>,
}

impl CursorTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self, document: &str, line: u32, column: u32) {
        self.positions
            .lock()
            .insert(document.to_string(), CursorPosition { line, column });
    }

    /// Last saved column for `document`, or 0 if none was recorded.
    #[must_use]
    pub fn get(&self, document: &str) -> u32 {
        self.positions
            .lock()
            .get(document)
            .map_or(0, |pos| pos.column)
    }
}
