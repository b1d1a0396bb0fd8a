//! The heartbeat record: one observed unit of coding activity.

use serde::{Deserialize, Serialize};

/// Kind of entity a heartbeat refers to. Only files are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    #[default]
    File,
}

/// Activity category reported alongside each heartbeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "coding")]
    Coding,
    #[serde(rename = "building")]
    Building,
    #[serde(rename = "indexing")]
    Indexing,
    #[serde(rename = "debugging")]
    Debugging,
    #[serde(rename = "writing docs")]
    WritingDocs,
    #[serde(rename = "code reviewing")]
    CodeReviewing,
}

impl Category {
    /// Value passed to `--category`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coding => "coding",
            Self::Building => "building",
            Self::Indexing => "indexing",
            Self::Debugging => "debugging",
            Self::WritingDocs => "writing docs",
            Self::CodeReviewing => "code reviewing",
        }
    }
}

/// A single activity observation destined for `wakatime-cli`.
///
/// `entity` is always a normalized filesystem path, never a `file://` URI.
/// The serialized field names match the audit log format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub entity: String,
    pub entity_type: EntityType,
    pub category: Category,
    /// Seconds since the Unix epoch, millisecond precision.
    pub time: f64,
    pub plugin: String,
    /// 1-indexed line number.
    #[serde(rename = "lineno")]
    pub line_number: u32,
    /// 0-indexed column.
    #[serde(rename = "cursorpos")]
    pub cursor_pos: u32,
    #[serde(rename = "lines_in_file")]
    pub lines: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_folder: Option<String>,
    #[serde(default)]
    pub is_write: bool,
    #[serde(default, rename = "is_unsaved_entity")]
    pub is_unsaved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_line_changes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_line_changes: Option<u32>,
}

impl Heartbeat {
    /// A `coding` heartbeat for `entity` at line 1, column 0, in a one-line file.
    #[must_use]
    pub fn new(entity: impl Into<String>, plugin: impl Into<String>, time: f64) -> Self {
        Self {
            entity: entity.into(),
            entity_type: EntityType::File,
            category: Category::Coding,
            time,
            plugin: plugin.into(),
            line_number: 1,
            cursor_pos: 0,
            lines: 1,
            alternate_project: None,
            project_folder: None,
            is_write: false,
            is_unsaved: false,
            local_file: None,
            ai_line_changes: None,
            human_line_changes: None,
        }
    }
}

/// Number of `\n`-separated segments in `text`.
///
/// An empty string counts as one line, and a trailing newline opens a new one.
#[must_use]
pub fn count_lines(text: &str) -> u32 {
    let segments = text.bytes().filter(|b| *b == b'\n').count() + 1;
    u32::try_from(segments).unwrap_or(u32::MAX)
}
