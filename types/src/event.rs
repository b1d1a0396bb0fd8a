//! Editor document events, decoupled from the LSP wire shapes.

/// 0-indexed line/character position, as reported by the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// One entry of a `didChange` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentChange {
    /// A ranged edit; only the start of the range is kept.
    Incremental { range_start: Position, text: String },
    /// The whole document was replaced.
    Full { text: String },
}

/// An editor notification the tracker turns into a heartbeat.
///
/// `entity` is already a normalized filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    Changed {
        entity: String,
        changes: Vec<ContentChange>,
    },
    Saved {
        entity: String,
        text: Option<String>,
    },
}

impl DocumentEvent {
    #[must_use]
    pub fn entity(&self) -> &str {
        match self {
            Self::Changed { entity, .. } | Self::Saved { entity, .. } => entity,
        }
    }

    /// Tag recorded in the audit log.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Changed { .. } => "TextDocumentDidChange",
            Self::Saved { .. } => "TextDocumentDidSave",
        }
    }
}
