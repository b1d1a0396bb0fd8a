//! Core domain types for hackatime-lsp.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! The engine builds [`Heartbeat`]s from [`DocumentEvent`]s; the LSP adapter
//! produces the events.

mod event;
mod heartbeat;

pub use event::{ContentChange, DocumentEvent, Position};
pub use heartbeat::{Category, EntityType, Heartbeat, count_lines};
