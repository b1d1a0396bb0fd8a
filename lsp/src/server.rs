//! `LanguageServer` backend. Only the workspace root and the change/save
//! notifications matter; everything else keeps the tower-lsp defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hackatime_engine::Tracker;
use hackatime_types::{ContentChange, DocumentEvent, Position};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    DidChangeTextDocumentParams, DidSaveTextDocumentParams, InitializeParams, InitializeResult,
    InitializedParams, SaveOptions, ServerCapabilities, ServerInfo, TextDocumentContentChangeEvent,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions,
};
use tower_lsp::LanguageServer;

use crate::uri::{file_uri_to_path, normalize_path};

/// Reports a heartbeat for every edit and save the editor announces.
#[derive(Debug)]
pub struct HeartbeatServer {
    tracker: Arc<Tracker>,
}

impl HeartbeatServer {
    #[must_use]
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for HeartbeatServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        match project_root(&params) {
            Some(root) => self.tracker.set_project_root(&root),
            None => tracing::info!("Editor reported no workspace root"),
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::INCREMENTAL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                        ..TextDocumentSyncOptions::default()
                    },
                )),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("Editor initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutdown requested");
        Ok(())
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        self.tracker.handle(&change_event(params));
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        self.tracker.handle(&save_event(params));
    }
}

/// Workspace root: `rootUri`, then `rootPath`, then the first workspace folder.
#[allow(deprecated)]
fn project_root(params: &InitializeParams) -> Option<PathBuf> {
    if let Some(uri) = &params.root_uri {
        return Some(file_uri_to_path(uri));
    }
    if let Some(path) = params.root_path.as_deref().filter(|p| !p.is_empty()) {
        return Some(normalize_path(Path::new(path)));
    }
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| file_uri_to_path(&folder.uri))
}

fn change_event(params: DidChangeTextDocumentParams) -> DocumentEvent {
    DocumentEvent::Changed {
        entity: entity_for(&params.text_document.uri),
        changes: params
            .content_changes
            .into_iter()
            .map(content_change)
            .collect(),
    }
}

fn content_change(event: TextDocumentContentChangeEvent) -> ContentChange {
    match event.range {
        Some(range) => ContentChange::Incremental {
            range_start: Position::new(range.start.line, range.start.character),
            text: event.text,
        },
        None => ContentChange::Full { text: event.text },
    }
}

fn save_event(params: DidSaveTextDocumentParams) -> DocumentEvent {
    DocumentEvent::Saved {
        entity: entity_for(&params.text_document.uri),
        text: params.text,
    }
}

fn entity_for(uri: &tower_lsp::lsp_types::Url) -> String {
    file_uri_to_path(uri).to_string_lossy().into_owned()
}
