//! `file://` URI to filesystem path conversion.

use std::path::{Component, Path, PathBuf};

use tower_lsp::lsp_types::Url;

/// Convert a document URI to a cleaned filesystem path.
///
/// `file://` URIs are percent-decoded (and drive letters handled on Windows).
/// Anything else has the scheme prefix stripped textually, so the entity is
/// never a raw URI.
#[must_use]
pub fn file_uri_to_path(uri: &Url) -> PathBuf {
    if let Ok(path) = uri.to_file_path() {
        return normalize_path(&path);
    }

    let raw = uri.as_str();
    normalize_path(Path::new(raw.strip_prefix("file://").unwrap_or(raw)))
}

/// Lexically resolve `.` and `..` components.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(c),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}
