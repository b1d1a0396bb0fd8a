//! Read-only access to the user's `~/.wakatime.cfg`.
//!
//! The file is a loose `key = value` format. Blank lines and `#` comments are
//! skipped, section headers are ignored (they contain no `=`), and the first
//! occurrence of a key wins. Any failure to locate or read the file is treated
//! as "value absent".

use std::path::{Path, PathBuf};

const API_KEY: &str = "apiKey";
const API_URL: &str = "apiUrl";

/// Credentials forwarded to `wakatime-cli` on every heartbeat.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct WakatimeSettings {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
}

// Manual Debug impl to prevent leaking the API key in logs.
impl std::fmt::Debug for WakatimeSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WakatimeSettings")
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl WakatimeSettings {
    /// Parse the contents of a wakatime config file.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self {
            api_key: lookup(content, API_KEY),
            api_url: lookup(content, API_URL),
        }
    }

    /// Read settings from `path`. Unreadable files yield empty settings.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(err) => {
                tracing::trace!("No wakatime config at {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Read settings from `~/.wakatime.cfg`.
    #[must_use]
    pub fn load() -> Self {
        config_file_path().map_or_else(Self::default, |path| Self::load_from(&path))
    }
}

/// Value of the first `key` line, or `None` when missing or empty.
#[must_use]
pub fn lookup(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `~/.wakatime.cfg`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".wakatime.cfg"))
}

/// `~/.wakatime/wakatime.log`
#[must_use]
pub fn log_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".wakatime").join("wakatime.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_skips_comments() {
        let content = "\
[settings]
# apiKey = commented-out
apiKey = waka_123
apiUrl=https://hackatime.hackclub.com/api/hackatime/v1
";
        let settings = WakatimeSettings::parse(content);
        assert_eq!(settings.api_key.as_deref(), Some("waka_123"));
        assert_eq!(
            settings.api_url.as_deref(),
            Some("https://hackatime.hackclub.com/api/hackatime/v1")
        );
    }

    #[test]
    fn first_matching_key_wins() {
        let content = "apiKey = first\napiKey = second\n";
        assert_eq!(lookup(content, "apiKey").as_deref(), Some("first"));
    }

    #[test]
    fn value_may_contain_equals() {
        let content = "apiUrl = https://example.com/?a=b\n";
        assert_eq!(
            lookup(content, "apiUrl").as_deref(),
            Some("https://example.com/?a=b")
        );
    }

    #[test]
    fn other_keys_are_not_consulted() {
        let settings = WakatimeSettings::parse("api_key = snake\nhidefilenames = true\n");
        assert_eq!(settings, WakatimeSettings::default());
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let settings = WakatimeSettings::load_from(&dir.path().join("nope.cfg"));
        assert!(settings.api_key.is_none());
        assert!(settings.api_url.is_none());
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".wakatime.cfg");
        std::fs::write(&path, "[settings]\napiKey = abc\n").unwrap();
        let settings = WakatimeSettings::load_from(&path);
        assert_eq!(settings.api_key.as_deref(), Some("abc"));
        assert!(settings.api_url.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let settings = WakatimeSettings {
            api_key: Some("secret-key".to_string()),
            api_url: None,
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
