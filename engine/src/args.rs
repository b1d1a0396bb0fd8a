//! `wakatime-cli` argument rendering.

use std::path::PathBuf;

use hackatime_config::WakatimeSettings;
use hackatime_types::Heartbeat;

/// Extra paths passed only on platforms where `wakatime-cli` cannot locate
/// its own config and log files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformPaths {
    pub config_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl PlatformPaths {
    /// `~/.wakatime.cfg` and `~/.wakatime/wakatime.log` on Windows, nothing elsewhere.
    #[must_use]
    pub fn for_current_platform() -> Self {
        if cfg!(windows) {
            Self {
                config_file: hackatime_config::config_file_path(),
                log_file: hackatime_config::log_file_path(),
            }
        } else {
            Self::default()
        }
    }
}

/// Build the argument vector for one heartbeat, in the order `wakatime-cli`
/// documents them.
#[must_use]
pub fn heartbeat_args(
    hb: &Heartbeat,
    settings: &WakatimeSettings,
    platform: &PlatformPaths,
) -> Vec<String> {
    let mut args = vec![
        "--entity".to_string(),
        quote_arg(&hb.entity),
        "--time".to_string(),
        format!("{:.3}", hb.time),
        "--plugin".to_string(),
        quote_arg(&hb.plugin),
        "--lineno".to_string(),
        hb.line_number.to_string(),
        "--cursorpos".to_string(),
        hb.cursor_pos.to_string(),
        "--lines-in-file".to_string(),
        hb.lines.to_string(),
        "--category".to_string(),
        hb.category.as_str().to_string(),
    ];

    if let Some(n) = hb.ai_line_changes.filter(|n| *n > 0) {
        args.extend(["--ai-line-changes".to_string(), n.to_string()]);
    }
    if let Some(n) = hb.human_line_changes.filter(|n| *n > 0) {
        args.extend(["--human-line-changes".to_string(), n.to_string()]);
    }

    push_quoted(&mut args, "--key", settings.api_key.as_deref());
    push_quoted(&mut args, "--api-url", settings.api_url.as_deref());
    push_quoted(
        &mut args,
        "--alternate-project",
        hb.alternate_project.as_deref(),
    );
    push_quoted(&mut args, "--project-folder", hb.project_folder.as_deref());

    if hb.is_write {
        args.push("--write".to_string());
    }

    let config_file = platform.config_file.as_ref().map(|p| p.to_string_lossy());
    push_quoted(&mut args, "--config", config_file.as_deref());
    let log_file = platform.log_file.as_ref().map(|p| p.to_string_lossy());
    push_quoted(&mut args, "--log-file", log_file.as_deref());

    if hb.is_unsaved {
        args.push("--is-unsaved-entity".to_string());
    }

    push_quoted(&mut args, "--local-file", hb.local_file.as_deref());

    args
}

fn push_quoted(args: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        args.push(flag.to_string());
        args.push(quote_arg(value));
    }
}

/// Wrap `arg` in double quotes when it contains whitespace, quotes or
/// backslashes. Embedded quotes are backslash-escaped.
#[must_use]
pub fn quote_arg(arg: &str) -> String {
    if needs_quoting(arg) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

fn needs_quoting(arg: &str) -> bool {
    arg.chars().any(|c| matches!(c, ' ' | '\t' | '"' | '\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heartbeat() -> Heartbeat {
        let mut hb = Heartbeat::new("/a.go", "Zed", 1_700_000_000.5);
        hb.line_number = 4;
        hb.cursor_pos = 5;
        hb.lines = 2;
        hb
    }

    fn value_of<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn quote_arg_with_space() {
        assert_eq!(
            quote_arg("/path/with space.txt"),
            "\"/path/with space.txt\""
        );
    }

    #[test]
    fn quote_arg_plain_is_unchanged() {
        assert_eq!(quote_arg("/plain.txt"), "/plain.txt");
    }

    #[test]
    fn quote_arg_escapes_embedded_quotes() {
        assert_eq!(quote_arg(r#"say "hi""#), r#""say \"hi\"""#);
    }

    #[test]
    fn quote_arg_tab_and_backslash() {
        assert_eq!(quote_arg("a\tb"), "\"a\tb\"");
        assert_eq!(quote_arg(r"C:\src\main.rs"), r#""C:\src\main.rs""#);
    }

    #[test]
    fn required_args_in_order() {
        let args = heartbeat_args(
            &heartbeat(),
            &WakatimeSettings::default(),
            &PlatformPaths::default(),
        );
        assert_eq!(
            args,
            [
                "--entity",
                "/a.go",
                "--time",
                "1700000000.500",
                "--plugin",
                "Zed",
                "--lineno",
                "4",
                "--cursorpos",
                "5",
                "--lines-in-file",
                "2",
                "--category",
                "coding",
            ]
        );
    }

    #[test]
    fn optional_args_follow_fixed_order() {
        let mut hb = heartbeat();
        hb.ai_line_changes = Some(3);
        hb.human_line_changes = Some(0);
        hb.alternate_project = Some("repo".to_string());
        hb.project_folder = Some("/my repo".to_string());
        hb.is_write = true;
        hb.is_unsaved = true;
        hb.local_file = Some("/tmp/a.go".to_string());

        let settings = WakatimeSettings {
            api_key: Some("waka_key".to_string()),
            api_url: Some("https://example.com/api".to_string()),
        };
        let platform = PlatformPaths {
            config_file: Some(PathBuf::from("/home/me/.wakatime.cfg")),
            log_file: Some(PathBuf::from("/home/me/.wakatime/wakatime.log")),
        };

        let args = heartbeat_args(&hb, &settings, &platform);
        let flags: Vec<&str> = args
            .iter()
            .filter(|a| a.starts_with("--"))
            .map(String::as_str)
            .collect();
        assert_eq!(
            flags,
            [
                "--entity",
                "--time",
                "--plugin",
                "--lineno",
                "--cursorpos",
                "--lines-in-file",
                "--category",
                "--ai-line-changes",
                "--key",
                "--api-url",
                "--alternate-project",
                "--project-folder",
                "--write",
                "--config",
                "--log-file",
                "--is-unsaved-entity",
                "--local-file",
            ]
        );
        assert_eq!(value_of(&args, "--ai-line-changes"), Some("3"));
        assert_eq!(value_of(&args, "--key"), Some("waka_key"));
        assert_eq!(value_of(&args, "--project-folder"), Some("\"/my repo\""));
        assert_eq!(value_of(&args, "--local-file"), Some("/tmp/a.go"));
    }

    #[test]
    fn entity_with_space_is_quoted() {
        let mut hb = heartbeat();
        hb.entity = "/path/with space.txt".to_string();
        let args = heartbeat_args(&hb, &WakatimeSettings::default(), &PlatformPaths::default());
        assert_eq!(value_of(&args, "--entity"), Some("\"/path/with space.txt\""));
    }

    #[test]
    fn empty_optionals_are_omitted() {
        let mut hb = heartbeat();
        hb.alternate_project = Some(String::new());
        let args = heartbeat_args(&hb, &WakatimeSettings::default(), &PlatformPaths::default());
        assert!(!args.iter().any(|a| a == "--alternate-project"));
        assert!(!args.iter().any(|a| a == "--write"));
        assert!(!args.iter().any(|a| a == "--key"));
    }

    #[test]
    fn time_has_three_decimals() {
        let mut hb = heartbeat();
        hb.time = 12.0;
        let args = heartbeat_args(&hb, &WakatimeSettings::default(), &PlatformPaths::default());
        assert_eq!(value_of(&args, "--time"), Some("12.000"));
    }

    #[cfg(not(windows))]
    #[test]
    fn no_platform_paths_off_windows() {
        assert_eq!(PlatformPaths::for_current_platform(), PlatformPaths::default());
    }
}
