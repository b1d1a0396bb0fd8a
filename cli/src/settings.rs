//! Command-line flags and their merge with the TOML config.
//!
//! Precedence is flag, then `config.toml`, then the built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use hackatime_config::HackatimeConfig;
use hackatime_engine::{CLI_TIMEOUT, DEFAULT_PLUGIN, QueueConfig, TrackerConfig};

#[derive(Debug, Default, Parser)]
#[command(
    name = "hackatime-lsp",
    version,
    about = "Language server that sends coding activity to hackatime"
)]
pub struct Args {
    /// Path or bare name of the wakatime-cli executable
    #[arg(long, env = "HACKATIME_WAKATIME_CLI")]
    pub wakatime_cli: Option<PathBuf>,

    /// Plugin name reported with every heartbeat [default: Zed]
    #[arg(long)]
    pub plugin: Option<String>,

    /// Server config file [default: ~/.hackatime-lsp/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Append a JSON line per editor event to this file
    #[arg(long, conflicts_with = "no_audit_log")]
    pub audit_log: Option<PathBuf>,

    /// Disable the audit log
    #[arg(long)]
    pub no_audit_log: bool,
}

/// Everything `main` needs to start the tracker and its delivery client.
#[derive(Debug)]
pub struct Settings {
    pub tracker: TrackerConfig,
    pub cli_path: Option<PathBuf>,
    pub cli_timeout: Duration,
}

impl Settings {
    pub fn resolve(args: Args, config: Option<HackatimeConfig>) -> Self {
        let config = config.unwrap_or_default();
        let delivery = config.delivery.unwrap_or_default();
        let heartbeat = config.heartbeat.unwrap_or_default();
        let audit = config.audit.unwrap_or_default();

        let defaults = TrackerConfig::default();
        let queue = QueueConfig {
            batch_delay: heartbeat
                .batch_delay_secs
                .map_or(defaults.queue.batch_delay, Duration::from_secs),
            max_len: heartbeat.max_queue_len.unwrap_or(defaults.queue.max_len),
        };

        let audit_log = if args.no_audit_log {
            None
        } else if args.audit_log.is_some() {
            args.audit_log
        } else if audit.enabled {
            audit
                .path
                .or_else(hackatime_config::default_audit_log_path)
        } else {
            None
        };

        Self {
            tracker: TrackerConfig {
                plugin: args
                    .plugin
                    .or(config.plugin)
                    .unwrap_or_else(|| DEFAULT_PLUGIN.to_string()),
                debounce: heartbeat
                    .debounce_ms
                    .map_or(defaults.debounce, Duration::from_millis),
                queue,
                audit_log,
            },
            cli_path: args.wakatime_cli.or(delivery.cli_path),
            cli_timeout: delivery
                .timeout_secs
                .map_or(CLI_TIMEOUT, Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml: &str) -> Option<HackatimeConfig> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, toml).unwrap();
        HackatimeConfig::load_from(&path).unwrap()
    }

    #[test]
    fn defaults_without_flags_or_config() {
        let settings = Settings::resolve(Args::default(), None);
        assert_eq!(settings.tracker.plugin, "Zed");
        assert_eq!(settings.tracker.debounce, Duration::from_millis(50));
        assert_eq!(settings.tracker.queue.batch_delay, Duration::from_secs(120));
        assert_eq!(settings.tracker.queue.max_len, 100);
        assert_eq!(settings.cli_timeout, Duration::from_secs(10));
        assert!(settings.cli_path.is_none());
        assert_eq!(
            settings.tracker.audit_log,
            hackatime_config::default_audit_log_path()
        );
    }

    #[test]
    fn config_overrides_defaults() {
        let settings = Settings::resolve(
            Args::default(),
            config(
                r#"
plugin = "Helix"

[delivery]
cli_path = "/opt/wakatime-cli"
timeout_secs = 3

[heartbeat]
debounce_ms = 200
batch_delay_secs = 30
max_queue_len = 5

[audit]
path = "/tmp/audit.log"
"#,
            ),
        );
        assert_eq!(settings.tracker.plugin, "Helix");
        assert_eq!(settings.tracker.debounce, Duration::from_millis(200));
        assert_eq!(settings.tracker.queue.batch_delay, Duration::from_secs(30));
        assert_eq!(settings.tracker.queue.max_len, 5);
        assert_eq!(settings.cli_timeout, Duration::from_secs(3));
        assert_eq!(settings.cli_path, Some(PathBuf::from("/opt/wakatime-cli")));
        assert_eq!(settings.tracker.audit_log, Some(PathBuf::from("/tmp/audit.log")));
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "hackatime-lsp",
            "--plugin",
            "Neovim",
            "--wakatime-cli",
            "/usr/bin/wakatime-cli",
            "--audit-log",
            "/var/log/events.log",
        ])
        .unwrap();
        let settings = Settings::resolve(
            args,
            config(
                r#"
plugin = "Helix"
[delivery]
cli_path = "/opt/wakatime-cli"
[audit]
path = "/tmp/audit.log"
"#,
            ),
        );
        assert_eq!(settings.tracker.plugin, "Neovim");
        assert_eq!(settings.cli_path, Some(PathBuf::from("/usr/bin/wakatime-cli")));
        assert_eq!(
            settings.tracker.audit_log,
            Some(PathBuf::from("/var/log/events.log"))
        );
    }

    #[test]
    fn audit_log_can_be_disabled() {
        let args = Args::try_parse_from(["hackatime-lsp", "--no-audit-log"]).unwrap();
        assert!(Settings::resolve(args, None).tracker.audit_log.is_none());

        let disabled = config("[audit]\nenabled = false\n");
        assert!(
            Settings::resolve(Args::default(), disabled)
                .tracker
                .audit_log
                .is_none()
        );
    }

    #[test]
    fn audit_flags_conflict() {
        let parsed = Args::try_parse_from([
            "hackatime-lsp",
            "--no-audit-log",
            "--audit-log",
            "/tmp/a.log",
        ]);
        assert!(parsed.is_err());
    }
}
