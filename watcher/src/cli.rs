//! CLI module for homework-watcher
//!
//! Provides command-line overrides on top of the environment configuration.

use clap::Parser;
use homework_watcher_common::config::WatcherConfig;
use homework_watcher_common::error::WatcherResult;
use std::path::PathBuf;

/// Homework watcher - relays homework review status changes to Telegram
#[derive(Parser, Debug)]
#[command(name = "homework-watcher")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    PRACTICUM_TOKEN                        Homework API OAuth token (required)
    TELEGRAM_TOKEN                         Telegram bot token (required)
    TELEGRAM_CHAT_ID                       Destination chat id (required)
    HOMEWORK_WATCHER_ENDPOINT              Homework API URL
    HOMEWORK_WATCHER_TELEGRAM_API          Telegram Bot API base URL (default: https://api.telegram.org)
    HOMEWORK_WATCHER_RETRY_PERIOD_SECS     Seconds between checks (default: 600)
    HOMEWORK_WATCHER_REQUEST_TIMEOUT_SECS  HTTP request timeout (default: 30)
    HOMEWORK_WATCHER_EMPTY_POLICY          no-update | error (default: no-update)
    HOMEWORK_WATCHER_LOG_LEVEL             Log level (default: info)
    HOMEWORK_WATCHER_LOG_DIR               Directory for daily log files
"#)]
pub struct Cli {
    /// Run a single check and exit
    #[arg(long)]
    pub once: bool,

    /// Seconds to wait between checks
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub retry_period: Option<u64>,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, value_name = "DIR", env = "HOMEWORK_WATCHER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// コマンドライン指定を設定に反映し、反映後の設定を再検証する
    pub fn apply(&self, config: &mut WatcherConfig) -> WatcherResult<()> {
        if let Some(secs) = self.retry_period {
            config.retry_period_secs = secs;
        }
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homework_watcher_common::config::Credentials;
    use serial_test::serial;

    fn base_config() -> WatcherConfig {
        WatcherConfig::new(Credentials {
            practicum_token: "p".to_string(),
            telegram_token: "t".to_string(),
            telegram_chat_id: "1".to_string(),
        })
    }

    #[test]
    #[serial]
    fn test_defaults_without_arguments() {
        std::env::remove_var("HOMEWORK_WATCHER_LOG_DIR");
        let cli = Cli::try_parse_from(["homework-watcher"]).unwrap();
        assert!(!cli.once);
        assert!(cli.retry_period.is_none());
        assert!(cli.log_dir.is_none());
    }

    #[test]
    #[serial]
    fn test_parses_all_flags() {
        let cli = Cli::try_parse_from([
            "homework-watcher",
            "--once",
            "--retry-period",
            "60",
            "--log-dir",
            "/tmp/hw-logs",
        ])
        .unwrap();
        assert!(cli.once);
        assert_eq!(cli.retry_period, Some(60));
        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/hw-logs")));
    }

    #[test]
    #[serial]
    fn test_log_dir_from_environment() {
        std::env::set_var("HOMEWORK_WATCHER_LOG_DIR", "/var/log/hw");
        let cli = Cli::try_parse_from(["homework-watcher"]).unwrap();
        assert_eq!(cli.log_dir, Some(PathBuf::from("/var/log/hw")));
        std::env::remove_var("HOMEWORK_WATCHER_LOG_DIR");
    }

    #[test]
    fn test_rejects_non_numeric_retry_period() {
        assert!(Cli::try_parse_from(["homework-watcher", "--retry-period", "soon"]).is_err());
    }

    #[test]
    fn test_rejects_zero_retry_period() {
        let err = Cli::try_parse_from(["homework-watcher", "--retry-period", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_applied_config_is_validated_again() {
        let mut config = base_config();
        let cli = Cli {
            once: false,
            retry_period: Some(0),
            log_dir: None,
        };
        assert!(cli.apply(&mut config).unwrap_err().is_fatal());
    }

    #[test]
    fn test_apply_overrides_retry_period() {
        let mut config = base_config();
        let cli = Cli::try_parse_from(["homework-watcher", "--retry-period", "5"]).unwrap();
        cli.apply(&mut config).unwrap();
        assert_eq!(config.retry_period_secs, 5);

        let mut config = base_config();
        let cli = Cli {
            once: false,
            retry_period: None,
            log_dir: None,
        };
        cli.apply(&mut config).unwrap();
        assert_eq!(config.retry_period_secs, 600);
    }
}
