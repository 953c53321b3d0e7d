//! ロギング初期化
//!
//! 標準出力と（指定時は）日次ローテーションのログファイルへ出力する。
//! ライブラリ側はグローバルなsubscriberを設定しない。バイナリのみが呼び出す。

use homework_watcher_common::error::{WatcherError, WatcherResult};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// ログレベルの環境変数名
pub const LOG_LEVEL_ENV: &str = "HOMEWORK_WATCHER_LOG_LEVEL";

/// ログファイル名のプレフィックス
pub const LOG_FILE_PREFIX: &str = "homework-watcher.log";

const DEFAULT_LOG_LEVEL: &str = "info";

/// ログフィルタ文字列を決定する（未設定・空なら `info`）
pub fn log_filter(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// グローバルsubscriberを初期化する
///
/// `log_dir` が指定された場合はファイル出力も行う。返されたガードは
/// プロセス終了まで保持すること（破棄するとファイル出力が止まる）。
pub fn init(log_dir: Option<&Path>) -> WatcherResult<Option<WorkerGuard>> {
    let directive = log_filter(std::env::var(LOG_LEVEL_ENV).ok());
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| WatcherError::Config(format!("invalid log filter '{directive}': {e}")))?;

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                WatcherError::Config(format!(
                    "failed to create log directory {}: {e}",
                    dir.display()
                ))
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|e| WatcherError::Config(format!("failed to initialize logging: {e}")))?;

    Ok(guard)
}
