//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! 起動時にのみ発生する致命的エラー（`CredentialsMissing`, `Config`）と、
//! ポーリングループ内で回復可能なエラーを同じ列挙型で表現する。

use thiserror::Error;

/// watcher全体のエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatcherError {
    /// 必須の環境変数が未設定または空
    #[error("Missing required environment variables: {}", .0.join(", "))]
    CredentialsMissing(Vec<String>),

    /// 設定値が不正
    #[error("Configuration error: {0}")]
    Config(String),

    /// API へのリクエストが失敗（接続エラー・タイムアウト）
    #[error("Homework API request failed: {0}")]
    Request(String),

    /// API が成功以外のステータスを返した
    #[error("Homework API returned HTTP {0}")]
    StatusCode(u16),

    /// レスポンスボディがJSONとして解釈できない
    #[error("Failed to parse homework API response: {0}")]
    Parse(String),

    /// レスポンスの構造が想定と異なる
    #[error("Unexpected homework API response: {0}")]
    Shape(String),

    /// ホームワーク一覧が空
    #[error("Homework list is empty")]
    EmptyResult,

    /// ホームワークに必須フィールドがない
    #[error("Homework record has no `{0}` field")]
    MissingField(&'static str),

    /// 未知のレビューステータス
    #[error("Undocumented homework status: {0}")]
    UnknownStatus(String),

    /// Telegram への送信失敗
    #[error("Telegram notification failed: {0}")]
    Notify(String),
}

impl WatcherError {
    /// 起動時のみ発生し、プロセスを終了させるべきエラーか
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CredentialsMissing(_) | Self::Config(_))
    }
}

/// watcher用Result型
pub type WatcherResult<T> = Result<T, WatcherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_missing_lists_every_variable() {
        let err = WatcherError::CredentialsMissing(vec![
            "PRACTICUM_TOKEN".to_string(),
            "TELEGRAM_CHAT_ID".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: PRACTICUM_TOKEN, TELEGRAM_CHAT_ID"
        );
    }

    #[test]
    fn test_status_code_message_carries_code() {
        assert_eq!(
            WatcherError::StatusCode(503).to_string(),
            "Homework API returned HTTP 503"
        );
    }

    #[test]
    fn test_is_fatal() {
        assert!(WatcherError::CredentialsMissing(vec![]).is_fatal());
        assert!(WatcherError::Config("bad".to_string()).is_fatal());
        assert!(!WatcherError::StatusCode(500).is_fatal());
        assert!(!WatcherError::EmptyResult.is_fatal());
        assert!(!WatcherError::Notify("down".to_string()).is_fatal());
    }
}
