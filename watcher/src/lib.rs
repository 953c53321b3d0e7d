//! Homework Watcher
//!
//! ホームワークのレビューステータスをポーリングし、変化をTelegramへ通知する

#![warn(missing_docs)]

/// 共通クレートの再エクスポート
pub use homework_watcher_common as common;

/// ホームワークAPIクライアント
pub mod client;

/// CLIインターフェース
pub mod cli;

/// ステータス解釈（判定文の生成）
pub mod interpreter;

/// ロギング初期化ユーティリティ
pub mod logging;

/// Telegram通知
pub mod notifier;

/// ポーリングループ
pub mod poller;

/// 協調シャットダウン
pub mod shutdown;

/// レスポンス検証
pub mod validator;
