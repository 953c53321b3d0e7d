//! Homework Watcher Common
//!
//! watcher本体と共有する設定・エラー・型定義

#![warn(missing_docs)]

/// 設定管理（環境変数からの構築）
pub mod config;

/// エラー型定義
pub mod error;

/// Telegram Bot API の通信メッセージ
pub mod protocol;

/// ホームワーク関連のデータ型
pub mod types;
