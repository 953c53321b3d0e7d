//! 通信プロトコル定義
//!
//! Telegram Bot API とのメッセージ

use serde::{Deserialize, Serialize};

/// Telegram の1メッセージあたりの最大文字数
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// sendMessage リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageRequest {
    /// 送信先チャットID
    pub chat_id: String,
    /// 本文（プレーンテキスト）
    pub text: String,
}

/// Bot API 共通のレスポンスエンベロープ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelegramResponse<T> {
    /// 成功フラグ
    pub ok: bool,
    /// 失敗時の説明
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 成功時の結果
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

/// 本文を Telegram の文字数制限ごとに分割する
///
/// 空文字列の場合は空のベクタを返す。
pub fn split_message(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(TELEGRAM_MESSAGE_LIMIT)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
