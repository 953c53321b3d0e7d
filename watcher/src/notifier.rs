//! Telegram通知
//!
//! 固定のチャットへプレーンテキストを送る。送信失敗はログに残すだけで
//! 呼び出し元へは伝播しない。

use async_trait::async_trait;
use homework_watcher_common::config::WatcherConfig;
use homework_watcher_common::error::{WatcherError, WatcherResult};
use homework_watcher_common::protocol::{split_message, SendMessageRequest, TelegramResponse};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// メッセージ送信クライアント
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// `chat_id` へ `text` を送信する
    async fn send_message(&self, chat_id: &str, text: &str) -> WatcherResult<()>;
}

/// Telegram Bot API クライアント
#[derive(Clone)]
pub struct TelegramBot {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramBot {
    /// 新しいBotクライアントを作成
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> WatcherResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WatcherError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// 設定からBotクライアントを作成
    pub fn from_config(config: &WatcherConfig) -> WatcherResult<Self> {
        Self::new(
            config.telegram_api_base.clone(),
            config.credentials.telegram_token.clone(),
            config.request_timeout(),
        )
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }
}

#[async_trait]
impl MessageSender for TelegramBot {
    async fn send_message(&self, chat_id: &str, text: &str) -> WatcherResult<()> {
        let url = self.method_url("sendMessage");

        // 4096文字を超える本文は分割して送る
        for chunk in split_message(text) {
            let payload = SendMessageRequest {
                chat_id: chat_id.to_string(),
                text: chunk,
            };
            // URLにトークンが含まれるため、エラーメッセージからは除く
            let response = self
                .client
                .post(&url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    WatcherError::Notify(format!("sendMessage request failed: {}", e.without_url()))
                })?;

            let status = response.status();
            let body: TelegramResponse<Value> = response.json().await.map_err(|e| {
                WatcherError::Notify(format!(
                    "sendMessage parse failed (HTTP {}): {}",
                    status,
                    e.without_url()
                ))
            })?;
            if !body.ok {
                return Err(WatcherError::Notify(body.description.unwrap_or_else(|| {
                    format!("sendMessage failed with HTTP {status}")
                })));
            }
        }

        Ok(())
    }
}

/// 固定チャットへの通知
pub struct Notifier<M> {
    sender: M,
    chat_id: String,
}

impl<M: MessageSender> Notifier<M> {
    /// 新しい通知クライアントを作成
    pub fn new(sender: M, chat_id: impl Into<String>) -> Self {
        Self {
            sender,
            chat_id: chat_id.into(),
        }
    }

    /// 通知を送信し、届いたかどうかを返す
    ///
    /// 失敗はエラーログに記録するのみで、再送はしない。
    pub async fn notify(&self, text: &str) -> bool {
        match self.sender.send_message(&self.chat_id, text).await {
            Ok(()) => {
                debug!(chat_id = %self.chat_id, "Telegram message sent: {}", text);
                true
            }
            Err(e) => {
                error!(chat_id = %self.chat_id, error = %e, "Telegram message not sent");
                false
            }
        }
    }

    /// 通知先チャットID
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}
