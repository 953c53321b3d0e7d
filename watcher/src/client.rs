//! ホームワークAPIクライアント
//!
//! `from_date` 以降のレビューステータス更新を1回のGETで取得する。
//! リトライは行わず、再取得はポーリングループの次サイクルに任せる。

use async_trait::async_trait;
use chrono::Utc;
use homework_watcher_common::config::WatcherConfig;
use homework_watcher_common::error::{WatcherError, WatcherResult};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// ステータス更新の取得元
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// `from_date`（UNIX秒）以降の更新を取得する
    ///
    /// `None` の場合は現在時刻を使う。
    async fn fetch_updates(&self, from_date: Option<i64>) -> WatcherResult<Value>;
}

/// reqwestによるホームワークAPIクライアント
#[derive(Clone)]
pub struct PracticumClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// 新しいクライアントを作成
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> WatcherResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WatcherError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    /// 設定からクライアントを作成
    pub fn from_config(config: &WatcherConfig) -> WatcherResult<Self> {
        Self::new(
            config.endpoint.clone(),
            config.credentials.practicum_token.clone(),
            config.request_timeout(),
        )
    }
}

#[async_trait]
impl HomeworkSource for PracticumClient {
    async fn fetch_updates(&self, from_date: Option<i64>) -> WatcherResult<Value> {
        let from_date = from_date.unwrap_or_else(|| Utc::now().timestamp());
        debug!(endpoint = %self.endpoint, from_date, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatcherError::StatusCode(status.as_u16()));
        }

        let body = response.bytes().await.map_err(request_error)?;
        serde_json::from_slice(&body).map_err(|e| WatcherError::Parse(e.to_string()))
    }
}

/// トランスポート層のエラーを `Request` に分類する
fn request_error(err: reqwest::Error) -> WatcherError {
    if err.is_timeout() {
        WatcherError::Request(format!("request timed out: {err}"))
    } else {
        WatcherError::Request(err.to_string())
    }
}
