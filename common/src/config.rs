//! 設定管理
//!
//! WatcherConfig, Credentials等の設定構造体
//!
//! 設定は起動時に一度だけ構築し、ポーリングループへ明示的に渡す。

use crate::error::{WatcherError, WatcherResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// ホームワークAPIトークンの環境変数名
pub const PRACTICUM_TOKEN_ENV: &str = "PRACTICUM_TOKEN";
/// Telegram Botトークンの環境変数名
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
/// 通知先チャットIDの環境変数名
pub const TELEGRAM_CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// 必須の環境変数一覧
pub const REQUIRED_ENV: [&str; 3] = [
    PRACTICUM_TOKEN_ENV,
    TELEGRAM_TOKEN_ENV,
    TELEGRAM_CHAT_ID_ENV,
];

const ENDPOINT_ENV: &str = "HOMEWORK_WATCHER_ENDPOINT";
const TELEGRAM_API_ENV: &str = "HOMEWORK_WATCHER_TELEGRAM_API";
const RETRY_PERIOD_ENV: &str = "HOMEWORK_WATCHER_RETRY_PERIOD_SECS";
const REQUEST_TIMEOUT_ENV: &str = "HOMEWORK_WATCHER_REQUEST_TIMEOUT_SECS";
const EMPTY_POLICY_ENV: &str = "HOMEWORK_WATCHER_EMPTY_POLICY";

/// 認証情報
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// ホームワークAPIのOAuthトークン
    pub practicum_token: String,
    /// Telegram Botトークン
    pub telegram_token: String,
    /// 通知先チャットID
    pub telegram_chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"***")
            .field("telegram_token", &"***")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

/// ホームワーク一覧が空だったときの扱い
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyPolicy {
    /// 更新なしとして扱う（通知しない）
    #[default]
    NoUpdate,
    /// `EmptyResult` エラーとして扱う
    Error,
}

impl FromStr for EmptyPolicy {
    type Err = WatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no-update" | "no_update" | "noupdate" => Ok(EmptyPolicy::NoUpdate),
            "error" => Ok(EmptyPolicy::Error),
            other => Err(WatcherError::Config(format!(
                "unknown empty policy '{other}' (expected 'no-update' or 'error')"
            ))),
        }
    }
}

/// watcher設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// 認証情報
    pub credentials: Credentials,

    /// ホームワークAPIのURL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Telegram Bot APIのベースURL (デフォルト: "https://api.telegram.org")
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,

    /// ポーリング間隔（秒）(デフォルト: 600)
    #[serde(default = "default_retry_period")]
    pub retry_period_secs: u64,

    /// HTTPリクエストのタイムアウト（秒）(デフォルト: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// 空一覧の扱い (デフォルト: no-update)
    #[serde(default)]
    pub empty_policy: EmptyPolicy,
}

fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_retry_period() -> u64 {
    600
}

fn default_request_timeout() -> u64 {
    30
}

impl WatcherConfig {
    /// 認証情報とデフォルト値から設定を作成
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoint: default_endpoint(),
            telegram_api_base: default_telegram_api_base(),
            retry_period_secs: default_retry_period(),
            request_timeout_secs: default_request_timeout(),
            empty_policy: EmptyPolicy::default(),
        }
    }

    /// プロセスの環境変数から設定を構築
    pub fn from_env() -> WatcherResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の変数参照関数から設定を構築
    ///
    /// 必須変数が未設定または空の場合は、欠けている変数をすべて列挙した
    /// `CredentialsMissing` を返す。
    pub fn from_lookup<F>(lookup: F) -> WatcherResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let missing: Vec<String> = REQUIRED_ENV
            .into_iter()
            .filter(|&name| read(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(WatcherError::CredentialsMissing(missing));
        }

        let credentials = Credentials {
            practicum_token: read(PRACTICUM_TOKEN_ENV).unwrap_or_default(),
            telegram_token: read(TELEGRAM_TOKEN_ENV).unwrap_or_default(),
            telegram_chat_id: read(TELEGRAM_CHAT_ID_ENV).unwrap_or_default(),
        };

        let mut config = Self::new(credentials);
        if let Some(endpoint) = read(ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        if let Some(base) = read(TELEGRAM_API_ENV) {
            config.telegram_api_base = base.trim_end_matches('/').to_string();
        }
        config.retry_period_secs = parse_or(
            read(RETRY_PERIOD_ENV),
            RETRY_PERIOD_ENV,
            default_retry_period(),
        );
        config.request_timeout_secs = parse_or(
            read(REQUEST_TIMEOUT_ENV),
            REQUEST_TIMEOUT_ENV,
            default_request_timeout(),
        );
        config.empty_policy = parse_or(
            read(EMPTY_POLICY_ENV),
            EMPTY_POLICY_ENV,
            EmptyPolicy::default(),
        );

        config.validate()?;
        Ok(config)
    }

    /// 設定値の整合性を検証
    pub fn validate(&self) -> WatcherResult<()> {
        if self.retry_period_secs == 0 {
            return Err(WatcherError::Config(
                "retry period must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(WatcherError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(WatcherError::Config(format!(
                "endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }
        Ok(())
    }

    /// ポーリング間隔
    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_secs)
    }

    /// HTTPリクエストのタイムアウト
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 値をパースし、未設定またはパース失敗時はデフォルト値を返す
fn parse_or<T: FromStr>(value: Option<String>, name: &str, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Environment variable '{}' has invalid value '{}', using default",
                name,
                raw
            );
            default
        }),
    }
}
