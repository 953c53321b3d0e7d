//! ポーリングループ
//!
//! 1サイクル: 取得 → 検証 → 解釈 → 前回と比較 → 変化があれば通知。
//! どの段階で失敗しても、同じ失敗メッセージは連続して1回しか通知しない。
//! サイクルの後は固定間隔で待機し、シャットダウン要求まで繰り返す。

use crate::client::{HomeworkSource, PracticumClient};
use crate::interpreter::interpret;
use crate::notifier::{MessageSender, Notifier, TelegramBot};
use crate::shutdown::ShutdownController;
use crate::validator::{current_date, extract_latest_record};
use chrono::Utc;
use homework_watcher_common::config::{EmptyPolicy, WatcherConfig};
use homework_watcher_common::error::{WatcherError, WatcherResult};
use std::time::Duration;
use tracing::{debug, error, info};

/// デフォルトのポーリング間隔（秒）
const DEFAULT_RETRY_PERIOD_SECS: u64 = 600;

/// ループ内で保持する状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    /// 最後に届けたステータス通知
    pub last_message: Option<String>,
    /// 最後に届けた失敗通知（成功サイクルでクリア）
    pub last_error: Option<String>,
}

/// 1サイクルの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// ステータス変化を通知した
    Notified,
    /// ステータス変化の通知に失敗した（次サイクルで再試行）
    NotifyFailed,
    /// 前回から変化なし
    Unchanged,
    /// 新しい更新なし（空の一覧）
    NoUpdate,
    /// 取得・検証・解釈のいずれかで失敗した
    Failed {
        /// 発生したエラー
        error: WatcherError,
        /// 失敗通知を届けたか
        notified: bool,
    },
}

/// ホームワークステータスのポーラー
pub struct Poller<S, M> {
    source: S,
    notifier: Notifier<M>,
    state: PollState,
    watermark: i64,
    empty_policy: EmptyPolicy,
    retry_period: Duration,
}

impl Poller<PracticumClient, TelegramBot> {
    /// 設定から本番用のポーラーを作成
    pub fn from_config(config: &WatcherConfig) -> WatcherResult<Self> {
        let source = PracticumClient::from_config(config)?;
        let bot = TelegramBot::from_config(config)?;
        let notifier = Notifier::new(bot, config.credentials.telegram_chat_id.clone());

        Ok(Self::new(source, notifier)
            .with_retry_period(config.retry_period())
            .with_empty_policy(config.empty_policy))
    }
}

impl<S, M> Poller<S, M>
where
    S: HomeworkSource,
    M: MessageSender,
{
    /// 新しいポーラーを作成（ウォーターマークは現在時刻）
    pub fn new(source: S, notifier: Notifier<M>) -> Self {
        Self {
            source,
            notifier,
            state: PollState::default(),
            watermark: Utc::now().timestamp(),
            empty_policy: EmptyPolicy::default(),
            retry_period: Duration::from_secs(DEFAULT_RETRY_PERIOD_SECS),
        }
    }

    /// ポーリング間隔を設定
    pub fn with_retry_period(mut self, retry_period: Duration) -> Self {
        self.retry_period = retry_period;
        self
    }

    /// 空一覧の扱いを設定
    pub fn with_empty_policy(mut self, empty_policy: EmptyPolicy) -> Self {
        self.empty_policy = empty_policy;
        self
    }

    /// 初期ウォーターマークを設定
    pub fn with_watermark(mut self, watermark: i64) -> Self {
        self.watermark = watermark;
        self
    }

    /// 現在の状態
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// 次回リクエストの `from_date`
    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    /// 1サイクル実行する
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.check_updates().await {
            Ok(outcome) => {
                self.state.last_error = None;
                outcome
            }
            Err(err) => self.report_failure(err).await,
        }
    }

    /// シャットダウン要求までサイクルと待機を繰り返す
    pub async fn run(&mut self, shutdown: &ShutdownController) {
        info!(
            retry_period_secs = self.retry_period.as_secs(),
            from_date = self.watermark,
            "Homework watcher started"
        );

        while !shutdown.is_shutdown_requested() {
            let outcome = self.run_cycle().await;
            debug!(?outcome, "Poll cycle finished");

            let retry_period = self.retry_period;
            tokio::select! {
                _ = tokio::time::sleep(retry_period) => {}
                _ = shutdown.wait() => break,
            }
        }

        info!("Homework watcher stopped");
    }

    async fn check_updates(&mut self) -> WatcherResult<CycleOutcome> {
        let response = self.source.fetch_updates(Some(self.watermark)).await?;

        let outcome = match extract_latest_record(&response, self.empty_policy)? {
            Some(record) => {
                let message = interpret(record)?;
                self.deliver_status(message).await
            }
            None => {
                info!(
                    from_date = self.watermark,
                    "No new homework updates, checking again in {}s",
                    self.retry_period.as_secs()
                );
                CycleOutcome::NoUpdate
            }
        };

        // 未達の通知があるうちは同じ区間を再取得する
        if outcome != CycleOutcome::NotifyFailed {
            if let Some(next) = current_date(&response) {
                self.watermark = next;
            }
        }

        Ok(outcome)
    }

    async fn deliver_status(&mut self, message: String) -> CycleOutcome {
        if self.state.last_message.as_deref() == Some(message.as_str()) {
            info!(
                "Homework status unchanged, checking again in {}s",
                self.retry_period.as_secs()
            );
            return CycleOutcome::Unchanged;
        }

        if self.notifier.notify(&message).await {
            info!(message = %message, "Homework status change delivered");
            self.state.last_message = Some(message);
            CycleOutcome::Notified
        } else {
            CycleOutcome::NotifyFailed
        }
    }

    async fn report_failure(&mut self, err: WatcherError) -> CycleOutcome {
        let message = format!("Homework watcher failure: {err}");
        error!(error = %err, "Homework check failed");

        let notified = if self.state.last_error.as_deref() == Some(message.as_str()) {
            debug!("Same failure already reported, not notifying again");
            false
        } else if self.notifier.notify(&message).await {
            self.state.last_error = Some(message);
            true
        } else {
            false
        };

        CycleOutcome::Failed {
            error: err,
            notified,
        }
    }
}
