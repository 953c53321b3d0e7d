//! ポーリングフローの結合テスト
//!
//! ホームワークAPIとTelegram Bot APIをwiremockで立て、
//! 設定からポーラーを組み立ててサイクルを実行する。

use homework_watcher::common::config::WatcherConfig;
use homework_watcher::common::error::WatcherError;
use homework_watcher::common::types::HomeworkStatus;
use homework_watcher::poller::{CycleOutcome, Poller};
use homework_watcher::shutdown::ShutdownController;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    api: MockServer,
    telegram: MockServer,
}

impl Harness {
    async fn start() -> Self {
        let api = MockServer::start().await;
        let telegram = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"message_id": 1}
            })))
            .mount(&telegram)
            .await;

        Self { api, telegram }
    }

    fn config(&self) -> WatcherConfig {
        let vars: HashMap<&str, String> = HashMap::from([
            ("PRACTICUM_TOKEN", "practicum-token".to_string()),
            ("TELEGRAM_TOKEN", "123:abc".to_string()),
            ("TELEGRAM_CHAT_ID", "42".to_string()),
            ("HOMEWORK_WATCHER_ENDPOINT", format!("{}/statuses/", self.api.uri())),
            ("HOMEWORK_WATCHER_TELEGRAM_API", self.telegram.uri()),
            ("HOMEWORK_WATCHER_RETRY_PERIOD_SECS", "1".to_string()),
            ("HOMEWORK_WATCHER_REQUEST_TIMEOUT_SECS", "5".to_string()),
        ]);
        WatcherConfig::from_lookup(|name| vars.get(name).cloned()).unwrap()
    }

    /// 次の1リクエストにだけ応答するモックを追加する
    async fn respond_once(&self, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/statuses/"))
            .and(header("Authorization", "OAuth practicum-token"))
            .respond_with(template)
            .up_to_n_times(1)
            .mount(&self.api)
            .await;
    }

    async fn respond_once_with(&self, body: Value) {
        self.respond_once(ResponseTemplate::new(200).set_body_json(body))
            .await;
    }

    /// Telegramへ送られた本文一覧
    async fn sent_texts(&self) -> Vec<String> {
        self.telegram
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                let body: Value = serde_json::from_slice(&request.body).unwrap();
                assert_eq!(body["chat_id"], "42");
                body["text"].as_str().unwrap().to_string()
            })
            .collect()
    }
}

fn homework(status: &str) -> Value {
    json!({"homeworks": [{"name": "hw1", "status": status}]})
}

#[tokio::test]
async fn test_status_transition_sends_two_notifications() {
    let harness = Harness::start().await;
    harness.respond_once_with(homework("reviewing")).await;
    harness.respond_once_with(homework("approved")).await;
    harness.respond_once_with(homework("approved")).await;

    let mut poller = Poller::from_config(&harness.config()).unwrap();
    assert_eq!(poller.run_cycle().await, CycleOutcome::Notified);
    assert_eq!(poller.run_cycle().await, CycleOutcome::Notified);
    assert_eq!(poller.run_cycle().await, CycleOutcome::Unchanged);

    let sent = harness.sent_texts().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains(HomeworkStatus::Reviewing.verdict()));
    assert!(sent[1].contains("\"hw1\""));
    assert!(sent[1].contains(HomeworkStatus::Approved.verdict()));
}

#[tokio::test]
async fn test_empty_homework_list_is_not_notified() {
    let harness = Harness::start().await;
    harness.respond_once_with(json!({"homeworks": []})).await;

    let mut poller = Poller::from_config(&harness.config()).unwrap();
    assert_eq!(poller.run_cycle().await, CycleOutcome::NoUpdate);
    assert!(harness.sent_texts().await.is_empty());
}

#[tokio::test]
async fn test_repeated_service_unavailable_is_reported_once() {
    let harness = Harness::start().await;
    harness.respond_once(ResponseTemplate::new(503)).await;
    harness.respond_once(ResponseTemplate::new(503)).await;
    harness.respond_once_with(homework("approved")).await;

    let mut poller = Poller::from_config(&harness.config()).unwrap();
    assert_eq!(
        poller.run_cycle().await,
        CycleOutcome::Failed {
            error: WatcherError::StatusCode(503),
            notified: true,
        }
    );
    assert_eq!(
        poller.run_cycle().await,
        CycleOutcome::Failed {
            error: WatcherError::StatusCode(503),
            notified: false,
        }
    );
    assert_eq!(poller.run_cycle().await, CycleOutcome::Notified);

    let sent = harness.sent_texts().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains("503"));
    assert!(sent[1].contains(HomeworkStatus::Approved.verdict()));
}

#[tokio::test]
async fn test_unknown_status_is_reported_not_relayed() {
    let harness = Harness::start().await;
    harness.respond_once_with(homework("lost")).await;

    let mut poller = Poller::from_config(&harness.config()).unwrap();
    let outcome = poller.run_cycle().await;
    assert!(matches!(
        outcome,
        CycleOutcome::Failed {
            error: WatcherError::UnknownStatus(_),
            notified: true,
        }
    ));

    let sent = harness.sent_texts().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("lost"));
    assert!(poller.state().last_message.is_none());
}

#[tokio::test]
async fn test_telegram_outage_does_not_stop_polling() {
    let api = MockServer::start().await;
    let telegram = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "ok": false,
            "description": "Internal Server Error"
        })))
        .mount(&telegram)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(homework("rejected")))
        .mount(&api)
        .await;

    let harness = Harness { api, telegram };
    let mut poller = Poller::from_config(&harness.config()).unwrap();

    assert_eq!(poller.run_cycle().await, CycleOutcome::NotifyFailed);
    assert_eq!(poller.run_cycle().await, CycleOutcome::NotifyFailed);
    assert_eq!(harness.telegram.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_run_loop_polls_until_shutdown() {
    let harness = Harness::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(homework("reviewing")))
        .mount(&harness.api)
        .await;

    let mut poller = Poller::from_config(&harness.config())
        .unwrap()
        .with_retry_period(Duration::from_millis(20));
    let shutdown = ShutdownController::default();
    let stopper = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        stopper.request_shutdown();
    });

    tokio::time::timeout(Duration::from_secs(10), poller.run(&shutdown))
        .await
        .expect("poll loop did not stop after shutdown");

    assert!(harness.api.received_requests().await.unwrap().len() >= 2);
    assert_eq!(harness.sent_texts().await.len(), 1);
}
