//! ステータス解釈
//!
//! ホームワークレコードからステータスを読み取り、通知文を生成する。
//! 同じ名前とステータスからは常に同じ文が得られる。

use homework_watcher_common::error::{WatcherError, WatcherResult};
use homework_watcher_common::types::{HomeworkRecord, HomeworkStatus};
use serde_json::Value;

/// ホームワーク名のキー（APIが返す名前）
const NAME_KEY: &str = "homework_name";
/// 短縮形のホームワーク名キー
const SHORT_NAME_KEY: &str = "name";
const STATUS_KEY: &str = "status";

/// レコードを検証して型付きのレコードに変換する
pub fn parse_record(record: &Value) -> WatcherResult<HomeworkRecord> {
    let object = record
        .as_object()
        .ok_or_else(|| WatcherError::Shape("homework record is not a JSON object".to_string()))?;

    let name = object
        .get(NAME_KEY)
        .or_else(|| object.get(SHORT_NAME_KEY))
        .and_then(Value::as_str)
        .ok_or(WatcherError::MissingField(NAME_KEY))?;

    let raw_status = object
        .get(STATUS_KEY)
        .ok_or(WatcherError::MissingField(STATUS_KEY))?;
    let status = match raw_status.as_str() {
        Some(status) => status
            .parse::<HomeworkStatus>()
            .map_err(WatcherError::UnknownStatus)?,
        None => return Err(WatcherError::UnknownStatus(raw_status.to_string())),
    };

    Ok(HomeworkRecord {
        name: name.to_string(),
        status,
    })
}

/// レコードから通知文を生成する
pub fn interpret(record: &Value) -> WatcherResult<String> {
    parse_record(record).map(|record| record.message())
}
