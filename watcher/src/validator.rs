//! レスポンス検証
//!
//! APIレスポンスが `{"homeworks": [...]}` の形をしているかを確認し、
//! 最新のレコード（先頭要素）を取り出す。レコードの中身は検証しない。

use homework_watcher_common::config::EmptyPolicy;
use homework_watcher_common::error::{WatcherError, WatcherResult};
use homework_watcher_common::types::{CURRENT_DATE_KEY, HOMEWORKS_KEY};
use serde_json::Value;

/// 最新のホームワークレコードを取り出す
///
/// 一覧が空の場合、`EmptyPolicy::NoUpdate` なら `Ok(None)`、
/// `EmptyPolicy::Error` なら `EmptyResult` を返す。
pub fn extract_latest_record(
    response: &Value,
    policy: EmptyPolicy,
) -> WatcherResult<Option<&Value>> {
    let object = response.as_object().ok_or_else(|| {
        WatcherError::Shape(format!(
            "expected a JSON object, got {}",
            json_kind(response)
        ))
    })?;

    let homeworks = object
        .get(HOMEWORKS_KEY)
        .ok_or_else(|| WatcherError::Shape(format!("response has no `{HOMEWORKS_KEY}` key")))?;
    let homeworks = homeworks.as_array().ok_or_else(|| {
        WatcherError::Shape(format!(
            "`{HOMEWORKS_KEY}` is {}, expected an array",
            json_kind(homeworks)
        ))
    })?;

    match (homeworks.first(), policy) {
        (Some(record), _) => Ok(Some(record)),
        (None, EmptyPolicy::NoUpdate) => Ok(None),
        (None, EmptyPolicy::Error) => Err(WatcherError::EmptyResult),
    }
}

/// サーバー時刻（次回の `from_date`）を取り出す
pub fn current_date(response: &Value) -> Option<i64> {
    response.get(CURRENT_DATE_KEY).and_then(Value::as_i64)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
