//! 共通型定義
//!
//! ホームワークのレビューステータスとレコード

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// レスポンス中のホームワーク一覧キー
pub const HOMEWORKS_KEY: &str = "homeworks";

/// レスポンス中のサーバー時刻キー（次回の `from_date` に使う）
pub const CURRENT_DATE_KEY: &str = "current_date";

/// レビューステータス
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    /// レビュー完了（合格）
    Approved,
    /// レビュー中
    Reviewing,
    /// レビュー完了（差し戻し）
    Rejected,
}

impl HomeworkStatus {
    /// 既知のステータス一覧
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// API上の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// ステータスに対応する判定文
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => {
                "The work has been reviewed: the reviewer liked everything. Hooray!"
            }
            HomeworkStatus::Reviewing => "The work has been taken for review.",
            HomeworkStatus::Rejected => "The work has been reviewed: the reviewer has comments.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomeworkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HomeworkStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// 検証済みのホームワークレコード
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HomeworkRecord {
    /// ホームワーク名（APIでは `homework_name`）
    #[serde(rename = "homework_name", alias = "name")]
    pub name: String,
    /// レビューステータス
    pub status: HomeworkStatus,
}

impl HomeworkRecord {
    /// 通知用のメッセージを生成
    pub fn message(&self) -> String {
        format!(
            "Homework \"{}\" review status changed. {}",
            self.name,
            self.status.verdict()
        )
    }
}
