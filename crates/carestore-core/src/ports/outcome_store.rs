//! OutcomeStore port - 記録された outcome の読み書き
//!
//! # 設計原則
//! - outcome は (version_id, occurrence index) に紐づき、移動しない
//! - 範囲検索の基準は「対応する occurrence の開始時刻」

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BackendError, Outcome, VersionId};

#[async_trait]
pub trait OutcomeStore: Send + Sync {
    /// occurrence の開始が `[start, end)` にある `version_id` の outcome
    async fn outcomes(
        &self,
        version_id: VersionId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Outcome>, BackendError>;

    /// 新しい outcome を保存。occurrence に既存の outcome があれば `Conflict`
    async fn insert_outcome(&self, outcome: Outcome) -> Result<Outcome, BackendError>;

    /// 既存 outcome の値を置き換える
    async fn update_outcome(&self, outcome: Outcome) -> Result<Outcome, BackendError>;
}
