//! VersionStore port - task version の正本（source of truth）
//!
//! VersionStore は以下を提供します：
//! - 現在の version（identifier から）
//! - 過去の version（version_id から）
//!
//! # 設計原則
//! - version chain は後方への単方向リスト（循環なし）
//! - 「存在しない」は `Ok(None)`、ストア障害は `Err(BackendError)`

use async_trait::async_trait;

use crate::domain::{BackendError, TaskVersion, VersionId};

#[async_trait]
pub trait VersionStore: Send + Sync {
    /// `identifier` の最新 version
    async fn current_version(&self, identifier: &str) -> Result<Option<TaskVersion>, BackendError>;

    /// 任意の version（現在・過去を問わない）
    async fn version(&self, version_id: VersionId) -> Result<Option<TaskVersion>, BackendError>;

    /// 全 task（または指定した task）の現在の version
    ///
    /// 存在しない identifier は飛ばす
    async fn current_versions(
        &self,
        identifiers: Option<&[String]>,
    ) -> Result<Vec<TaskVersion>, BackendError>;
}
