use serde::{Deserialize, Serialize};

use super::ids::VersionId;
use super::schedule::Schedule;

/// task の不変な 1 リビジョン
///
/// 同じ task のリビジョンは `identifier` を共有し、`previous_version_id` で
/// 1 つ前を指します。置き換えられたリビジョンも `version_id` で引けます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskVersion {
    pub identifier: String,
    pub version_id: VersionId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version_id: Option<VersionId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub schedule: Schedule,

    pub impacts_adherence: bool,
}

impl TaskVersion {
    /// First revision of a task. Counts towards adherence by default.
    pub fn new(identifier: impl Into<String>, version_id: VersionId, schedule: Schedule) -> Self {
        Self {
            identifier: identifier.into(),
            version_id,
            previous_version_id: None,
            title: None,
            schedule,
            impacts_adherence: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_impacts_adherence(mut self, impacts: bool) -> Self {
        self.impacts_adherence = impacts;
        self
    }

    /// 別の schedule で `self` を置き換える新しいリビジョン
    pub fn supersede(&self, version_id: VersionId, schedule: Schedule) -> Self {
        Self {
            identifier: self.identifier.clone(),
            version_id,
            previous_version_id: Some(self.version_id),
            title: self.title.clone(),
            schedule,
            impacts_adherence: self.impacts_adherence,
        }
    }
}
