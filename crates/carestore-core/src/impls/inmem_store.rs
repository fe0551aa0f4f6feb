//! InMemoryCareStore - 開発用の VersionStore + OutcomeStore
//!
//! # 実装詳細
//! - 1 つの `RwLock` の中に versions / current / outcomes を保持
//! - version chain は `put_version` でのみ伸びる（循環は作れない）
//! - outcome の範囲検索は、その version の `Schedule` から occurrence の開始時刻を求めて判定

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{BackendError, Outcome, TaskVersion, VersionId};
use crate::ports::{OutcomeStore, VersionStore};

#[derive(Default)]
struct StoreState {
    versions: HashMap<VersionId, TaskVersion>,

    /// identifier -> newest version. Ordered so listings are deterministic.
    current: BTreeMap<String, VersionId>,

    /// version -> occurrence index -> outcome
    outcomes: HashMap<VersionId, BTreeMap<usize, Outcome>>,
}

impl StoreState {
    fn put_version(&mut self, version: TaskVersion) -> Result<(), BackendError> {
        if self.versions.contains_key(&version.version_id) {
            return Err(BackendError::Conflict(format!(
                "{} already exists",
                version.version_id
            )));
        }
        let current = self.current.get(&version.identifier).copied();
        match (current, version.previous_version_id) {
            (None, None) => {}
            (Some(current), Some(previous)) if current == previous => {}
            (current, previous) => {
                return Err(BackendError::Conflict(format!(
                    "task {} must supersede its current version (current={:?}, previous={:?})",
                    version.identifier,
                    current.map(|id| id.to_string()),
                    previous.map(|id| id.to_string()),
                )));
            }
        }
        self.current
            .insert(version.identifier.clone(), version.version_id);
        self.versions.insert(version.version_id, version);
        Ok(())
    }

    fn current_version(&self, identifier: &str) -> Option<TaskVersion> {
        let id = self.current.get(identifier)?;
        self.versions.get(id).cloned()
    }
}

/// テスト・デモ用のインメモリストア
#[derive(Clone, Default)]
pub struct InMemoryCareStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryCareStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最初の version、または現在の version を置き換える version を追加
    ///
    /// `previous_version_id` が現在の version を指していなければ `Conflict`
    pub async fn put_version(&self, version: TaskVersion) -> Result<(), BackendError> {
        let mut state = self.state.write().await;
        tracing::debug!(
            identifier = %version.identifier,
            version_id = %version.version_id,
            "storing task version"
        );
        state.put_version(version)
    }

    pub async fn outcome_count(&self) -> usize {
        let state = self.state.read().await;
        state.outcomes.values().map(BTreeMap::len).sum()
    }
}

#[async_trait]
impl VersionStore for InMemoryCareStore {
    async fn current_version(&self, identifier: &str) -> Result<Option<TaskVersion>, BackendError> {
        let state = self.state.read().await;
        Ok(state.current_version(identifier))
    }

    async fn version(&self, version_id: VersionId) -> Result<Option<TaskVersion>, BackendError> {
        let state = self.state.read().await;
        Ok(state.versions.get(&version_id).cloned())
    }

    async fn current_versions(
        &self,
        identifiers: Option<&[String]>,
    ) -> Result<Vec<TaskVersion>, BackendError> {
        let state = self.state.read().await;
        let versions = match identifiers {
            None => state
                .current
                .keys()
                .filter_map(|identifier| state.current_version(identifier))
                .collect(),
            Some(identifiers) => identifiers
                .iter()
                .filter_map(|identifier| state.current_version(identifier))
                .collect(),
        };
        Ok(versions)
    }
}

#[async_trait]
impl OutcomeStore for InMemoryCareStore {
    async fn outcomes(
        &self,
        version_id: VersionId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Outcome>, BackendError> {
        let state = self.state.read().await;
        let Some(version) = state.versions.get(&version_id) else {
            return Ok(Vec::new());
        };
        let Some(outcomes) = state.outcomes.get(&version_id) else {
            return Ok(Vec::new());
        };
        let found = outcomes
            .values()
            .filter(|outcome| {
                version
                    .schedule
                    .occurrence(outcome.task_occurrence_index)
                    .is_some_and(|occurrence| occurrence.start >= start && occurrence.start < end)
            })
            .cloned()
            .collect();
        Ok(found)
    }

    async fn insert_outcome(&self, outcome: Outcome) -> Result<Outcome, BackendError> {
        let mut state = self.state.write().await;
        if !state.versions.contains_key(&outcome.task_version_id) {
            return Err(BackendError::OperationFailed(format!(
                "unknown task version {}",
                outcome.task_version_id
            )));
        }
        let slots = state.outcomes.entry(outcome.task_version_id).or_default();
        if slots.contains_key(&outcome.task_occurrence_index) {
            return Err(BackendError::Conflict(format!(
                "occurrence {} of {} already has an outcome",
                outcome.task_occurrence_index, outcome.task_version_id
            )));
        }
        slots.insert(outcome.task_occurrence_index, outcome.clone());
        Ok(outcome)
    }

    async fn update_outcome(&self, outcome: Outcome) -> Result<Outcome, BackendError> {
        let mut state = self.state.write().await;
        let existing = state
            .outcomes
            .get_mut(&outcome.task_version_id)
            .and_then(|slots| slots.get_mut(&outcome.task_occurrence_index));
        match existing {
            Some(existing) if existing.id == outcome.id => {
                *existing = outcome.clone();
                Ok(outcome)
            }
            Some(_) => Err(BackendError::Conflict(format!(
                "{} does not own occurrence {}",
                outcome.id, outcome.task_occurrence_index
            ))),
            None => Err(BackendError::OperationFailed(format!(
                "no outcome {} to update",
                outcome.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OutcomeId, OutcomeValue, Schedule};
    use chrono::TimeZone;
    use ulid::Ulid;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap()
    }

    fn version_id() -> VersionId {
        VersionId::from_ulid(Ulid::new())
    }

    #[tokio::test]
    async fn put_version_tracks_the_current_revision() {
        let store = InMemoryCareStore::new();
        let v1 = TaskVersion::new("walk", version_id(), Schedule::daily(at(1)));
        let v2 = v1.supersede(version_id(), Schedule::daily(at(10)));

        store.put_version(v1.clone()).await.unwrap();
        store.put_version(v2.clone()).await.unwrap();

        let current = store.current_version("walk").await.unwrap().unwrap();
        assert_eq!(current.version_id, v2.version_id);
        let old = store.version(v1.version_id).await.unwrap().unwrap();
        assert_eq!(old, v1);
    }

    #[tokio::test]
    async fn put_version_rejects_a_broken_chain() {
        let store = InMemoryCareStore::new();
        let v1 = TaskVersion::new("walk", version_id(), Schedule::daily(at(1)));
        store.put_version(v1.clone()).await.unwrap();

        // second "first" version
        let stray = TaskVersion::new("walk", version_id(), Schedule::daily(at(2)));
        assert!(matches!(
            store.put_version(stray).await,
            Err(BackendError::Conflict(_))
        ));

        // duplicate version id
        assert!(matches!(
            store.put_version(v1).await,
            Err(BackendError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn current_versions_skips_unknown_identifiers() {
        let store = InMemoryCareStore::new();
        store
            .put_version(TaskVersion::new("a", version_id(), Schedule::daily(at(1))))
            .await
            .unwrap();
        store
            .put_version(TaskVersion::new("b", version_id(), Schedule::daily(at(1))))
            .await
            .unwrap();

        let all = store.current_versions(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let named = vec!["b".to_string(), "missing".to_string()];
        let some = store.current_versions(Some(&named)).await.unwrap();
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].identifier, "b");
    }

    #[tokio::test]
    async fn outcomes_are_filtered_by_occurrence_start() {
        let store = InMemoryCareStore::new();
        let v1 = TaskVersion::new("walk", version_id(), Schedule::daily(at(1)));
        store.put_version(v1.clone()).await.unwrap();

        for index in [0, 2, 5] {
            let outcome = Outcome::new(
                OutcomeId::from_ulid(Ulid::new()),
                v1.version_id,
                index,
                vec![OutcomeValue::new("done", at(1))],
            );
            store.insert_outcome(outcome).await.unwrap();
        }

        let found = store.outcomes(v1.version_id, at(2), at(6)).await.unwrap();
        let indices: Vec<_> = found.iter().map(|o| o.task_occurrence_index).collect();
        assert_eq!(indices, vec![2]);
        assert_eq!(store.outcome_count().await, 3);
    }

    #[tokio::test]
    async fn insert_rejects_second_outcome_for_an_occurrence() {
        let store = InMemoryCareStore::new();
        let v1 = TaskVersion::new("walk", version_id(), Schedule::daily(at(1)));
        store.put_version(v1.clone()).await.unwrap();

        let first = Outcome::new(OutcomeId::from_ulid(Ulid::new()), v1.version_id, 0, vec![]);
        let second = Outcome::new(OutcomeId::from_ulid(Ulid::new()), v1.version_id, 0, vec![]);
        store.insert_outcome(first.clone()).await.unwrap();

        assert!(matches!(
            store.insert_outcome(second.clone()).await,
            Err(BackendError::Conflict(_))
        ));
        assert!(matches!(
            store.update_outcome(second).await,
            Err(BackendError::Conflict(_))
        ));

        let mut updated = first;
        updated.append_values([OutcomeValue::new(1_i64, at(1))]);
        let stored = store.update_outcome(updated).await.unwrap();
        assert_eq!(stored.values.len(), 1);
    }
}
