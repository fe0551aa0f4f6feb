#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;
use ulid::Ulid;

use carestore_core::domain::{BackendError, Outcome, TaskVersion, VersionId};
use carestore_core::impls::InMemoryCareStore;
use carestore_core::ports::{OutcomeStore, VersionStore};

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

pub fn version_id() -> VersionId {
    VersionId::from_ulid(Ulid::new())
}

/// Call counts per port method.
#[derive(Default)]
pub struct Calls {
    pub current_version: AtomicUsize,
    pub version: AtomicUsize,
    pub current_versions: AtomicUsize,
    pub outcomes: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Wraps the in-memory store with call counting and failure injection.
#[derive(Default)]
pub struct InstrumentedStore {
    pub inner: InMemoryCareStore,
    pub calls: Calls,
    failing_outcomes: Mutex<Option<VersionId>>,
    extra_outcomes: Mutex<Vec<Outcome>>,
}

impl InstrumentedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome lookups for `version_id` fail from now on.
    pub async fn fail_outcomes_for(&self, version_id: VersionId) {
        *self.failing_outcomes.lock().await = Some(version_id);
    }

    /// Returned by every outcome lookup of its version, regardless of window.
    pub async fn inject_outcome(&self, outcome: Outcome) {
        self.extra_outcomes.lock().await.push(outcome);
    }
}

#[async_trait]
impl VersionStore for InstrumentedStore {
    async fn current_version(&self, identifier: &str) -> Result<Option<TaskVersion>, BackendError> {
        self.calls.current_version.fetch_add(1, Ordering::SeqCst);
        self.inner.current_version(identifier).await
    }

    async fn version(&self, version_id: VersionId) -> Result<Option<TaskVersion>, BackendError> {
        self.calls.version.fetch_add(1, Ordering::SeqCst);
        self.inner.version(version_id).await
    }

    async fn current_versions(
        &self,
        identifiers: Option<&[String]>,
    ) -> Result<Vec<TaskVersion>, BackendError> {
        self.calls.current_versions.fetch_add(1, Ordering::SeqCst);
        self.inner.current_versions(identifiers).await
    }
}

#[async_trait]
impl OutcomeStore for InstrumentedStore {
    async fn outcomes(
        &self,
        version_id: VersionId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Outcome>, BackendError> {
        self.calls.outcomes.fetch_add(1, Ordering::SeqCst);
        if *self.failing_outcomes.lock().await == Some(version_id) {
            return Err(BackendError::OperationFailed("outcome table offline".into()));
        }
        let mut found = self.inner.outcomes(version_id, start, end).await?;
        found.extend(
            self.extra_outcomes
                .lock()
                .await
                .iter()
                .filter(|o| o.task_version_id == version_id)
                .cloned(),
        );
        Ok(found)
    }

    async fn insert_outcome(&self, outcome: Outcome) -> Result<Outcome, BackendError> {
        self.inner.insert_outcome(outcome).await
    }

    async fn update_outcome(&self, outcome: Outcome) -> Result<Outcome, BackendError> {
        self.inner.update_outcome(outcome).await
    }
}

/// Version store that accepts any links, including broken chains.
#[derive(Default)]
pub struct RawVersionStore {
    versions: HashMap<VersionId, TaskVersion>,
    current: HashMap<String, VersionId>,
}

impl RawVersionStore {
    pub fn new(versions: Vec<TaskVersion>, current: &TaskVersion) -> Arc<Self> {
        let mut store = Self::default();
        store
            .current
            .insert(current.identifier.clone(), current.version_id);
        for version in versions {
            store.versions.insert(version.version_id, version);
        }
        Arc::new(store)
    }
}

#[async_trait]
impl VersionStore for RawVersionStore {
    async fn current_version(&self, identifier: &str) -> Result<Option<TaskVersion>, BackendError> {
        Ok(self
            .current
            .get(identifier)
            .and_then(|id| self.versions.get(id))
            .cloned())
    }

    async fn version(&self, version_id: VersionId) -> Result<Option<TaskVersion>, BackendError> {
        Ok(self.versions.get(&version_id).cloned())
    }

    async fn current_versions(
        &self,
        identifiers: Option<&[String]>,
    ) -> Result<Vec<TaskVersion>, BackendError> {
        let mut found = Vec::new();
        for (identifier, id) in &self.current {
            if identifiers.is_none_or(|names| names.contains(identifier)) {
                found.extend(self.versions.get(id).cloned());
            }
        }
        Ok(found)
    }
}

/// Outcome store with no outcomes.
pub struct NoOutcomes;

#[async_trait]
impl OutcomeStore for NoOutcomes {
    async fn outcomes(
        &self,
        _version_id: VersionId,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<Outcome>, BackendError> {
        Ok(Vec::new())
    }

    async fn insert_outcome(&self, _outcome: Outcome) -> Result<Outcome, BackendError> {
        Err(BackendError::OperationFailed("read only".into()))
    }

    async fn update_outcome(&self, _outcome: Outcome) -> Result<Outcome, BackendError> {
        Err(BackendError::OperationFailed("read only".into()))
    }
}

/// Ids of the seeded fixture tasks.
pub struct Seeded {
    pub meds_v1: VersionId,
    pub meds_v2: VersionId,
    pub journal: VersionId,
}

/// "meds": daily 09:00 from Jan 1 expecting one check-off, superseded on
/// Jan 4 by a daily 10 mg dose. "journal": daily 20:00, not adherence-relevant.
pub async fn seed(store: &InMemoryCareStore) -> Seeded {
    use carestore_core::domain::{Schedule, TargetValue};

    let meds_v1 = TaskVersion::new(
        "meds",
        version_id(),
        Schedule::daily(at(1, 9)).with_targets(vec![TargetValue::Count]),
    );
    let meds_v2 = meds_v1.supersede(
        version_id(),
        Schedule::daily(at(4, 9)).with_targets(vec![TargetValue::measure("mg", 10.0)]),
    );
    let journal = TaskVersion::new("journal", version_id(), Schedule::daily(at(1, 20)))
        .with_impacts_adherence(false);

    let seeded = Seeded {
        meds_v1: meds_v1.version_id,
        meds_v2: meds_v2.version_id,
        journal: journal.version_id,
    };
    for version in [meds_v1, meds_v2, journal] {
        store.put_version(version).await.unwrap();
    }
    seeded
}

/// Jan 1 00:00 up to Jan 7 00:00: seven day buckets.
pub fn first_week() -> carestore_core::DateRange {
    carestore_core::DateRange::days_from(at(1, 0).date_naive(), 6)
}
