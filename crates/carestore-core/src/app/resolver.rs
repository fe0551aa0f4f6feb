//! EventResolver - version chain を遡って event 列を再構築
//!
//! # アルゴリズム
//! 1. 現在の version を取得（なければ NotFound）
//! 2. 問い合わせ窓を version の有効期間でクリップ
//! 3. occurrence 列と outcome 列を取得し、index で join
//! 4. 前の version があれば、窓の終端をこの version の開始時刻まで縮めて繰り返す
//!
//! 再帰ではなくループで実装しています（chain が長くてもスタックを消費しない）。

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, instrument};

use crate::domain::{
    DateRange, EngineError, Event, FetchStage, Outcome, ScheduledOccurrence, TaskVersion, VersionId,
};
use crate::ports::{OutcomeStore, ScheduleOracle, VersionStore};

/// 1 つの task の event を version 履歴をまたいで解決
///
/// clone は安価（collaborator はすべて共有）
#[derive(Clone)]
pub struct EventResolver {
    versions: Arc<dyn VersionStore>,
    outcomes: Arc<dyn OutcomeStore>,
    schedules: Arc<dyn ScheduleOracle>,
    max_version_depth: usize,
}

impl EventResolver {
    pub fn new(
        versions: Arc<dyn VersionStore>,
        outcomes: Arc<dyn OutcomeStore>,
        schedules: Arc<dyn ScheduleOracle>,
    ) -> Self {
        Self {
            versions,
            outcomes,
            schedules,
            max_version_depth: usize::MAX,
        }
    }

    pub fn with_max_version_depth(mut self, depth: usize) -> Self {
        self.max_version_depth = depth.max(1);
        self
    }

    /// `range` 内の `identifier` の event（古い version が先）
    #[instrument(skip_all, fields(task = identifier))]
    pub async fn resolve_events(
        &self,
        identifier: &str,
        range: DateRange,
    ) -> Result<Vec<Event>, EngineError> {
        let mut version = self
            .versions
            .current_version(identifier)
            .await
            .map_err(|e| EngineError::backend(FetchStage::TaskLookup, e))?
            .ok_or_else(|| EngineError::NotFound(format!("no task with identifier {identifier}")))?;

        let mut window_end = range.end();
        let mut visited = HashSet::new();
        // newest version first
        let mut segments = Vec::new();

        loop {
            if !visited.insert(version.version_id) {
                return Err(EngineError::FetchFailed {
                    stage: FetchStage::VersionLookup,
                    reason: format!("version chain of {identifier} revisits {}", version.version_id),
                    source: None,
                });
            }
            if visited.len() > self.max_version_depth {
                return Err(EngineError::FetchFailed {
                    stage: FetchStage::VersionLookup,
                    reason: format!(
                        "version chain of {identifier} is longer than {} versions",
                        self.max_version_depth
                    ),
                    source: None,
                });
            }

            let previous_id = version.previous_version_id;
            let version_start = version.schedule.start();
            let segment = self.resolve_version(version, range.start(), window_end).await?;
            segments.push(segment);

            let Some(previous_id) = previous_id else {
                break;
            };
            let next_end = window_end.min(version_start);
            if next_end <= range.start() {
                // older versions can only cover time before the query
                break;
            }
            version = self.load_version(previous_id).await?;
            window_end = next_end;
        }

        let events: Vec<Event> = segments.into_iter().rev().flatten().collect();
        debug!(
            versions = visited.len(),
            events = events.len(),
            "resolved events"
        );
        Ok(events)
    }

    /// 指定 version の `occurrence_index` 番目の event
    #[instrument(skip(self), fields(version = %version_id))]
    pub async fn fetch_event(
        &self,
        version_id: VersionId,
        occurrence_index: usize,
    ) -> Result<Event, EngineError> {
        let version = self.load_version(version_id).await?;
        let occurrence = self
            .schedules
            .occurrence(&version, occurrence_index)
            .ok_or_else(|| {
                EngineError::NotFound(format!(
                    "invalid occurrence {occurrence_index} for task version {version_id}"
                ))
            })?;

        // widen by a second on both sides so boundary outcomes are not missed
        let early = occurrence.start - TimeDelta::seconds(1);
        let late = occurrence.end + TimeDelta::seconds(1);
        let outcome = self
            .outcomes
            .outcomes(version_id, early, late)
            .await
            .map_err(|e| EngineError::backend(FetchStage::OutcomeLookup, e))?
            .into_iter()
            .find(|outcome| outcome.task_occurrence_index == occurrence_index);

        let event = Event::new(Arc::new(version), occurrence);
        Ok(match outcome {
            Some(outcome) => event.with_outcome(outcome),
            None => event,
        })
    }

    /// occurrence に記録された outcome。未記録なら `NotFound`
    pub async fn fetch_outcome(
        &self,
        version_id: VersionId,
        occurrence_index: usize,
    ) -> Result<Outcome, EngineError> {
        self.fetch_event(version_id, occurrence_index)
            .await?
            .outcome
            .ok_or_else(|| {
                EngineError::NotFound(format!(
                    "no outcome for occurrence {occurrence_index} of {version_id}"
                ))
            })
    }

    async fn load_version(&self, version_id: VersionId) -> Result<TaskVersion, EngineError> {
        self.versions
            .version(version_id)
            .await
            .map_err(|e| EngineError::backend(FetchStage::VersionLookup, e))?
            .ok_or_else(|| EngineError::NotFound(format!("no task version {version_id}")))
    }

    async fn resolve_version(
        &self,
        version: TaskVersion,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Event>, EngineError> {
        let start = window_start.max(version.schedule.start());
        let end = version
            .schedule
            .end()
            .map_or(window_end, |end| end.min(window_end));
        if start >= end {
            return Ok(Vec::new());
        }

        let occurrences = self.schedules.occurrences(&version, start, end);
        if occurrences.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(stray) = occurrences
            .iter()
            .find(|o| o.start < start || o.start >= end)
        {
            return Err(EngineError::OccurrenceOutsideWindow {
                version_id: version.version_id,
                index: stray.index,
                start: stray.start,
                window_start: start,
                window_end: end,
            });
        }
        let outcomes = self
            .outcomes
            .outcomes(version.version_id, start, end)
            .await
            .map_err(|e| EngineError::backend(FetchStage::OutcomeLookup, e))?;

        debug!(
            version = %version.version_id,
            occurrences = occurrences.len(),
            outcomes = outcomes.len(),
            "joining version window"
        );
        join(Arc::new(version), occurrences, outcomes)
    }
}

/// 各 outcome を対応する occurrence に結び付ける
///
/// `occurrences` は index 順に連続していること
pub fn join(
    task: Arc<TaskVersion>,
    occurrences: Vec<ScheduledOccurrence>,
    outcomes: Vec<Outcome>,
) -> Result<Vec<Event>, EngineError> {
    let Some(offset) = occurrences.first().map(|o| o.index) else {
        return Ok(Vec::new());
    };
    let mut events: Vec<Event> = occurrences
        .into_iter()
        .map(|occurrence| Event::new(Arc::clone(&task), occurrence))
        .collect();

    let len = events.len();
    for outcome in outcomes {
        let index = outcome.task_occurrence_index;
        let slot = index
            .checked_sub(offset)
            .and_then(|position| events.get_mut(position))
            .ok_or(EngineError::IndexOutOfRange {
                version_id: task.version_id,
                index,
                offset,
                len,
            })?;
        slot.outcome = Some(outcome);
    }
    Ok(events)
}
