//! CareEngine - 外部に公開する操作の表面
//!
//! 各操作は `async` で、1 回の呼び出しにつき成功か失敗のどちらか 1 つだけを返します。
//! 結果は `.await` した側のタスクに届き、並行処理は builder で指定した runtime 上で行われます。

use super::adherence::AdherenceAggregator;
use super::insights::InsightAggregator;
use super::outcome_log::OutcomeLogger;
use super::resolver::EventResolver;
use crate::config::EngineConfig;
use crate::domain::{Adherence, DateRange, EngineError, Event, Outcome, OutcomeValue, Value, VersionId};

/// [`EngineBuilder`](super::EngineBuilder) で構築する
#[derive(Clone)]
pub struct CareEngine {
    resolver: EventResolver,
    adherence: AdherenceAggregator,
    insights: InsightAggregator,
    logger: OutcomeLogger,
    config: EngineConfig,
}

impl CareEngine {
    pub(crate) fn new(
        resolver: EventResolver,
        adherence: AdherenceAggregator,
        insights: InsightAggregator,
        logger: OutcomeLogger,
        config: EngineConfig,
    ) -> Self {
        Self {
            resolver,
            adherence,
            insights,
            logger,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn resolve_events(
        &self,
        identifier: &str,
        range: DateRange,
    ) -> Result<Vec<Event>, EngineError> {
        self.resolver.resolve_events(identifier, range).await
    }

    pub async fn compute_adherence(
        &self,
        identifiers: Option<&[String]>,
        range: DateRange,
    ) -> Result<Vec<Adherence>, EngineError> {
        self.adherence.compute_adherence(identifiers, range).await
    }

    pub async fn compute_insights<F>(
        &self,
        identifier: &str,
        range: DateRange,
        reducer: F,
    ) -> Result<Vec<f64>, EngineError>
    where
        F: Fn(&[Event]) -> f64,
    {
        self.insights.compute_insights(identifier, range, reducer).await
    }

    pub async fn fetch_event(
        &self,
        version_id: VersionId,
        occurrence_index: usize,
    ) -> Result<Event, EngineError> {
        self.resolver.fetch_event(version_id, occurrence_index).await
    }

    pub async fn fetch_outcome(
        &self,
        version_id: VersionId,
        occurrence_index: usize,
    ) -> Result<Outcome, EngineError> {
        self.resolver.fetch_outcome(version_id, occurrence_index).await
    }

    pub async fn log_values(
        &self,
        version_id: VersionId,
        occurrence_index: usize,
        values: Vec<OutcomeValue>,
    ) -> Result<Outcome, EngineError> {
        self.logger.log_values(version_id, occurrence_index, values).await
    }

    pub async fn log_value(
        &self,
        version_id: VersionId,
        occurrence_index: usize,
        value: impl Into<Value>,
    ) -> Result<Outcome, EngineError> {
        self.logger.log_value(version_id, occurrence_index, value).await
    }

    pub async fn remove_value(
        &self,
        version_id: VersionId,
        occurrence_index: usize,
        position: usize,
    ) -> Result<Outcome, EngineError> {
        self.logger.remove_value(version_id, occurrence_index, position).await
    }
}
