//! AdherenceAggregator - 複数 task の event を並行に解決し、日ごとの完了率を計算
//!
//! # 並行モデル
//! - task ごとに 1 つの tokio task を spawn（呼び出し側が指定した runtime 上で）
//! - JoinHandle は spawn 順に保持し、`join_all` で全件の完了を待つ
//! - 共有の可変カウンタは持たない。全件そろってから最初のエラーを判定する
//! - 失敗があれば、他の成功結果は捨てる（部分的な adherence は返さない）

use std::sync::Arc;

use futures::future::join_all;
use tokio::runtime::Handle;
use tracing::{Instrument, debug, info_span, instrument, warn};

use super::grouping::group_by_day;
use super::resolver::EventResolver;
use crate::domain::{
    Adherence, DateRange, EmptyTargetPolicy, EngineError, Event, FetchStage, completion_with_policy,
};
use crate::ports::VersionStore;

#[derive(Clone)]
pub struct AdherenceAggregator {
    resolver: EventResolver,
    versions: Arc<dyn VersionStore>,
    runtime: Handle,
    policy: EmptyTargetPolicy,
}

impl AdherenceAggregator {
    pub fn new(
        resolver: EventResolver,
        versions: Arc<dyn VersionStore>,
        runtime: Handle,
        policy: EmptyTargetPolicy,
    ) -> Self {
        Self {
            resolver,
            versions,
            runtime,
            policy,
        }
    }

    /// `range` の 1 日ごとに 1 つの [`Adherence`] を返す
    ///
    /// `identifiers = None` なら全 task が対象
    #[instrument(skip_all, fields(start = %range.start(), end = %range.end()))]
    pub async fn compute_adherence(
        &self,
        identifiers: Option<&[String]>,
        range: DateRange,
    ) -> Result<Vec<Adherence>, EngineError> {
        let tasks = self
            .versions
            .current_versions(identifiers)
            .await
            .map_err(|e| EngineError::backend(FetchStage::TaskLookup, e))?;

        let identifiers: Vec<String> = tasks
            .into_iter()
            .filter(|task| task.impacts_adherence)
            .map(|task| task.identifier)
            .collect();

        if identifiers.is_empty() {
            debug!("no adherence-impacting tasks");
            return Ok(vec![Adherence::NoTasks; range.day_count()]);
        }

        let events = self.resolve_all(&identifiers, range).await?;
        let days = group_by_day(events, range.start(), range.end());
        Ok(days.iter().map(|day| self.day_adherence(day)).collect())
    }

    fn day_adherence(&self, events: &[Event]) -> Adherence {
        let fractions: Vec<f64> = events
            .iter()
            .filter_map(|event| completion_with_policy(event, self.policy))
            .collect();
        Adherence::from_fractions(&fractions)
    }

    async fn resolve_all(
        &self,
        identifiers: &[String],
        range: DateRange,
    ) -> Result<Vec<Event>, EngineError> {
        let handles: Vec<_> = identifiers
            .iter()
            .map(|identifier| {
                let resolver = self.resolver.clone();
                let identifier = identifier.clone();
                let span = info_span!("resolve_branch", task = %identifier);
                self.runtime.spawn(
                    async move { resolver.resolve_events(&identifier, range).await }.instrument(span),
                )
            })
            .collect();

        // every branch finishes before any result is looked at
        let results = join_all(handles).await;

        let mut events = Vec::new();
        for (identifier, result) in identifiers.iter().zip(results) {
            match result {
                Ok(Ok(resolved)) => events.extend(resolved),
                Ok(Err(err)) => {
                    warn!(task = %identifier, error = %err, "event resolution failed");
                    return Err(EngineError::nested(
                        FetchStage::EventResolution,
                        format!("failed to resolve events for task {identifier}"),
                        err,
                    ));
                }
                Err(join_err) => {
                    warn!(task = %identifier, error = %join_err, "event resolution task aborted");
                    return Err(EngineError::FetchFailed {
                        stage: FetchStage::EventResolution,
                        reason: format!("resolution of task {identifier} did not complete: {join_err}"),
                        source: None,
                    });
                }
            }
        }
        Ok(events)
    }
}
