//! EngineBuilder - engine の構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 必須の port（VersionStore, OutcomeStore）が無ければ build() で BuildError
//! - 実行コンテキスト（tokio runtime の Handle）も build() 時に確定させる
//!
//! # 使用例
//! ```ignore
//! let store = Arc::new(InMemoryCareStore::new());
//! let engine = EngineBuilder::new()
//!     .with_store(store)
//!     .with_config(EngineConfig::load(None)?)
//!     .build()?;
//! ```

use std::sync::Arc;

use tokio::runtime::Handle;

use super::adherence::AdherenceAggregator;
use super::engine::CareEngine;
use super::insights::InsightAggregator;
use super::outcome_log::OutcomeLogger;
use super::resolver::EventResolver;
use crate::config::EngineConfig;
use crate::impls::IntervalScheduleOracle;
use crate::ports::{
    Clock, IdGenerator, OutcomeStore, ScheduleOracle, SystemClock, UlidGenerator, VersionStore,
};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing component: {0}")]
    MissingComponent(&'static str),

    #[error("no tokio runtime: call build() inside a runtime or pass one with with_runtime()")]
    NoRuntime,
}

#[derive(Default)]
pub struct EngineBuilder {
    versions: Option<Arc<dyn VersionStore>>,
    outcomes: Option<Arc<dyn OutcomeStore>>,
    schedules: Option<Arc<dyn ScheduleOracle>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    runtime: Option<Handle>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version_store(mut self, store: Arc<dyn VersionStore>) -> Self {
        self.versions = Some(store);
        self
    }

    pub fn with_outcome_store(mut self, store: Arc<dyn OutcomeStore>) -> Self {
        self.outcomes = Some(store);
        self
    }

    /// version と outcome を 1 つのストアでまかなう
    pub fn with_store<S>(self, store: Arc<S>) -> Self
    where
        S: VersionStore + OutcomeStore + 'static,
    {
        self.with_version_store(store.clone())
            .with_outcome_store(store)
    }

    /// 省略時は [`IntervalScheduleOracle`]
    pub fn with_schedule_oracle(mut self, oracle: Arc<dyn ScheduleOracle>) -> Self {
        self.schedules = Some(oracle);
        self
    }

    /// 省略時は [`SystemClock`]。デフォルトの id generator もこの clock を使う
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// 並行解決を spawn する runtime
    ///
    /// 省略時は `build()` を呼んだ runtime
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<CareEngine, BuildError> {
        let versions = self
            .versions
            .ok_or(BuildError::MissingComponent("version store"))?;
        let outcomes = self
            .outcomes
            .ok_or(BuildError::MissingComponent("outcome store"))?;
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| BuildError::NoRuntime)?,
        };
        let schedules = self
            .schedules
            .unwrap_or_else(|| Arc::new(IntervalScheduleOracle::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));

        let resolver = EventResolver::new(Arc::clone(&versions), Arc::clone(&outcomes), schedules)
            .with_max_version_depth(self.config.max_version_depth);
        let adherence = AdherenceAggregator::new(
            resolver.clone(),
            versions,
            runtime,
            self.config.empty_target_policy,
        );
        let insights = InsightAggregator::new(resolver.clone());
        let logger = OutcomeLogger::new(resolver.clone(), outcomes, ids, clock);

        Ok(CareEngine::new(
            resolver,
            adherence,
            insights,
            logger,
            self.config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryCareStore;

    #[tokio::test]
    async fn test_build_success() {
        let engine = EngineBuilder::new()
            .with_store(Arc::new(InMemoryCareStore::new()))
            .build();
        assert!(engine.is_ok());
    }

    #[tokio::test]
    async fn test_build_missing_outcome_store() {
        let engine = EngineBuilder::new()
            .with_version_store(Arc::new(InMemoryCareStore::new()))
            .build();
        assert!(matches!(
            engine,
            Err(BuildError::MissingComponent("outcome store"))
        ));
    }

    #[test]
    fn test_build_outside_runtime_needs_a_handle() {
        let engine = EngineBuilder::new()
            .with_store(Arc::new(InMemoryCareStore::new()))
            .build();
        assert!(matches!(engine, Err(BuildError::NoRuntime)));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let engine = EngineBuilder::new()
            .with_store(Arc::new(InMemoryCareStore::new()))
            .with_runtime(runtime.handle().clone())
            .build();
        assert!(engine.is_ok());
    }
}
