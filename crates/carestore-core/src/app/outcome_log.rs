//! OutcomeLogger - occurrence への値の記録と削除
//!
//! - event に outcome があれば値を追記して update
//! - なければ新しい outcome を作成して insert
//! - 削除は作成時刻順の位置で指定

use std::sync::Arc;

use tracing::{info, instrument};

use super::resolver::EventResolver;
use crate::domain::{EngineError, FetchStage, Outcome, OutcomeValue, Value, VersionId};
use crate::ports::{Clock, IdGenerator, OutcomeStore};

#[derive(Clone)]
pub struct OutcomeLogger {
    resolver: EventResolver,
    outcomes: Arc<dyn OutcomeStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl OutcomeLogger {
    pub fn new(
        resolver: EventResolver,
        outcomes: Arc<dyn OutcomeStore>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver,
            outcomes,
            ids,
            clock,
        }
    }

    /// occurrence の outcome に `values` を追記（なければ作成）
    #[instrument(skip(self, values), fields(version = %version_id, count = values.len()))]
    pub async fn log_values(
        &self,
        version_id: VersionId,
        occurrence_index: usize,
        values: Vec<OutcomeValue>,
    ) -> Result<Outcome, EngineError> {
        let event = self.resolver.fetch_event(version_id, occurrence_index).await?;

        let saved = match event.outcome {
            Some(mut outcome) => {
                outcome.append_values(values);
                self.outcomes.update_outcome(outcome).await
            }
            None => {
                let outcome = Outcome::new(
                    self.ids.generate_outcome_id(),
                    version_id,
                    occurrence_index,
                    values,
                );
                self.outcomes.insert_outcome(outcome).await
            }
        }
        .map_err(|e| EngineError::backend(FetchStage::OutcomeWrite, e))?;

        info!(outcome = %saved.id, values = saved.values.len(), "logged outcome values");
        Ok(saved)
    }

    /// engine の clock で時刻を付けて値を 1 つ記録
    pub async fn log_value(
        &self,
        version_id: VersionId,
        occurrence_index: usize,
        value: impl Into<Value>,
    ) -> Result<Outcome, EngineError> {
        let value = OutcomeValue::new(value, self.clock.now());
        self.log_values(version_id, occurrence_index, vec![value]).await
    }

    /// 作成時刻順で `position` 番目の値を削除
    #[instrument(skip(self), fields(version = %version_id))]
    pub async fn remove_value(
        &self,
        version_id: VersionId,
        occurrence_index: usize,
        position: usize,
    ) -> Result<Outcome, EngineError> {
        let mut outcome = self
            .resolver
            .fetch_outcome(version_id, occurrence_index)
            .await?;
        if outcome.remove_value_by_creation_order(position).is_none() {
            return Err(EngineError::NotFound(format!(
                "no value at position {position} of {}",
                outcome.id
            )));
        }
        let saved = self
            .outcomes
            .update_outcome(outcome)
            .await
            .map_err(|e| EngineError::backend(FetchStage::OutcomeWrite, e))?;

        info!(outcome = %saved.id, values = saved.values.len(), "removed outcome value");
        Ok(saved)
    }
}
