//! Insights: caller-defined per-day reductions over one task's events.

use tracing::instrument;

use super::grouping::group_by_day;
use super::resolver::EventResolver;
use crate::domain::{DateRange, EngineError, Event};

#[derive(Clone)]
pub struct InsightAggregator {
    resolver: EventResolver,
}

impl InsightAggregator {
    pub fn new(resolver: EventResolver) -> Self {
        Self { resolver }
    }

    /// `identifier` の event を日ごとに `reducer` で集計
    #[instrument(skip(self, reducer), fields(start = %range.start(), end = %range.end()))]
    pub async fn compute_insights<F>(
        &self,
        identifier: &str,
        range: DateRange,
        reducer: F,
    ) -> Result<Vec<f64>, EngineError>
    where
        F: Fn(&[Event]) -> f64,
    {
        let events = self.resolver.resolve_events(identifier, range).await?;
        let days = group_by_day(events, range.start(), range.end());
        Ok(days.iter().map(|day| reducer(day)).collect())
    }
}

/// `units` で記録された数値の合計（`None` なら単位なしの値）
pub fn total_logged(events: &[Event], units: Option<&str>) -> f64 {
    events
        .iter()
        .filter_map(|event| event.outcome.as_ref())
        .flat_map(|outcome| outcome.values.iter())
        .filter(|value| value.units.as_deref() == units)
        .map(|value| value.numeric_value())
        .sum()
}

/// outcome がある event の数
pub fn logged_events(events: &[Event]) -> f64 {
    events.iter().filter(|event| event.outcome.is_some()).count() as f64
}
