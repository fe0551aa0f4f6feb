//! Schedules and the occurrences they produce.
//!
//! A [`Schedule`] here is deliberately simple: one element repeating at a
//! fixed interval. Richer calendars belong to a [`ScheduleOracle`]
//! implementation; the engine only ever sees [`ScheduledOccurrence`]s.
//!
//! [`ScheduleOracle`]: crate::ports::ScheduleOracle

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::errors::EngineError;

/// One value an occurrence expects to be logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetValue {
    /// Any unit-less logged value counts towards this item.
    Count,

    /// A total of `value` must be logged in `units`.
    Measure { units: String, value: f64 },
}

impl TargetValue {
    pub fn measure(units: impl Into<String>, value: f64) -> Self {
        TargetValue::Measure {
            units: units.into(),
            value,
        }
    }
}

/// task version の 1 回分の予定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledOccurrence {
    /// Zero-based position within the owning version's schedule.
    pub index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub target_values: Vec<TargetValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<DateTime<Utc>>,
    /// `None` means the schedule fires exactly once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interval_ms: Option<i64>,
    duration_ms: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    target_values: Vec<TargetValue>,
}

impl Schedule {
    /// 1 回だけの occurrence
    pub fn once(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: None,
            interval_ms: None,
            duration_ms: 0,
            target_values: Vec::new(),
        }
    }

    /// `interval` ごとに繰り返す schedule
    ///
    /// interval はミリ秒単位で保持します。1ms 未満（0 や負数を含む）は
    /// `InvalidInterval` で拒否します。
    pub fn every(start: DateTime<Utc>, interval: TimeDelta) -> Result<Self, EngineError> {
        let ms = interval.num_milliseconds();
        if ms <= 0 {
            return Err(EngineError::InvalidInterval(interval));
        }
        Ok(Self {
            interval_ms: Some(ms),
            ..Self::once(start)
        })
    }

    pub fn daily(start: DateTime<Utc>) -> Self {
        Self {
            interval_ms: Some(TimeDelta::days(1).num_milliseconds()),
            ..Self::once(start)
        }
    }

    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_duration(mut self, duration: TimeDelta) -> Self {
        self.duration_ms = duration.num_milliseconds().max(0);
        self
    }

    pub fn with_targets(mut self, targets: Vec<TargetValue>) -> Self {
        self.target_values = targets;
        self
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn target_values(&self) -> &[TargetValue] {
        &self.target_values
    }

    /// `index` 番目の occurrence（なければ `None`）
    pub fn occurrence(&self, index: usize) -> Option<ScheduledOccurrence> {
        let start = self.start_of(index)?;
        if self.end.is_some_and(|end| start >= end) {
            return None;
        }
        Some(ScheduledOccurrence {
            index,
            start,
            end: start + TimeDelta::milliseconds(self.duration_ms),
            target_values: self.target_values.clone(),
        })
    }

    /// 開始が `[from, to)` にある occurrence（index 順）
    pub fn occurrences(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<ScheduledOccurrence> {
        let mut occurrences = Vec::new();
        let mut index = self.first_index_at_or_after(from);
        while let Some(occurrence) = self.occurrence(index) {
            if occurrence.start >= to {
                break;
            }
            occurrences.push(occurrence);
            index += 1;
        }
        occurrences
    }

    fn start_of(&self, index: usize) -> Option<DateTime<Utc>> {
        match self.interval_ms {
            None if index == 0 => Some(self.start),
            None => None,
            Some(ms) => {
                let offset = ms.checked_mul(i64::try_from(index).ok()?)?;
                self.start
                    .checked_add_signed(TimeDelta::try_milliseconds(offset)?)
            }
        }
    }

    fn first_index_at_or_after(&self, from: DateTime<Utc>) -> usize {
        if from <= self.start {
            return 0;
        }
        let Some(ms) = self.interval_ms else {
            // single occurrence already passed
            return 1;
        };
        // whole elapsed milliseconds never overshoot `from`
        let elapsed = (from - self.start).num_milliseconds().unsigned_abs();
        let mut index = usize::try_from(elapsed / ms.unsigned_abs()).unwrap_or(usize::MAX);
        // sub-millisecond remainders leave at most one step to take
        while self.start_of(index).is_some_and(|start| start < from) {
            index = index.saturating_add(1);
        }
        index
    }
}
