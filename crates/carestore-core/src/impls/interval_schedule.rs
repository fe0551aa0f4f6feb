//! IntervalScheduleOracle - `Schedule` 自身の固定間隔展開を使う ScheduleOracle
//!
//! テストと CLI デモ用。本番のカレンダー展開は別実装に任せる。

use chrono::{DateTime, Utc};

use crate::domain::{ScheduledOccurrence, TaskVersion};
use crate::ports::ScheduleOracle;

#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalScheduleOracle;

impl IntervalScheduleOracle {
    pub fn new() -> Self {
        Self
    }
}

impl ScheduleOracle for IntervalScheduleOracle {
    fn occurrences(
        &self,
        version: &TaskVersion,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<ScheduledOccurrence> {
        if start >= end {
            return Vec::new();
        }
        version.schedule.occurrences(start, end)
    }

    fn occurrence(&self, version: &TaskVersion, index: usize) -> Option<ScheduledOccurrence> {
        version.schedule.occurrence(index)
    }
}
