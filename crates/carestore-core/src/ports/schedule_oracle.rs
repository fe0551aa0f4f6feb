//! ScheduleOracle port - schedule から occurrence を列挙
//!
//! 純粋関数として設計されます（I/O なし）。カレンダー展開の詳細は実装側の責務。

use chrono::{DateTime, Utc};

use crate::domain::{ScheduledOccurrence, TaskVersion};

pub trait ScheduleOracle: Send + Sync {
    /// 開始が `[start, end)` にある `version` の occurrence（index 順に連続）
    fn occurrences(
        &self,
        version: &TaskVersion,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<ScheduledOccurrence>;

    /// `index` 番目の occurrence（なければ `None`）
    fn occurrence(&self, version: &TaskVersion, index: usize) -> Option<ScheduledOccurrence>;
}
