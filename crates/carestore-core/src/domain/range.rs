//! Half-open query ranges over UTC instants.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::errors::EngineError;

/// UTC の半開区間 `[start, end)`
///
/// 日数計算はクレート全体で UTC の暦日を使います。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, EngineError> {
        if end < start {
            return Err(EngineError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// `first` の 0 時から `days` 日後の 0 時まで（終端は含まない）
    pub fn days_from(first: NaiveDate, days: u64) -> Self {
        let start = first.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = first
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whole civil days from the start date to the end date.
    pub fn days_between(&self) -> usize {
        days_between(self.start, self.end)
    }

    /// 日ごとのバケツ数（開始日と終了日の両方を含む）
    pub fn day_count(&self) -> usize {
        self.days_between() + 1
    }

    /// One civil date per bucket, in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let first = self.start.date_naive();
        (0..self.day_count() as u64)
            .filter_map(|i| first.checked_add_days(Days::new(i)))
            .collect()
    }
}

/// Signed civil-day distance, clamped at zero.
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> usize {
    let days = (to.date_naive() - from.date_naive()).num_days();
    usize::try_from(days).unwrap_or(0)
}
