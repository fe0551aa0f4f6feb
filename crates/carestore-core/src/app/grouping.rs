//! Group events into UTC civil-day buckets.

use chrono::{DateTime, Utc};

use crate::domain::{Event, days_between};

/// event を UTC の日付ごとのバケツに分ける
///
/// バケツ `i` には occurrence の開始日が `start.date + i` の event が入ります
/// （`i` は `0..=days_between(start, end)`）。
///
/// # Panics
/// バケツの外にある event を渡すと panic します。呼び出し側は全 event を
/// 含む範囲を渡すこと（resolver は範囲外の event を返しません）。
pub fn group_by_day(events: Vec<Event>, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Vec<Event>> {
    let day_count = days_between(start, end) + 1;
    let mut days: Vec<Vec<Event>> = std::iter::repeat_with(Vec::new).take(day_count).collect();
    let first = start.date_naive();

    for event in events {
        let offset = (event.occurrence.start.date_naive() - first).num_days();
        match usize::try_from(offset).ok().and_then(|i| days.get_mut(i)) {
            Some(day) => day.push(event),
            None => panic!(
                "event at {} lies outside the {day_count}-day window starting {first}",
                event.occurrence.start
            ),
        }
    }
    days
}
