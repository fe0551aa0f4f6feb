//! Completion formula: how much of an event's expected values were logged.
//!
//! Pure functions only. Unit-less targets are counted; unit targets are
//! totalled per unit and give partial credit up to 1 each.
//!
//! ```text
//! D = R + |units|
//! N = min(L, R) + Σ_unit min(1, logged[unit] / expected[unit])
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::event::Event;
use super::outcome::OutcomeValue;
use super::schedule::TargetValue;

/// 期待値が 1 つもない event（`D == 0`）の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyTargetPolicy {
    /// The event counts as fully complete.
    #[default]
    Complete,
    /// The event is left out of the day's average.
    Exclude,
}

/// Expected and logged totals for one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionTally {
    pub required_count: usize,
    pub required_units: HashMap<String, f64>,
    pub logged_count: usize,
    pub logged_units: HashMap<String, f64>,
}

impl CompletionTally {
    pub fn new(targets: &[TargetValue], logged: &[OutcomeValue]) -> Self {
        let mut tally = Self::default();
        for target in targets {
            match target {
                TargetValue::Count => tally.required_count += 1,
                TargetValue::Measure { units, value } => {
                    *tally.required_units.entry(units.clone()).or_default() += value;
                }
            }
        }
        for value in logged {
            match &value.units {
                Some(units) => {
                    *tally.logged_units.entry(units.clone()).or_default() += value.numeric_value();
                }
                None => tally.logged_count += 1,
            }
        }
        tally
    }

    pub fn denominator(&self) -> usize {
        self.required_count + self.required_units.len()
    }

    pub fn numerator(&self) -> f64 {
        let counted = self.logged_count.min(self.required_count) as f64;
        let measured: f64 = self
            .required_units
            .iter()
            .map(|(units, &expected)| {
                let logged = self.logged_units.get(units).copied().unwrap_or(0.0);
                if expected <= 0.0 {
                    1.0
                } else {
                    (logged / expected).clamp(0.0, 1.0)
                }
            })
            .sum();
        counted + measured
    }

    /// `None` when nothing is expected.
    pub fn fraction(&self) -> Option<f64> {
        match self.denominator() {
            0 => None,
            d => Some(self.numerator() / d as f64),
        }
    }
}

/// 1 event の完了率。期待値がなければ `None`
pub fn completion(event: &Event) -> Option<f64> {
    let logged = event
        .outcome
        .as_ref()
        .map(|o| o.values.as_slice())
        .unwrap_or_default();
    CompletionTally::new(&event.occurrence.target_values, logged).fraction()
}

/// 期待値のない event に `policy` を適用した完了率
pub fn completion_with_policy(event: &Event, policy: EmptyTargetPolicy) -> Option<f64> {
    match (completion(event), policy) {
        (Some(fraction), _) => Some(fraction),
        (None, EmptyTargetPolicy::Complete) => Some(1.0),
        (None, EmptyTargetPolicy::Exclude) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Outcome, OutcomeId, Schedule, ScheduledOccurrence, TaskVersion, VersionId};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use std::sync::Arc;
    use ulid::Ulid;

    fn event(targets: Vec<TargetValue>, logged: Vec<OutcomeValue>) -> Event {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let version_id = VersionId::from_ulid(Ulid::new());
        let task = Arc::new(TaskVersion::new("t", version_id, Schedule::daily(start)));
        let occurrence = ScheduledOccurrence {
            index: 0,
            start,
            end: start,
            target_values: targets,
        };
        let event = Event::new(task, occurrence);
        if logged.is_empty() {
            return event;
        }
        event.with_outcome(Outcome::new(OutcomeId::from_ulid(Ulid::new()), version_id, 0, logged))
    }

    fn count() -> OutcomeValue {
        OutcomeValue::new("done", Utc::now())
    }

    fn measured(units: &str, value: f64) -> OutcomeValue {
        OutcomeValue::new(value, Utc::now()).with_units(units)
    }

    #[test]
    fn partial_credit_mixes_counts_and_units() {
        let e = event(
            vec![TargetValue::Count, TargetValue::Count, TargetValue::measure("mg", 10.0)],
            vec![count(), measured("mg", 5.0)],
        );

        let tally = CompletionTally::new(
            &e.occurrence.target_values,
            &e.outcome.as_ref().unwrap().values,
        );
        assert_eq!(tally.denominator(), 3);
        assert_eq!(tally.numerator(), 1.5);
        assert_eq!(completion(&e), Some(0.5));
    }

    #[test]
    fn fully_logged_event_is_complete() {
        let e = event(
            vec![TargetValue::Count, TargetValue::measure("ml", 250.0)],
            vec![count(), count(), measured("ml", 300.0)],
        );
        assert_eq!(completion(&e), Some(1.0));
    }

    #[test]
    fn nothing_logged_is_zero() {
        let e = event(vec![TargetValue::Count, TargetValue::measure("mg", 5.0)], vec![]);
        assert_eq!(completion(&e), Some(0.0));
    }

    #[test]
    fn same_units_are_additive() {
        let e = event(
            vec![TargetValue::measure("mg", 5.0), TargetValue::measure("mg", 5.0)],
            vec![measured("mg", 4.0), measured("mg", 1.0)],
        );
        // one unit key with 10 expected, 5 logged
        assert_eq!(completion(&e), Some(0.5));
    }

    #[test]
    fn logged_values_in_other_units_do_not_count() {
        let e = event(vec![TargetValue::measure("mg", 10.0)], vec![measured("g", 10.0)]);
        assert_eq!(completion(&e), Some(0.0));
    }

    #[rstest]
    #[case::complete(EmptyTargetPolicy::Complete, Some(1.0))]
    #[case::exclude(EmptyTargetPolicy::Exclude, None)]
    fn empty_targets_follow_policy(#[case] policy: EmptyTargetPolicy, #[case] expected: Option<f64>) {
        let e = event(vec![], vec![count()]);
        assert_eq!(completion(&e), None);
        assert_eq!(completion_with_policy(&e, policy), expected);
    }
}
