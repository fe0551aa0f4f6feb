use std::sync::Arc;

use serde::Serialize;

use super::outcome::Outcome;
use super::schedule::ScheduledOccurrence;
use super::task::TaskVersion;

/// occurrence と、それに記録された outcome（あれば）の組
///
/// resolver がその都度組み立て、保存はしません。同じ version の event は
/// 1 つの `Arc<TaskVersion>` を共有します。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub task: Arc<TaskVersion>,
    pub occurrence: ScheduledOccurrence,
    pub outcome: Option<Outcome>,
}

impl Event {
    pub fn new(task: Arc<TaskVersion>, occurrence: ScheduledOccurrence) -> Self {
        Self {
            task,
            occurrence,
            outcome: None,
        }
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}
