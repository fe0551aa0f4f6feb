//! Domain model (ids, task versions, schedules, outcomes, events, adherence).
//!
//! Everything here is plain data plus pure functions; I/O lives behind
//! [`crate::ports`].

pub mod adherence;
pub mod completion;
pub mod errors;
pub mod event;
pub mod ids;
pub mod outcome;
pub mod range;
pub mod schedule;
pub mod task;

pub use self::adherence::Adherence;
pub use self::completion::{CompletionTally, EmptyTargetPolicy, completion, completion_with_policy};
pub use self::errors::{BackendError, EngineError, FetchStage};
pub use self::event::Event;
pub use self::ids::{OutcomeId, VersionId};
pub use self::outcome::{Outcome, OutcomeValue, Value};
pub use self::range::{DateRange, days_between};
pub use self::schedule::{Schedule, ScheduledOccurrence, TargetValue};
pub use self::task::TaskVersion;
