//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! engine は task version / outcome の永続化やカレンダー展開を知らず、
//! これらの trait を通してのみ外部とやり取りします。

pub mod clock;
pub mod id_generator;
pub mod outcome_store;
pub mod schedule_oracle;
pub mod version_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::outcome_store::OutcomeStore;
pub use self::schedule_oracle::ScheduleOracle;
pub use self::version_store::VersionStore;
