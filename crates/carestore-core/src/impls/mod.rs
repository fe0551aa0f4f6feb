//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryCareStore**: VersionStore + OutcomeStore
//! - **IntervalScheduleOracle**: 固定間隔の ScheduleOracle
//!
//! 本番用の永続化ストアは別クレートに配置する想定です。

pub mod inmem_store;
pub mod interval_schedule;

pub use self::inmem_store::InMemoryCareStore;
pub use self::interval_schedule::IntervalScheduleOracle;
