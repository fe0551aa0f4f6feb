//! carestore-core
//!
//! Event resolution and adherence computation for care-tracking stores.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task version, schedule, outcome, event, adherence, completion, errors）
//! - **ports**: 抽象化レイヤー（VersionStore, OutcomeStore, ScheduleOracle, Clock, IdGenerator）
//! - **app**: engine（EventResolver, AdherenceAggregator, InsightAggregator, OutcomeLogger, EngineBuilder）
//! - **impls**: 実装（InMemoryCareStore, IntervalScheduleOracle など開発用）
//! - **config**: EngineConfig（defaults → TOML → 環境変数）
//! - **observability**: tracing の初期化と集計ビュー

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{BuildError, CareEngine, EngineBuilder};
pub use config::EngineConfig;
pub use domain::{Adherence, DateRange, EngineError, Event};
