//! App - アプリケーション層
//!
//! ports を組み合わせて engine の操作を実装します。
//!
//! # 主要コンポーネント
//! - **EventResolver**: version chain を遡って event 列を再構築
//! - **group_by_day**: event を UTC の日付ごとに分割
//! - **AdherenceAggregator**: 複数 task の並行解決と日ごとの完了率
//! - **InsightAggregator**: 任意の日次集計
//! - **OutcomeLogger**: 値の記録・削除
//! - **EngineBuilder / CareEngine**: ワイヤリングと公開 API

pub mod adherence;
pub mod builder;
pub mod engine;
pub mod grouping;
pub mod insights;
pub mod outcome_log;
pub mod resolver;

pub use self::adherence::AdherenceAggregator;
pub use self::builder::{BuildError, EngineBuilder};
pub use self::engine::CareEngine;
pub use self::grouping::group_by_day;
pub use self::insights::{InsightAggregator, logged_events, total_logged};
pub use self::outcome_log::OutcomeLogger;
pub use self::resolver::EventResolver;
