//! Errors - エラー型と分類
//!
//! - [`BackendError`]: collaborator (store) failures, as reported by a port.
//! - [`EngineError`]: what callers of the engine see. Backend failures are
//!   wrapped with the [`FetchStage`] that produced them.

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use super::ids::VersionId;

/// collaborator 呼び出しが属する engine の処理段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStage {
    TaskLookup,
    VersionLookup,
    OutcomeLookup,
    OutcomeWrite,
    EventResolution,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FetchStage::TaskLookup => "task lookup",
            FetchStage::VersionLookup => "version lookup",
            FetchStage::OutcomeLookup => "outcome lookup",
            FetchStage::OutcomeWrite => "outcome write",
            FetchStage::EventResolution => "event resolution",
        };
        f.write_str(s)
    }
}

/// ストア実装が報告する失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("store operation failed: {0}")]
    OperationFailed(String),

    #[error("record conflict: {0}")]
    Conflict(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("fetch failed during {stage}: {reason}")]
    FetchFailed {
        stage: FetchStage,
        reason: String,
        #[source]
        source: Option<Box<EngineError>>,
    },

    #[error(
        "outcome for occurrence {index} of {version_id} is outside the resolved window \
         (offset={offset}, len={len})"
    )]
    IndexOutOfRange {
        version_id: VersionId,
        index: usize,
        offset: usize,
        len: usize,
    },

    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("schedule interval {0} is shorter than one millisecond")]
    InvalidInterval(TimeDelta),

    /// schedule oracle が窓の外の occurrence を返した
    #[error(
        "occurrence {index} of {version_id} starts at {start}, outside [{window_start}, {window_end})"
    )]
    OccurrenceOutsideWindow {
        version_id: VersionId,
        index: usize,
        start: DateTime<Utc>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    },
}

impl EngineError {
    /// backend の失敗を発生段階付きで包む
    pub fn backend(stage: FetchStage, err: BackendError) -> Self {
        EngineError::FetchFailed {
            stage,
            reason: err.to_string(),
            source: None,
        }
    }

    /// 内側の操作で起きた EngineError を包む
    pub fn nested(stage: FetchStage, reason: impl Into<String>, cause: EngineError) -> Self {
        EngineError::FetchFailed {
            stage,
            reason: reason.into(),
            source: Some(Box::new(cause)),
        }
    }

    pub fn stage(&self) -> Option<FetchStage> {
        match self {
            EngineError::FetchFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn backend_errors_carry_their_stage() {
        let err = EngineError::backend(
            FetchStage::OutcomeLookup,
            BackendError::OperationFailed("disk gone".into()),
        );

        assert_eq!(err.stage(), Some(FetchStage::OutcomeLookup));
        let msg = err.to_string();
        assert!(msg.contains("outcome lookup"));
        assert!(msg.contains("disk gone"));
    }

    #[test]
    fn nested_errors_expose_their_cause() {
        let cause = EngineError::NotFound("task walk".into());
        let err = EngineError::nested(FetchStage::EventResolution, "walk failed", cause);

        let source = err.source().expect("nested error has a source");
        assert!(source.to_string().contains("task walk"));
    }
}
