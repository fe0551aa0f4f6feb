//! Domain identifiers (strongly-typed IDs).
//!
//! Version and outcome records are addressed by ULID. A task's own
//! `identifier` is a caller-chosen string and lives on [`TaskVersion`]
//! instead.
//!
//! ## Phantom Type パターン
//! `Id<T>` で共通実装を提供しつつ、`T` は実行時には使わないマーカー型として
//! コンパイル時の型安全性を提供します（VersionId と OutcomeId は混同できない）。
//!
//! [`TaskVersion`]: super::TaskVersion

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"version-", "outcome-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
#[repr(transparent)]
#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

// Manual impls: derives would put bounds on `T`, and the marker enums are
// uninhabited.
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: IdMarker> Copy for Id<T> {}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ulid == other.ulid
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ulid.hash(state);
    }
}

impl<T: IdMarker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: IdMarker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ulid.cmp(&other.ulid)
    }
}

impl<T: IdMarker> Id<T> {
    /// ULID から Id を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// 内部の ULID を取得
    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Task version のマーカー型
#[derive(Debug)]
pub enum Version {}

impl IdMarker for Version {
    fn prefix() -> &'static str {
        "version-"
    }
}

/// Outcome のマーカー型
#[derive(Debug)]
pub enum OutcomeMarker {}

impl IdMarker for OutcomeMarker {
    fn prefix() -> &'static str {
        "outcome-"
    }
}

/// 不変な task version の ID
pub type VersionId = Id<Version>;

/// 記録された outcome の ID
pub type OutcomeId = Id<OutcomeMarker>;
