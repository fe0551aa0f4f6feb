//! Outcome model: what a patient logged against one occurrence.
//!
//! This module does not assume any persistence. An [`Outcome`] is bound to a
//! single version + occurrence index for its whole life; only its values
//! change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{OutcomeId, VersionId};

/// The raw payload of a logged value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// 記録された値 1 つ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeValue {
    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OutcomeValue {
    pub fn new(value: impl Into<Value>, created_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            units: None,
            source: None,
            created_at,
            notes: None,
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Numeric view used for unit totals. Text counts as zero.
    pub fn numeric_value(&self) -> f64 {
        match &self.value {
            Value::Float(v) => *v,
            Value::Integer(v) => *v as f64,
            Value::Text(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub id: OutcomeId,
    pub task_version_id: VersionId,
    pub task_occurrence_index: usize,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<OutcomeValue>,
}

impl Outcome {
    pub fn new(
        id: OutcomeId,
        task_version_id: VersionId,
        task_occurrence_index: usize,
        values: Vec<OutcomeValue>,
    ) -> Self {
        Self {
            id,
            task_version_id,
            task_occurrence_index,
            values,
        }
    }

    pub fn append_values(&mut self, values: impl IntoIterator<Item = OutcomeValue>) {
        self.values.extend(values);
    }

    /// 作成時刻順に並べたときの `position` 番目の値を削除
    ///
    /// Values created at the same instant keep their logged order.
    pub fn remove_value_by_creation_order(&mut self, position: usize) -> Option<OutcomeValue> {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by_key(|&i| self.values[i].created_at);
        let index = *order.get(position)?;
        Some(self.values.remove(index))
    }
}
