//! WorkItem domain type
//!
//! A single study task in the planner list. Identity is the `id`.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors from validating a new item
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItemError {
    #[error("label is empty")]
    EmptyLabel,

    #[error("hours must be a positive multiple of 0.5, got {0}")]
    InvalidHours(f64),
}

/// Planned study time, a positive number in 0.5 increments
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hours(f64);

impl Hours {
    /// Validate and wrap a number of hours
    pub fn new(value: f64) -> Result<Self, ItemError> {
        debug!(value, "Hours::new: called");
        let halves = value * 2.0;
        if !value.is_finite() || value <= 0.0 || (halves - halves.round()).abs() > f64::EPSILON {
            debug!(value, "Hours::new: rejected");
            return Err(ItemError::InvalidHours(value));
        }
        Ok(Self(value))
    }

    /// Raw value
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Hours {
    fn default() -> Self {
        Self(1.0)
    }
}

impl std::fmt::Display for Hours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unit = if self.0 == 1.0 { "hour" } else { "hours" };
        write!(f, "{} {}", self.0, unit)
    }
}

impl std::str::FromStr for Hours {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| ItemError::InvalidHours(f64::NAN))?;
        Self::new(value)
    }
}

/// A study task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    /// Unique identifier, derived from creation time
    ///
    /// Hosts that stored a raw millisecond timestamp send a number; it is
    /// read as its decimal string.
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,

    /// What to study. Older hosts store this as `subject`.
    #[serde(alias = "subject")]
    pub label: String,

    #[serde(default)]
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<Hours>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl WorkItem {
    /// Create a new, not yet completed item
    ///
    /// The label is trimmed; a blank label is rejected.
    pub fn new(id: impl Into<String>, label: &str, hours: Option<Hours>) -> Result<Self, ItemError> {
        let label = label.trim();
        if label.is_empty() {
            debug!("WorkItem::new: empty label");
            return Err(ItemError::EmptyLabel);
        }
        let id = id.into();
        debug!(%id, %label, ?hours, "WorkItem::new: called");
        Ok(Self {
            id,
            label: label.to_string(),
            completed: false,
            hours,
            created_at: Some(Utc::now()),
        })
    }

    /// Create with a specific ID and no validation (for testing or host data)
    pub fn with_id(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            completed: false,
            hours: None,
            created_at: None,
        }
    }

    /// Copy of this item with `completed` flipped
    pub fn toggled(&self) -> Self {
        debug!(id = %self.id, completed = self.completed, "WorkItem::toggled: called");
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

fn id_from_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("item id must be a string or number, got {}", other))),
    }
}
