//! Caller-supplied hint mapping.
//!
//! Hints are an open, string-keyed extension map. Only a few keys carry
//! meaning for the daemon; everything else is preserved untouched and handed
//! to the renderer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::urgency::Urgency;

/// Reserved hint: urgency level (byte or name).
pub const HINT_URGENCY: &str = "urgency";
/// Reserved hint: never record in history.
pub const HINT_TRANSIENT: &str = "transient";
/// Reserved hint: keep the notification open after an action is invoked.
pub const HINT_RESIDENT: &str = "resident";
/// Reserved hint: notification category such as `email.arrived`.
pub const HINT_CATEGORY: &str = "category";
/// Reserved hint: desktop entry of the sending application.
pub const HINT_DESKTOP_ENTRY: &str = "desktop-entry";

/// A single hint value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HintValue {
    /// Boolean hint.
    Bool(bool),
    /// Integer hint (all protocol integer widths widen to this).
    Int(i64),
    /// String hint.
    Str(String),
}

impl From<bool> for HintValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for HintValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for HintValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for HintValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// The hint map attached to a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hints(BTreeMap<String, HintValue>);

impl Hints {
    /// Create an empty hint map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<HintValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a hint.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<HintValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a raw hint.
    pub fn get(&self, key: &str) -> Option<&HintValue> {
        self.0.get(key)
    }

    /// Iterate over all hints in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &HintValue)> {
        self.0.iter()
    }

    /// Number of hints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the urgency hint.
    ///
    /// Returns `Ok(None)` when absent and a validation error when present
    /// but not one of the three known levels.
    pub fn urgency(&self) -> Result<Option<Urgency>, AppError> {
        match self.0.get(HINT_URGENCY) {
            None => Ok(None),
            Some(HintValue::Int(level)) => Urgency::from_level(*level).map(Some),
            Some(HintValue::Str(name)) => name.parse().map(Some),
            Some(HintValue::Bool(_)) => Err(AppError::validation(
                "urgency hint must be an integer or a level name",
            )),
        }
    }

    /// Read a boolean hint; integers are accepted as `!= 0`.
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(HintValue::Bool(b)) => *b,
            Some(HintValue::Int(i)) => *i != 0,
            _ => false,
        }
    }

    /// Read a string hint.
    pub fn string(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(HintValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The sender asked for this notification to stay out of history.
    pub fn is_transient(&self) -> bool {
        self.flag(HINT_TRANSIENT)
    }

    /// The sender asked for this notification to survive action invocation.
    pub fn is_resident(&self) -> bool {
        self.flag(HINT_RESIDENT)
    }

    /// Category hint.
    pub fn category(&self) -> Option<&str> {
        self.string(HINT_CATEGORY)
    }

    /// Desktop entry hint.
    pub fn desktop_entry(&self) -> Option<&str> {
        self.string(HINT_DESKTOP_ENTRY)
    }
}

impl FromIterator<(String, HintValue)> for Hints {
    fn from_iter<I: IntoIterator<Item = (String, HintValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
