//! Scalar setting values and the flat settings mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat settings object keyed by field identifier (`x0`, `o1color`, `xr`,
/// `expertmode`, `plots`, ...).
pub type SettingsMap = BTreeMap<String, SettingValue>;

/// A single form value.
///
/// Text inputs and selects carry strings, checkboxes booleans. Numbers only
/// show up in settings that went through JSON (the `plots` counter, or
/// user-edited snapshots) and are treated as their decimal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
}

impl SettingValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn count(value: usize) -> Self {
        Self::Number(serde_json::Number::from(value as u64))
    }

    /// Text form as a form input would report it.
    pub fn as_text(&self) -> String {
        match self {
            Self::Flag(b) => if *b { "on" } else { "" }.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Checkbox interpretation.
    pub fn as_flag(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Self::Text(s) => matches!(s.trim(), "on" | "true" | "1" | "yes"),
        }
    }

    /// Counter interpretation, used for `plots`.
    pub fn as_count(&self) -> Option<usize> {
        match self {
            Self::Flag(_) => None,
            Self::Number(n) => n.as_u64().map(|v| v as usize),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Blank means empty or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Flag(b) => !*b,
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}
