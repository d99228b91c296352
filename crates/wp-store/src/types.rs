//! Saved-plot data types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use wp_form::{SettingValue, SettingsMap};

use crate::{StoreError, StoreResult};

/// Opaque key scoping a saved-plot list on the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub const MIN_LEN: usize = 8;

    /// Accept an id of at least [`Self::MIN_LEN`] characters, ignoring
    /// surrounding whitespace.
    pub fn parse(raw: &str) -> StoreResult<Self> {
        let id = raw.trim();
        if id.chars().count() < Self::MIN_LEN {
            return Err(StoreError::InvalidSessionId {
                id: id.to_string(),
                min_len: Self::MIN_LEN,
            });
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Locations of the rendered plot files, as returned by a plot request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotArtifacts {
    pub png: String,
    pub pdf: String,
    pub svg: String,
}

const ARTIFACT_KEYS: [&str; 3] = ["png", "pdf", "svg"];

/// Settings of a past submission together with its artifacts.
///
/// On the wire an entry is one flat object: the settings keys plus `png`,
/// `pdf` and `svg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct SavedPlotEntry {
    settings: SettingsMap,
    artifacts: PlotArtifacts,
}

impl SavedPlotEntry {
    pub fn new(mut settings: SettingsMap, artifacts: PlotArtifacts) -> Self {
        for key in ARTIFACT_KEYS {
            settings.remove(key);
        }
        Self {
            settings,
            artifacts,
        }
    }

    pub fn settings(&self) -> &SettingsMap {
        &self.settings
    }

    pub fn artifacts(&self) -> &PlotArtifacts {
        &self.artifacts
    }

    /// Plot title, or the image location for untitled plots.
    pub fn title(&self) -> &str {
        match self.settings.get("t") {
            Some(SettingValue::Text(t)) if !t.trim().is_empty() => t,
            _ => &self.artifacts.png,
        }
    }

    /// The flat JSON object shown to users for copy/paste.
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<SavedPlotEntry> for Map<String, Value> {
    fn from(entry: SavedPlotEntry) -> Self {
        let mut map: Map<String, Value> = entry
            .settings
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    SettingValue::Flag(b) => Value::Bool(b),
                    SettingValue::Number(n) => Value::Number(n),
                    SettingValue::Text(s) => Value::String(s),
                };
                (key, value)
            })
            .collect();
        map.insert("png".to_string(), Value::String(entry.artifacts.png));
        map.insert("pdf".to_string(), Value::String(entry.artifacts.pdf));
        map.insert("svg".to_string(), Value::String(entry.artifacts.svg));
        map
    }
}

impl TryFrom<Map<String, Value>> for SavedPlotEntry {
    type Error = StoreError;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut take = |key: &str| match map.remove(key) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(StoreError::InvalidEntry(format!(
                "'{}' is not a string: {}",
                key, other
            ))),
            None => Err(StoreError::InvalidEntry(format!("missing '{}'", key))),
        };
        let artifacts = PlotArtifacts {
            png: take("png")?,
            pdf: take("pdf")?,
            svg: take("svg")?,
        };

        let mut settings = SettingsMap::new();
        for (key, value) in map {
            let value = match value {
                Value::Bool(b) => SettingValue::Flag(b),
                Value::Number(n) => SettingValue::Number(n),
                Value::String(s) => SettingValue::Text(s),
                Value::Null => continue,
                other => {
                    return Err(StoreError::InvalidEntry(format!(
                        "setting '{}' is not a scalar: {}",
                        key, other
                    )));
                }
            };
            settings.insert(key, value);
        }

        Ok(Self {
            settings,
            artifacts,
        })
    }
}

/// Document stored per session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedPlots {
    #[serde(rename = "savedPlots", default)]
    pub saved_plots: Vec<SavedPlotEntry>,
}
