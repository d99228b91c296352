//! Data tables offered by the plotting endpoint.

use std::collections::BTreeMap;
use wp_form::{PlotSpec, SOURCE};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub unit: String,
}

/// One `<file>:<table>` source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub key: String,
    pub label: String,
    pub variables: Vec<Variable>,
}

impl TableInfo {
    /// `wetter: Zeuthen weather` for `data/wetter.h5:/raw/zeuthen_weather`.
    pub fn display_label(&self) -> String {
        match self.key.split_once(".h5:") {
            Some((file, _table)) => {
                let stem = file.rsplit('/').next().unwrap_or(file);
                format!("{}: {}", stem, self.label)
            }
            None => self.key.clone(),
        }
    }

    /// Sources whose display label starts with `x` are for experts only.
    pub fn is_expert_only(&self) -> bool {
        self.display_label().starts_with('x')
    }

    /// Comma separated variable list with units; rate averaging adds the
    /// derived `rate, count, weight` columns.
    pub fn variable_hint(&self, with_rate: bool) -> String {
        let mut parts: Vec<String> = self
            .variables
            .iter()
            .map(|v| {
                if v.unit.is_empty() {
                    v.name.clone()
                } else {
                    format!("{} [{}]", v.name, v.unit)
                }
            })
            .collect();
        if with_rate {
            parts.extend(["rate", "count", "weight"].map(String::from));
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCatalog {
    tables: BTreeMap<String, TableInfo>,
}

impl TableCatalog {
    /// Parse a `list` response: `{"<file>:<table>": [label, [names], [units]]}`.
    pub fn parse(body: &str) -> AppResult<Self> {
        let raw: BTreeMap<String, (String, Vec<String>, Vec<String>)> =
            serde_json::from_str(body.trim()).map_err(|e| AppError::Catalog(e.to_string()))?;

        let tables = raw
            .into_iter()
            .map(|(key, (label, names, units))| {
                let variables = names
                    .into_iter()
                    .enumerate()
                    .map(|(i, name)| Variable {
                        name,
                        unit: units.get(i).cloned().unwrap_or_default(),
                    })
                    .collect();
                let info = TableInfo {
                    key: key.clone(),
                    label,
                    variables,
                };
                (key, info)
            })
            .collect();

        Ok(Self { tables })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TableInfo> {
        self.tables.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableInfo> {
        self.tables.values()
    }

    /// Sources offered in the source selector.
    pub fn visible(&self, expert_mode: bool) -> impl Iterator<Item = &TableInfo> {
        self.tables
            .values()
            .filter(move |t| expert_mode || !t.is_expert_only())
    }

    /// Variable hint for the source selected in `plot`.
    pub fn hint_for(&self, plot: &PlotSpec) -> Option<String> {
        let source = plot.text(SOURCE);
        self.get(source.trim())
            .map(|table| table.variable_hint(!plot.rate_window_is_blank()))
    }
}
