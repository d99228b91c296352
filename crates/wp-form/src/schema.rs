//! Form schema: plot modes, the field catalog, plot blocks and the form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use wp_core::{CoreError, FieldKey};

use crate::value::SettingValue;
use crate::{FormError, FormResult};

pub const MIN_PLOTS: usize = 1;
pub const MAX_PLOTS: usize = 4;

/// Name of the expert mode checkbox.
pub const EXPERT_MODE_KEY: &str = "expertmode";
/// Name of the plot counter entry in a settings object.
pub const PLOTS_KEY: &str = "plots";

/// Which kind of plot a block draws. Selects the relevant field group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlotMode {
    #[serde(rename = "xy")]
    Xy,
    #[serde(rename = "h1")]
    H1,
    #[serde(rename = "h2")]
    H2,
    #[serde(rename = "p")]
    Profile,
    #[serde(rename = "map")]
    Map,
}

impl PlotMode {
    pub const ALL: [PlotMode; 5] = [
        PlotMode::Xy,
        PlotMode::H1,
        PlotMode::H2,
        PlotMode::Profile,
        PlotMode::Map,
    ];

    /// Wire value of the `m<n>` field.
    pub fn as_str(self) -> &'static str {
        match self {
            PlotMode::Xy => "xy",
            PlotMode::H1 => "h1",
            PlotMode::H2 => "h2",
            PlotMode::Profile => "p",
            PlotMode::Map => "map",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value.trim())
    }

    pub fn label(self) -> &'static str {
        match self {
            PlotMode::Xy => "scatter / line",
            PlotMode::H1 => "1D histogram",
            PlotMode::H2 => "2D histogram",
            PlotMode::Profile => "profile",
            PlotMode::Map => "map",
        }
    }
}

impl fmt::Display for PlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis that can be doubled by a twin axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            _ => None,
        }
    }
}

/// Semantic group of a per-plot field, encoded in the identifier prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    Source,
    Name,
    XAxis,
    YAxis,
    ZAxis,
    Cut,
    Binning,
    TwinAxis,
    RateWindow,
    /// Rate shift and rate count; only meaningful with a rate window.
    Rate,
    Options,
}

/// Group of a global (non-indexed) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalGroup {
    General,
    Axis,
    Twin(Axis),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Select(&'static [&'static str]),
    Checkbox,
}

/// Plot modes a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeScope {
    Any,
    Only(&'static [PlotMode]),
}

impl ModeScope {
    pub fn includes(self, mode: PlotMode) -> bool {
        match self {
            ModeScope::Any => true,
            ModeScope::Only(modes) => modes.contains(&mode),
        }
    }
}

/// Index-free identifier of a per-plot field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldStem {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl FieldStem {
    pub const fn new(prefix: &'static str, suffix: &'static str) -> Self {
        Self { prefix, suffix }
    }

    pub fn at(self, index: usize) -> FieldKey {
        FieldKey::new(self.prefix, index, self.suffix)
    }

    pub fn matches(self, key: &FieldKey) -> bool {
        key.prefix() == self.prefix && key.suffix() == self.suffix
    }
}

impl fmt::Display for FieldStem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*{}", self.prefix, self.suffix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub stem: FieldStem,
    pub label: &'static str,
    pub group: FieldGroup,
    pub kind: FieldKind,
    pub scope: ModeScope,
    pub expert: bool,
    pub default: &'static str,
}

impl FieldDef {
    pub fn default_value(&self) -> SettingValue {
        default_for(self.kind, self.default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalFieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub group: GlobalGroup,
    pub kind: FieldKind,
    pub expert: bool,
    pub default: &'static str,
}

impl GlobalFieldDef {
    pub fn default_value(&self) -> SettingValue {
        default_for(self.kind, self.default)
    }
}

fn default_for(kind: FieldKind, default: &str) -> SettingValue {
    match kind {
        FieldKind::Checkbox => SettingValue::Flag(default == "on"),
        FieldKind::Text | FieldKind::Select(_) => SettingValue::text(default),
    }
}

/// Stem of the plot mode select. Not part of [`PLOT_FIELDS`]: the mode is
/// stored typed on [`PlotSpec`] and is always enabled.
pub const MODE_STEM: FieldStem = FieldStem::new("m", "");

pub const SOURCE: FieldStem = FieldStem::new("s", "");
pub const TWIN_AXIS: FieldStem = FieldStem::new("tw", "");
pub const RATE_WINDOW: FieldStem = FieldStem::new("rw", "");
pub const RATE_SHIFT: FieldStem = FieldStem::new("rs", "");
pub const RATE_COUNT: FieldStem = FieldStem::new("rc", "");

const ALL_BUT_H1: &[PlotMode] = &[PlotMode::Xy, PlotMode::H2, PlotMode::Profile, PlotMode::Map];
const BINNED: &[PlotMode] = &[PlotMode::H1, PlotMode::H2, PlotMode::Profile];
const TWINNABLE: &[PlotMode] = &[PlotMode::Xy, PlotMode::H1, PlotMode::Profile];
const LINES: &[PlotMode] = &[PlotMode::Xy, PlotMode::H1, PlotMode::Profile];
const MARKERS: &[PlotMode] = &[PlotMode::Xy, PlotMode::Map];
const HISTOGRAMS: &[PlotMode] = &[PlotMode::H1, PlotMode::H2];

const TWIN_CHOICES: &[&str] = &["", "x", "y"];
const SCALE_CHOICES: &[&str] = &["", "linear", "log"];
const PROJECTIONS: &[&str] = &[
    "cyl", "merc", "ortho", "robin", "aeqd", "laea", "stere", "npaeqd", "nplaea", "npstere",
    "spaeqd", "splaea", "spstere",
];

#[allow(clippy::too_many_arguments)]
const fn plot_field(
    prefix: &'static str,
    suffix: &'static str,
    label: &'static str,
    group: FieldGroup,
    kind: FieldKind,
    scope: ModeScope,
    expert: bool,
    default: &'static str,
) -> FieldDef {
    FieldDef {
        stem: FieldStem::new(prefix, suffix),
        label,
        group,
        kind,
        scope,
        expert,
        default,
    }
}

use FieldGroup as G;
use FieldKind::{Checkbox, Select, Text};
use ModeScope::{Any, Only};

/// Every field a plot block carries, besides the mode select.
pub const PLOT_FIELDS: &[FieldDef] = &[
    plot_field("s", "", "data source", G::Source, Text, Any, false, ""),
    plot_field("n", "", "legend name", G::Name, Text, Any, false, ""),
    plot_field("x", "", "x expression", G::XAxis, Text, Any, false, ""),
    plot_field("y", "", "y expression", G::YAxis, Text, Only(ALL_BUT_H1), false, ""),
    plot_field("z", "", "colour expression", G::ZAxis, Text, Only(MARKERS), false, ""),
    plot_field("c", "", "cut", G::Cut, Text, Any, false, ""),
    plot_field("x", "b", "x binning", G::Binning, Text, Only(BINNED), false, ""),
    plot_field("y", "b", "y binning", G::Binning, Text, Only(&[PlotMode::H2]), false, ""),
    plot_field("tw", "", "twin axis", G::TwinAxis, Select(TWIN_CHOICES), Only(TWINNABLE), true, ""),
    plot_field("rw", "", "rate window", G::RateWindow, Text, Any, true, ""),
    plot_field("rs", "", "rate shift", G::Rate, Text, Any, true, "1"),
    plot_field("rc", "", "rate count", G::Rate, Text, Any, true, "1"),
    plot_field("o", "color", "colour", G::Options, Text, Only(LINES), false, ""),
    plot_field("o", "style", "drawing style", G::Options, Text, Only(HISTOGRAMS), false, ""),
    plot_field("o", "markersize", "marker size", G::Options, Text, Only(MARKERS), true, ""),
    plot_field("o", "density", "density", G::Options, Checkbox, Only(HISTOGRAMS), false, ""),
    plot_field("o", "cumulative", "cumulative", G::Options, Text, Only(&[PlotMode::H1]), true, ""),
    plot_field("o", "log", "log colour scale", G::Options, Checkbox, Only(&[PlotMode::H2]), false, ""),
    plot_field("o", "levels", "contour levels", G::Options, Text, Only(&[PlotMode::H2]), true, ""),
    plot_field("o", "projection", "projection", G::Options, Select(PROJECTIONS), Only(&[PlotMode::Map]), false, "cyl"),
    plot_field("o", "boundarylat", "boundary latitude", G::Options, Text, Only(&[PlotMode::Map]), true, "50"),
];

const fn global_field(
    name: &'static str,
    label: &'static str,
    group: GlobalGroup,
    kind: FieldKind,
    expert: bool,
) -> GlobalFieldDef {
    GlobalFieldDef {
        name,
        label,
        group,
        kind,
        expert,
        default: "",
    }
}

use GlobalGroup::{General, Twin};

/// Fields shared by all plots of one request.
pub const GLOBAL_FIELDS: &[GlobalFieldDef] = &[
    global_field("t", "title", General, Text, false),
    global_field("f", "font size", General, Text, true),
    global_field("w", "width", General, Text, true),
    global_field("g", "grid", General, Checkbox, false),
    global_field("l", "legend position", General, Text, false),
    global_field("xr", "x range", GlobalGroup::Axis, Text, false),
    global_field("xs", "x scale", GlobalGroup::Axis, Select(SCALE_CHOICES), false),
    global_field("xl", "x label", GlobalGroup::Axis, Text, false),
    global_field("yr", "y range", GlobalGroup::Axis, Text, false),
    global_field("ys", "y scale", GlobalGroup::Axis, Select(SCALE_CHOICES), false),
    global_field("yl", "y label", GlobalGroup::Axis, Text, false),
    global_field("zr", "colour range", GlobalGroup::Axis, Text, false),
    global_field("zs", "colour scale", GlobalGroup::Axis, Select(SCALE_CHOICES), false),
    global_field("zl", "colour label", GlobalGroup::Axis, Text, false),
    global_field("xrtw", "twin x range", Twin(Axis::X), Text, true),
    global_field("xstw", "twin x scale", Twin(Axis::X), Select(SCALE_CHOICES), true),
    global_field("xltw", "twin x label", Twin(Axis::X), Text, true),
    global_field("yrtw", "twin y range", Twin(Axis::Y), Text, true),
    global_field("ystw", "twin y scale", Twin(Axis::Y), Select(SCALE_CHOICES), true),
    global_field("yltw", "twin y label", Twin(Axis::Y), Text, true),
];

pub fn plot_field_def(key: &FieldKey) -> Option<&'static FieldDef> {
    PLOT_FIELDS.iter().find(|def| def.stem.matches(key))
}

pub fn global_field_def(name: &str) -> Option<&'static GlobalFieldDef> {
    GLOBAL_FIELDS.iter().find(|def| def.name == name)
}

/// `o<n><name>` keys are plotting options handed to the backend as keyword
/// arguments. Those outside [`PLOT_FIELDS`] are carried as plain text.
pub fn is_plot_option(key: &FieldKey) -> bool {
    key.prefix() == "o" && !key.suffix().is_empty()
}

/// Human readable label of any settings key, for listings.
pub fn field_label(ident: &str) -> Option<&'static str> {
    match ident {
        EXPERT_MODE_KEY => return Some("expert mode"),
        PLOTS_KEY => return Some("number of plots"),
        _ => {}
    }
    match FieldKey::parse(ident) {
        Ok(key) if MODE_STEM.matches(&key) => Some("plot mode"),
        Ok(key) => plot_field_def(&key)
            .map(|def| def.label)
            .or_else(|| is_plot_option(&key).then_some("plot option")),
        Err(_) => global_field_def(ident).map(|def| def.label),
    }
}

/// Normalize a value to what the field's input would hold.
fn coerce(kind: FieldKind, ident: &str, value: SettingValue) -> FormResult<SettingValue> {
    match kind {
        FieldKind::Checkbox => Ok(SettingValue::Flag(value.as_flag())),
        FieldKind::Text => Ok(SettingValue::Text(value.as_text())),
        FieldKind::Select(choices) => {
            let text = value.as_text();
            if choices.contains(&text.trim()) {
                Ok(SettingValue::Text(text.trim().to_string()))
            } else {
                Err(FormError::InvalidValue {
                    field: ident.to_string(),
                    value: text,
                    reason: format!("expected one of {:?}", choices),
                })
            }
        }
    }
}

/// One plot block of the form.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    index: usize,
    mode: PlotMode,
    values: BTreeMap<FieldKey, SettingValue>,
    extra_options: BTreeMap<FieldKey, SettingValue>,
}

impl PlotSpec {
    /// Default block at position `index`.
    pub fn new(index: usize) -> Self {
        let values = PLOT_FIELDS
            .iter()
            .map(|def| (def.stem.at(index), def.default_value()))
            .collect();
        Self {
            index,
            mode: PlotMode::Xy,
            values,
            extra_options: BTreeMap::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn mode(&self) -> PlotMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlotMode) {
        self.mode = mode;
    }

    pub fn mode_key(&self) -> FieldKey {
        MODE_STEM.at(self.index)
    }

    pub fn value(&self, stem: FieldStem) -> Option<&SettingValue> {
        self.values.get(&stem.at(self.index))
    }

    pub fn text(&self, stem: FieldStem) -> String {
        self.value(stem).map(SettingValue::as_text).unwrap_or_default()
    }

    pub fn rate_window_is_blank(&self) -> bool {
        self.value(RATE_WINDOW)
            .map_or(true, SettingValue::is_blank)
    }

    /// Axis selected in this block's twin-axis field, if any.
    pub fn twin_axis(&self) -> Option<Axis> {
        self.value(TWIN_AXIS).and_then(|v| Axis::parse(&v.as_text()))
    }

    /// Assign a field of this block. The key must carry this block's index.
    pub fn set(&mut self, key: &FieldKey, value: SettingValue) -> FormResult<()> {
        if key.index() != self.index {
            return Err(FormError::IndexMismatch {
                ident: key.to_string(),
                position: self.index,
            });
        }

        if MODE_STEM.matches(key) {
            let text = value.as_text();
            self.mode = PlotMode::parse(&text).ok_or_else(|| FormError::InvalidValue {
                field: key.to_string(),
                value: text,
                reason: "unknown plot mode".to_string(),
            })?;
            return Ok(());
        }

        let Some(def) = plot_field_def(key) else {
            if !is_plot_option(key) {
                return Err(FormError::UnknownField {
                    ident: key.to_string(),
                });
            }
            if value.is_blank() {
                self.extra_options.remove(key);
            } else {
                self.extra_options
                    .insert(key.clone(), SettingValue::Text(value.as_text()));
            }
            return Ok(());
        };
        let value = coerce(def.kind, &key.to_string(), value)?;
        self.values.insert(key.clone(), value);
        Ok(())
    }

    /// Field entries with their catalog definitions, mode excluded.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldKey, &SettingValue, &'static FieldDef)> {
        self.values
            .iter()
            .filter_map(|(key, value)| plot_field_def(key).map(|def| (key, value, def)))
    }

    /// Plotting options outside the catalog, e.g. `o0cbfrac`. Always sent.
    pub fn extra_options(&self) -> impl Iterator<Item = (&FieldKey, &SettingValue)> {
        self.extra_options.iter()
    }

    /// All identifiers of this block, mode included.
    pub fn identifiers(&self) -> Vec<String> {
        std::iter::once(self.mode_key())
            .chain(self.values.keys().cloned())
            .chain(self.extra_options.keys().cloned())
            .map(|key| key.to_string())
            .collect()
    }

    /// Move the block to `index`, rewriting every identifier.
    pub(crate) fn renumber(&mut self, index: usize) {
        if index == self.index {
            return;
        }
        let move_to = |map: BTreeMap<FieldKey, SettingValue>| {
            map.into_iter()
                .map(|(key, value)| (key.with_index(index), value))
                .collect()
        };
        self.values = move_to(std::mem::take(&mut self.values));
        self.extra_options = move_to(std::mem::take(&mut self.extra_options));
        self.index = index;
    }
}

/// Complete form: plot blocks plus global settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    plots: Vec<PlotSpec>,
    expert_mode: bool,
    globals: BTreeMap<&'static str, SettingValue>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    /// Form with a single default plot block.
    pub fn new() -> Self {
        Self::with_plot_count(MIN_PLOTS)
    }

    /// Form with `count` default plot blocks, clamped to the allowed range.
    pub fn with_plot_count(count: usize) -> Self {
        let count = count.clamp(MIN_PLOTS, MAX_PLOTS);
        Self {
            plots: (0..count).map(PlotSpec::new).collect(),
            expert_mode: false,
            globals: GLOBAL_FIELDS
                .iter()
                .map(|def| (def.name, def.default_value()))
                .collect(),
        }
    }

    pub fn plots(&self) -> &[PlotSpec] {
        &self.plots
    }

    pub fn plot(&self, index: usize) -> Option<&PlotSpec> {
        self.plots.get(index)
    }

    pub fn plot_count(&self) -> usize {
        self.plots.len()
    }

    pub fn expert_mode(&self) -> bool {
        self.expert_mode
    }

    pub fn set_expert_mode(&mut self, on: bool) {
        self.expert_mode = on;
    }

    pub fn global(&self, name: &str) -> Option<&SettingValue> {
        self.globals.get(name)
    }

    pub fn globals(&self) -> impl Iterator<Item = (&'static GlobalFieldDef, &SettingValue)> {
        GLOBAL_FIELDS
            .iter()
            .filter_map(|def| self.globals.get(def.name).map(|value| (def, value)))
    }

    pub fn set_global(&mut self, name: &str, value: SettingValue) -> FormResult<()> {
        let def = global_field_def(name).ok_or_else(|| FormError::UnknownField {
            ident: name.to_string(),
        })?;
        let value = coerce(def.kind, name, value)?;
        self.globals.insert(def.name, value);
        Ok(())
    }

    pub fn can_add_plot(&self) -> bool {
        self.plots.len() < MAX_PLOTS
    }

    pub fn can_remove_plot(&self) -> bool {
        self.plots.len() > MIN_PLOTS
    }

    /// Append a copy of the first block. Returns the new block's index.
    pub fn add_plot(&mut self) -> FormResult<usize> {
        if !self.can_add_plot() {
            return Err(FormError::TooManyPlots { max: MAX_PLOTS });
        }
        let index = self.plots.len();
        let mut plot = self
            .plots
            .first()
            .cloned()
            .unwrap_or_else(|| PlotSpec::new(index));
        plot.renumber(index);
        self.plots.push(plot);
        Ok(index)
    }

    pub fn remove_plot(&mut self, index: usize) -> FormResult<()> {
        if index >= self.plots.len() {
            return Err(FormError::PlotOutOfRange {
                index,
                len: self.plots.len(),
            });
        }
        if !self.can_remove_plot() {
            return Err(FormError::LastPlot);
        }
        self.plots.remove(index);
        self.renumber();
        Ok(())
    }

    fn renumber(&mut self) {
        for (position, plot) in self.plots.iter_mut().enumerate() {
            plot.renumber(position);
        }
    }

    pub fn set_mode(&mut self, plot: usize, mode: PlotMode) -> FormResult<()> {
        self.plot_mut(plot)?.set_mode(mode);
        Ok(())
    }

    pub fn set_plot_field(&mut self, key: &FieldKey, value: SettingValue) -> FormResult<()> {
        self.plot_mut(key.index())?.set(key, value)
    }

    /// Assign a field by its wire identifier: `expertmode`, a per-plot key
    /// (`m0`, `x1b`, ...) or a global name (`xr`, `t`, ...).
    pub fn set_field(&mut self, ident: &str, value: SettingValue) -> FormResult<()> {
        if ident == EXPERT_MODE_KEY {
            self.expert_mode = value.as_flag();
            return Ok(());
        }
        match FieldKey::parse(ident) {
            Ok(key) => self.set_plot_field(&key, value),
            Err(CoreError::MissingIndex { .. }) => self.set_global(ident, value),
            Err(_) => Err(FormError::UnknownField {
                ident: ident.to_string(),
            }),
        }
    }

    fn plot_mut(&mut self, index: usize) -> FormResult<&mut PlotSpec> {
        let len = self.plots.len();
        self.plots
            .get_mut(index)
            .ok_or(FormError::PlotOutOfRange { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_stems_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for def in PLOT_FIELDS {
            assert!(seen.insert(def.stem), "duplicate stem {}", def.stem);
        }
        assert!(!seen.contains(&MODE_STEM));
    }

    #[test]
    fn rate_fields_default_to_one() {
        let plot = PlotSpec::new(0);
        assert_eq!(plot.text(RATE_SHIFT), "1");
        assert_eq!(plot.text(RATE_COUNT), "1");
        assert!(plot.rate_window_is_blank());
    }

    #[test]
    fn set_rejects_foreign_index() {
        let mut plot = PlotSpec::new(1);
        let err = plot
            .set(&FieldKey::parse("x0").unwrap(), "time".into())
            .unwrap_err();
        assert!(matches!(err, FormError::IndexMismatch { position: 1, .. }));
    }

    #[test]
    fn select_values_are_checked() {
        let mut form = FormState::new();
        assert!(form.set_field("tw0", "y".into()).is_ok());
        assert_eq!(form.plot(0).unwrap().twin_axis(), Some(Axis::Y));
        assert!(matches!(
            form.set_field("tw0", "z".into()),
            Err(FormError::InvalidValue { .. })
        ));
        assert!(matches!(
            form.set_field("m0", "pie".into()),
            Err(FormError::InvalidValue { .. })
        ));
    }

    #[test]
    fn add_plot_clones_first_block() {
        let mut form = FormState::new();
        form.set_field("x0", "time".into()).unwrap();
        form.set_mode(0, PlotMode::H1).unwrap();

        let index = form.add_plot().unwrap();
        let added = form.plot(index).unwrap();
        assert_eq!(index, 1);
        assert_eq!(added.mode(), PlotMode::H1);
        assert_eq!(added.value(FieldStem::new("x", "")), Some(&SettingValue::text("time")));
        assert!(added.identifiers().iter().all(|id| id.contains('1')));
    }

    #[test]
    fn backend_select_values_are_accepted() {
        let mut form = FormState::new();
        form.set_field("xs", "linear".into()).unwrap();
        form.set_field("ystw", "log".into()).unwrap();
        for projection in ["robin", "npaeqd", "nplaea", "spaeqd", "splaea"] {
            form.set_field("o0projection", projection.into()).unwrap();
        }
        assert!(form.set_field("xs", "lin".into()).is_err());
    }

    #[test]
    fn uncatalogued_options_follow_their_plot() {
        let mut form = FormState::with_plot_count(2);
        form.set_field("o1cbfrac", " 0.1".into()).unwrap();
        form.set_field("o1drawcoastline", "0".into()).unwrap();
        form.set_field("o1drawcoastline", "  ".into()).unwrap();
        assert_eq!(form.plot(1).unwrap().extra_options().count(), 1);

        form.remove_plot(0).unwrap();
        let plot = form.plot(0).unwrap();
        let (key, value) = plot.extra_options().next().unwrap();
        assert_eq!(key.to_string(), "o0cbfrac");
        assert_eq!(value, &SettingValue::text(" 0.1"));
        assert!(plot.identifiers().contains(&"o0cbfrac".to_string()));
    }

    #[test]
    fn labels_cover_every_kind_of_key() {
        assert_eq!(field_label("m2"), Some("plot mode"));
        assert_eq!(field_label("o0markersize"), Some("marker size"));
        assert_eq!(field_label("o0cblabel"), Some("plot option"));
        assert_eq!(field_label("yltw"), Some("twin y label"));
        assert_eq!(field_label("expertmode"), Some("expert mode"));
        assert_eq!(field_label("q0"), None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut form = FormState::new();
        assert!(matches!(
            form.set_field("q0", "1".into()),
            Err(FormError::UnknownField { .. })
        ));
        assert!(matches!(
            form.set_field("nonsense", "1".into()),
            Err(FormError::UnknownField { .. })
        ));
        assert!(matches!(
            form.set_field("x7", "1".into()),
            Err(FormError::PlotOutOfRange { index: 7, .. })
        ));
    }
}
