//! Field visibility rules.
//!
//! Visibility is derived, never stored: every event that can change it
//! re-runs [`evaluate`] over the whole form. A disabled field is hidden and
//! left out of the serialized settings.
//!
//! Rules, in order of precedence:
//! 1. without expert mode every expert field is disabled;
//! 2. the twin-axis globals for an axis are enabled iff some plot selects
//!    that axis as its twin axis (expert mode only);
//! 3. a mode-scoped field is enabled iff its scope contains the plot's mode;
//! 4. rate shift / rate count need a non-blank rate window and expert mode.

use std::collections::BTreeSet;

use crate::schema::{
    Axis, FieldDef, FieldGroup, FormState, GlobalFieldDef, GlobalGroup, PlotSpec, TWIN_AXIS,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    enabled: BTreeSet<String>,
    hidden: BTreeSet<String>,
    twin_axes: BTreeSet<Axis>,
}

impl Visibility {
    pub fn is_enabled(&self, ident: &str) -> bool {
        self.enabled.contains(ident)
    }

    pub fn is_hidden(&self, ident: &str) -> bool {
        self.hidden.contains(ident)
    }

    pub fn enabled(&self) -> &BTreeSet<String> {
        &self.enabled
    }

    pub fn hidden(&self) -> &BTreeSet<String> {
        &self.hidden
    }

    /// Axes selected as twin axis by at least one plot.
    pub fn twin_axes(&self) -> &BTreeSet<Axis> {
        &self.twin_axes
    }

    fn mark(&mut self, ident: String, on: bool) {
        if on {
            self.enabled.insert(ident);
        } else {
            self.hidden.insert(ident);
        }
    }
}

pub fn plot_field_enabled(def: &FieldDef, plot: &PlotSpec, expert_mode: bool) -> bool {
    if def.expert && !expert_mode {
        return false;
    }
    if !def.scope.includes(plot.mode()) {
        return false;
    }
    if def.group == FieldGroup::Rate {
        return expert_mode && !plot.rate_window_is_blank();
    }
    true
}

pub fn global_field_enabled(
    def: &GlobalFieldDef,
    expert_mode: bool,
    twin_axes: &BTreeSet<Axis>,
) -> bool {
    if def.expert && !expert_mode {
        return false;
    }
    match def.group {
        GlobalGroup::Twin(axis) => expert_mode && twin_axes.contains(&axis),
        GlobalGroup::General | GlobalGroup::Axis => true,
    }
}

/// Twin axis a plot contributes, if its twin-axis field is enabled and set.
fn selected_twin_axis(plot: &PlotSpec, expert_mode: bool) -> Option<Axis> {
    let enabled = plot
        .fields()
        .find(|(key, _, _)| TWIN_AXIS.matches(key))
        .is_some_and(|(_, _, def)| plot_field_enabled(def, plot, expert_mode));
    if enabled { plot.twin_axis() } else { None }
}

/// Compute enabled and hidden identifiers for the whole form.
pub fn evaluate(form: &FormState) -> Visibility {
    let expert_mode = form.expert_mode();
    let mut visibility = Visibility::default();

    for plot in form.plots() {
        visibility.mark(plot.mode_key().to_string(), true);
        for (key, _, def) in plot.fields() {
            visibility.mark(key.to_string(), plot_field_enabled(def, plot, expert_mode));
        }
        for (key, _) in plot.extra_options() {
            visibility.mark(key.to_string(), true);
        }
        if let Some(axis) = selected_twin_axis(plot, expert_mode) {
            visibility.twin_axes.insert(axis);
        }
    }

    let twin_axes = visibility.twin_axes.clone();
    for (def, _) in form.globals() {
        visibility.mark(
            def.name.to_string(),
            global_field_enabled(def, expert_mode, &twin_axes),
        );
    }

    visibility
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PlotMode;

    fn form_with(mode: PlotMode, expert: bool) -> FormState {
        let mut form = FormState::new();
        form.set_mode(0, mode).unwrap();
        form.set_expert_mode(expert);
        form
    }

    #[test]
    fn mode_scope_selects_fields() {
        let vis = evaluate(&form_with(PlotMode::H1, false));
        assert!(vis.is_enabled("x0"));
        assert!(vis.is_enabled("x0b"));
        assert!(vis.is_hidden("y0"));
        assert!(vis.is_hidden("y0b"));
        assert!(vis.is_enabled("o0density"));

        let vis = evaluate(&form_with(PlotMode::H2, false));
        assert!(vis.is_enabled("y0"));
        assert!(vis.is_enabled("y0b"));
        assert!(vis.is_hidden("o0color"));
    }

    #[test]
    fn expert_fields_need_expert_mode() {
        let vis = evaluate(&form_with(PlotMode::Map, false));
        assert!(vis.is_hidden("o0boundarylat"));
        assert!(vis.is_hidden("rw0"));
        assert!(vis.is_hidden("f"));
        assert!(vis.is_enabled("o0projection"));

        let vis = evaluate(&form_with(PlotMode::Map, true));
        assert!(vis.is_enabled("o0boundarylat"));
        assert!(vis.is_enabled("rw0"));
        assert!(vis.is_enabled("f"));
    }

    #[test]
    fn mode_is_always_enabled() {
        for mode in PlotMode::ALL {
            assert!(evaluate(&form_with(mode, false)).is_enabled("m0"));
        }
    }

    #[test]
    fn twin_globals_follow_selection() {
        let mut form = form_with(PlotMode::Xy, true);
        let vis = evaluate(&form);
        assert!(vis.is_hidden("xrtw"));
        assert!(vis.is_hidden("yrtw"));

        form.set_field("tw0", "y".into()).unwrap();
        let vis = evaluate(&form);
        assert!(vis.is_hidden("xrtw"));
        assert!(vis.is_enabled("yrtw"));
        assert!(vis.is_enabled("yltw"));
        assert_eq!(vis.twin_axes().iter().copied().collect::<Vec<_>>(), vec![Axis::Y]);

        // a twin axis on a plot whose mode hides the selector does not count
        form.set_mode(0, PlotMode::Map).unwrap();
        assert!(evaluate(&form).is_hidden("yrtw"));
    }

    #[test]
    fn twin_selection_ignored_without_expert_mode() {
        let mut form = form_with(PlotMode::Xy, true);
        form.set_field("tw0", "x".into()).unwrap();
        form.set_expert_mode(false);

        let vis = evaluate(&form);
        assert!(vis.is_hidden("tw0"));
        assert!(vis.is_hidden("xrtw"));
        assert!(vis.twin_axes().is_empty());
    }
}
