//! Form events and their state transitions.
//!
//! Each event maps to exactly one mutation; visibility is recomputed after
//! every successful transition and returned to the caller.

use wp_core::FieldKey;

use crate::schema::{Axis, FormState, PlotMode, TWIN_AXIS};
use crate::value::SettingValue;
use crate::visibility::{Visibility, evaluate};
use crate::FormResult;

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    SetMode { plot: usize, mode: PlotMode },
    SetExpertMode(bool),
    /// Any per-plot or global field by wire identifier. Rate window edits
    /// arrive here as `rw<n>`.
    SetField { ident: String, value: SettingValue },
    SetTwinAxis { plot: usize, axis: Option<Axis> },
    AddPlot,
    RemovePlot(usize),
}

impl FormState {
    /// Apply one event. On error the form is left unchanged.
    pub fn apply(&mut self, event: FormEvent) -> FormResult<Visibility> {
        match event {
            FormEvent::SetMode { plot, mode } => self.set_mode(plot, mode)?,
            FormEvent::SetExpertMode(on) => self.set_expert_mode(on),
            FormEvent::SetField { ident, value } => self.set_field(&ident, value)?,
            FormEvent::SetTwinAxis { plot, axis } => {
                let value = axis.map(Axis::as_str).unwrap_or_default();
                let key: FieldKey = TWIN_AXIS.at(plot);
                self.set_plot_field(&key, SettingValue::text(value))?;
            }
            FormEvent::AddPlot => {
                self.add_plot()?;
            }
            FormEvent::RemovePlot(index) => self.remove_plot(index)?,
        }
        Ok(evaluate(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormError;

    #[test]
    fn rate_window_edit_toggles_rate_fields() {
        let mut form = FormState::new();
        form.apply(FormEvent::SetExpertMode(true)).unwrap();

        let vis = form
            .apply(FormEvent::SetField {
                ident: "rw0".into(),
                value: "10".into(),
            })
            .unwrap();
        assert!(vis.is_enabled("rs0"));
        assert!(vis.is_enabled("rc0"));

        let vis = form
            .apply(FormEvent::SetField {
                ident: "rw0".into(),
                value: "   ".into(),
            })
            .unwrap();
        assert!(vis.is_hidden("rs0"));
        assert!(vis.is_hidden("rc0"));
    }

    #[test]
    fn failed_events_leave_form_untouched() {
        let mut form = FormState::new();
        let before = form.clone();
        assert!(matches!(
            form.apply(FormEvent::RemovePlot(0)),
            Err(FormError::LastPlot)
        ));
        assert!(form.apply(FormEvent::SetMode { plot: 2, mode: PlotMode::H1 }).is_err());
        assert_eq!(form, before);
    }

    #[test]
    fn twin_axis_event_sets_selector() {
        let mut form = FormState::new();
        form.apply(FormEvent::SetExpertMode(true)).unwrap();
        let vis = form
            .apply(FormEvent::SetTwinAxis {
                plot: 0,
                axis: Some(Axis::X),
            })
            .unwrap();
        assert!(vis.is_enabled("xrtw"));

        let vis = form
            .apply(FormEvent::SetTwinAxis { plot: 0, axis: None })
            .unwrap();
        assert!(vis.is_hidden("xrtw"));
    }
}
