//! Structural checks on a form.

use std::collections::HashSet;

use crate::schema::{FormState, MAX_PLOTS, MIN_PLOTS};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Plot count {count} outside {min}..={max}")]
    PlotCount { count: usize, min: usize, max: usize },

    #[error("Field {ident} sits in plot {position} but carries index {index}")]
    IndexMismatch {
        ident: String,
        position: usize,
        index: usize,
    },

    #[error("Duplicate field identifier: {ident}")]
    DuplicateId { ident: String },
}

/// Check the plot count bounds and that every per-plot identifier is unique
/// and numbered after its block's position.
pub fn validate_form(form: &FormState) -> Result<(), ValidationError> {
    let count = form.plot_count();
    if !(MIN_PLOTS..=MAX_PLOTS).contains(&count) {
        return Err(ValidationError::PlotCount {
            count,
            min: MIN_PLOTS,
            max: MAX_PLOTS,
        });
    }

    let mut seen = HashSet::new();
    for (position, plot) in form.plots().iter().enumerate() {
        let keys = std::iter::once(plot.mode_key())
            .chain(plot.fields().map(|(k, _, _)| k.clone()))
            .chain(plot.extra_options().map(|(k, _)| k.clone()));
        for key in keys {
            if key.index() != position {
                return Err(ValidationError::IndexMismatch {
                    ident: key.to_string(),
                    position,
                    index: key.index(),
                });
            }
            if !seen.insert(key.to_string()) {
                return Err(ValidationError::DuplicateId {
                    ident: key.to_string(),
                });
            }
        }
    }

    Ok(())
}
