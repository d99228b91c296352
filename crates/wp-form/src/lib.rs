//! wp-form: plot form model, field visibility and the settings codec.

pub mod codec;
pub mod events;
pub mod schema;
pub mod validate;
pub mod value;
pub mod visibility;

pub use codec::{deserialize, parse_settings_json, serialize, to_query};
pub use events::FormEvent;
pub use schema::*;
pub use validate::{ValidationError, validate_form};
pub use value::{SettingValue, SettingsMap};
pub use visibility::{Visibility, evaluate};

pub type FormResult<T> = Result<T, FormError>;

#[derive(thiserror::Error, Debug)]
pub enum FormError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("At most {max} plots are allowed")]
    TooManyPlots { max: usize },

    #[error("The last plot cannot be removed")]
    LastPlot,

    #[error("Plot {index} does not exist ({len} plots)")]
    PlotOutOfRange { index: usize, len: usize },

    #[error("Unknown field: {ident}")]
    UnknownField { ident: String },

    #[error("Field {ident} does not belong to plot {position}")]
    IndexMismatch { ident: String, position: usize },

    #[error("Invalid value: {field} = {value:?} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Malformed settings: {0}")]
    MalformedSettings(String),
}
