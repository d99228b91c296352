use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Field identifier is empty")]
    EmptyIdentifier,

    #[error("Field identifier '{ident}' has no group prefix")]
    MissingPrefix { ident: String },

    #[error("Field identifier '{ident}' has no positional index")]
    MissingIndex { ident: String },

    #[error("Field identifier '{ident}' contains invalid character {ch:?}")]
    InvalidChar { ident: String, ch: char },
}
