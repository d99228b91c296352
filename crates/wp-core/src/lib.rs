//! wp-core: stable foundation for the webplot client.
//!
//! Contains:
//! - ids (positional form field identifiers like `x0b` or `o1color`)
//! - error (shared error types)

pub mod error;
pub mod ids;

pub use error::{CoreError, CoreResult};
pub use ids::*;
