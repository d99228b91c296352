//! Service layer of the webplot client.
//!
//! Ties the form model, the plotting endpoint and the saved-plot store
//! together behind one controller object used by the CLI.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod service;
pub mod submit;

// Re-export key types for convenience
pub use catalog::{TableCatalog, TableInfo, Variable};
pub use config::{ClientConfig, load_config};
pub use controller::PlotPage;
pub use error::{AppError, AppResult};
pub use service::{HttpPlotService, PlotFailure, PlotService, decode_artifacts};
pub use submit::{
    Completion, PlotOutcome, PlotRequest, RequestTicket, SubmissionPipeline, SubmissionState,
};
