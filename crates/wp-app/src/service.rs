//! The plot-generation collaborator.

use std::fmt;
use tracing::{debug, warn};
use wp_store::{Endpoint, PlotArtifacts, StoreError};

use crate::catalog::TableCatalog;
use crate::error::AppResult;

/// Why a plot request produced no plot. Carries the raw detail for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotFailure {
    pub status: Option<u16>,
    pub reason: String,
    pub detail: String,
}

impl PlotFailure {
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            reason: "transport error".to_string(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for PlotFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "plot error {} {}: {}", status, self.reason, self.detail),
            None => write!(f, "plot error ({}): {}", self.reason, self.detail),
        }
    }
}

impl From<StoreError> for PlotFailure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Server {
                status,
                reason,
                body,
            } => Self {
                status: Some(status),
                reason,
                detail: body,
            },
            other => Self::transport(other.to_string()),
        }
    }
}

pub trait PlotService {
    fn list_tables(&self) -> AppResult<TableCatalog>;

    fn plot(&self, query: &[(String, String)]) -> Result<PlotArtifacts, PlotFailure>;

    /// Best-effort abort of the request currently in flight.
    fn cancel(&self) {}

    /// URL rendering the plot directly as an image, if the service has one.
    fn embed_url(&self, _query: &[(String, String)]) -> Option<String> {
        None
    }
}

impl<T: PlotService + ?Sized> PlotService for &T {
    fn list_tables(&self) -> AppResult<TableCatalog> {
        (**self).list_tables()
    }

    fn plot(&self, query: &[(String, String)]) -> Result<PlotArtifacts, PlotFailure> {
        (**self).plot(query)
    }

    fn cancel(&self) {
        (**self).cancel()
    }

    fn embed_url(&self, query: &[(String, String)]) -> Option<String> {
        (**self).embed_url(query)
    }
}

/// Parse a `plot` response body.
pub fn decode_artifacts(body: &str) -> Result<PlotArtifacts, PlotFailure> {
    serde_json::from_str(body.trim()).map_err(|e| PlotFailure {
        status: None,
        reason: "invalid plot response".to_string(),
        detail: format!("{}: {}", e, body),
    })
}

#[derive(Debug, Clone)]
pub struct HttpPlotService {
    endpoint: Endpoint,
}

impl HttpPlotService {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

impl PlotService for HttpPlotService {
    fn list_tables(&self) -> AppResult<TableCatalog> {
        let body = self.endpoint.get("list", &[])?;
        TableCatalog::parse(&body)
    }

    fn plot(&self, query: &[(String, String)]) -> Result<PlotArtifacts, PlotFailure> {
        debug!(fields = query.len(), "requesting plot");
        let body = self.endpoint.get("plot", query).map_err(|e| {
            warn!(error = %e, "plot request failed");
            PlotFailure::from(e)
        })?;
        decode_artifacts(&body)
    }

    fn embed_url(&self, query: &[(String, String)]) -> Option<String> {
        Some(self.endpoint.action_url("png", query).to_string())
    }
}
