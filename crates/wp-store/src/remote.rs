//! Remote saved-plot store API.

use serde_json::Value;
use tracing::debug;

use crate::endpoint::Endpoint;
use crate::types::{SavedPlotEntry, SavedPlots, SessionId};
use crate::{StoreError, StoreResult};

/// Session-scoped saved-plot list. `save` always replaces the whole list.
pub trait RemoteStore {
    fn new_session_id(&self) -> StoreResult<SessionId>;

    fn save(&self, session: &SessionId, entries: &[SavedPlotEntry]) -> StoreResult<()>;

    fn load(&self, session: &SessionId) -> StoreResult<Vec<SavedPlotEntry>>;
}

impl<T: RemoteStore + ?Sized> RemoteStore for &T {
    fn new_session_id(&self) -> StoreResult<SessionId> {
        (**self).new_session_id()
    }

    fn save(&self, session: &SessionId, entries: &[SavedPlotEntry]) -> StoreResult<()> {
        (**self).save(session, entries)
    }

    fn load(&self, session: &SessionId) -> StoreResult<Vec<SavedPlotEntry>> {
        (**self).load(session)
    }
}

pub fn encode_saved_plots(entries: &[SavedPlotEntry]) -> StoreResult<String> {
    let document = SavedPlots {
        saved_plots: entries.to_vec(),
    };
    Ok(serde_json::to_string(&document)?)
}

/// Decode a `load` response.
///
/// The server answers with a bare JSON string ("no data for ...") when a
/// session has nothing stored yet; that reads as an empty list.
pub fn decode_saved_plots(body: &str) -> StoreResult<Vec<SavedPlotEntry>> {
    let value: Value = serde_json::from_str(body.trim())?;
    match value {
        Value::String(message) => {
            debug!(%message, "no saved plots stored");
            Ok(Vec::new())
        }
        Value::Object(_) => {
            let document: SavedPlots = serde_json::from_value(value)?;
            Ok(document.saved_plots)
        }
        other => Err(StoreError::UnexpectedPayload(format!(
            "expected saved plots object, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    endpoint: Endpoint,
}

impl HttpRemoteStore {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

impl RemoteStore for HttpRemoteStore {
    fn new_session_id(&self) -> StoreResult<SessionId> {
        let body = self.endpoint.get("newid", &[])?;
        SessionId::parse(body.trim().trim_matches('"'))
    }

    fn save(&self, session: &SessionId, entries: &[SavedPlotEntry]) -> StoreResult<()> {
        let data = encode_saved_plots(entries)?;
        let params = [
            ("id".to_string(), session.to_string()),
            ("data".to_string(), data),
        ];
        self.endpoint.post_form("save", &params)?;
        debug!(session = %session, entries = entries.len(), "saved plot list stored");
        Ok(())
    }

    fn load(&self, session: &SessionId) -> StoreResult<Vec<SavedPlotEntry>> {
        let body = self
            .endpoint
            .get("load", &[("id".to_string(), session.to_string())])?;
        decode_saved_plots(&body)
    }
}
