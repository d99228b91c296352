//! In-process remote store, for offline use and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::remote::{RemoteStore, decode_saved_plots, encode_saved_plots};
use crate::types::{SavedPlotEntry, SessionId};
use crate::{StoreError, StoreResult};

/// Keeps the encoded documents exactly as the server would.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    documents: Mutex<HashMap<String, String>>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Raw stored document of a session.
    pub fn document(&self, session: &SessionId) -> Option<String> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session.as_str())
            .cloned()
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryRemoteStore {
    fn new_session_id(&self) -> StoreResult<SessionId> {
        self.check_online()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        SessionId::parse(&format!("session{:08}", n))
    }

    fn save(&self, session: &SessionId, entries: &[SavedPlotEntry]) -> StoreResult<()> {
        self.check_online()?;
        let document = encode_saved_plots(entries)?;
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.to_string(), document);
        Ok(())
    }

    fn load(&self, session: &SessionId) -> StoreResult<Vec<SavedPlotEntry>> {
        self.check_online()?;
        match self.document(session) {
            Some(document) => decode_saved_plots(&document),
            None => decode_saved_plots(&format!("\"no data for {}\"", session)),
        }
    }
}
