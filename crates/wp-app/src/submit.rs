//! Plot submission pipeline.
//!
//! At most one request is current. Every `begin` issues a fresh ticket and
//! supersedes the previous one; completions carrying a stale ticket are
//! dropped without touching the state.

use tracing::{debug, warn};
use wp_form::{FormState, SettingsMap, serialize, to_query};
use wp_store::{PlotArtifacts, SavedPlotEntry};

use crate::service::PlotFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

/// Everything needed to issue one plot request.
#[derive(Debug, Clone)]
pub struct PlotRequest {
    pub ticket: RequestTicket,
    /// Ticket of the request this one replaced, if it was still pending.
    pub superseded: Option<RequestTicket>,
    pub settings: SettingsMap,
    pub query: Vec<(String, String)>,
}

/// A rendered plot and the snapshot a save would store.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOutcome {
    pub artifacts: PlotArtifacts,
    pub snapshot: SavedPlotEntry,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending {
        ticket: RequestTicket,
    },
    Success(PlotOutcome),
    Failed(PlotFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Superseded,
}

#[derive(Debug, Default)]
pub struct SubmissionPipeline {
    next_ticket: u64,
    pending: Option<(RequestTicket, SettingsMap)>,
    state: SubmissionState,
}

impl SubmissionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SubmissionState::Pending { .. })
    }

    /// Serialize the enabled settings of `form` and enter `Pending`.
    pub fn begin(&mut self, form: &FormState) -> PlotRequest {
        let ticket = RequestTicket(self.next_ticket);
        self.next_ticket += 1;

        let superseded = self.pending.take().map(|(old, _)| old);
        if let Some(old) = superseded {
            debug!(old = old.0, new = ticket.0, "superseding pending plot request");
        }

        let settings = serialize(form);
        let query = to_query(&settings);
        self.pending = Some((ticket, settings.clone()));
        self.state = SubmissionState::Pending { ticket };

        PlotRequest {
            ticket,
            superseded,
            settings,
            query,
        }
    }

    /// Record the response of request `ticket`.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: Result<PlotArtifacts, PlotFailure>,
    ) -> Completion {
        let settings = match self.pending.take() {
            Some((current, settings)) if current == ticket => settings,
            other => {
                self.pending = other;
                debug!(ticket = ticket.0, "ignoring response of superseded request");
                return Completion::Superseded;
            }
        };

        self.state = match result {
            Ok(artifacts) => {
                debug!(ticket = ticket.0, png = %artifacts.png, "plot ready");
                SubmissionState::Success(PlotOutcome {
                    snapshot: SavedPlotEntry::new(settings, artifacts.clone()),
                    artifacts,
                })
            }
            Err(failure) => {
                warn!(ticket = ticket.0, %failure, "plot request failed");
                SubmissionState::Failed(failure)
            }
        };
        Completion::Applied
    }

    /// Result of the last successful submission, unless a later one failed
    /// or is still pending.
    pub fn last_result(&self) -> Option<&PlotArtifacts> {
        match &self.state {
            SubmissionState::Success(outcome) => Some(&outcome.artifacts),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<&SavedPlotEntry> {
        match &self.state {
            SubmissionState::Success(outcome) => Some(&outcome.snapshot),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&PlotFailure> {
        match &self.state {
            SubmissionState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}
