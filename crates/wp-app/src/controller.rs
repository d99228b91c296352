//! Page controller: the form, the plot in flight, the saved-plot gallery and
//! the session, owned by one object.

use tracing::{debug, info, warn};
use wp_form::{
    FormEvent, FormState, SettingsMap, Visibility, deserialize, evaluate, parse_settings_json,
    serialize, to_query,
};
use wp_store::{CacheKey, LocalCache, PlotArtifacts, RemoteStore, SavedPlotEntry, SessionId};

use crate::catalog::TableCatalog;
use crate::error::{AppError, AppResult};
use crate::service::{PlotFailure, PlotService};
use crate::submit::{Completion, PlotRequest, RequestTicket, SubmissionPipeline, SubmissionState};

pub struct PlotPage<S, R, C> {
    service: S,
    store: R,
    cache: C,
    form: FormState,
    visibility: Visibility,
    pipeline: SubmissionPipeline,
    saved: Vec<SavedPlotEntry>,
    session: Option<SessionId>,
    catalog: Option<TableCatalog>,
}

impl<S, R, C> PlotPage<S, R, C>
where
    S: PlotService,
    R: RemoteStore,
    C: LocalCache,
{
    /// Start a page: restore the last settings from the cache, reuse or
    /// request a session id and load its saved plots. Never fails; anything
    /// unavailable degrades to defaults.
    pub fn open(service: S, store: R, cache: C) -> Self {
        let form = restore_last_settings(&cache);
        let visibility = evaluate(&form);
        let mut page = Self {
            service,
            store,
            cache,
            form,
            visibility,
            pipeline: SubmissionPipeline::new(),
            saved: Vec::new(),
            session: None,
            catalog: None,
        };
        page.session = page.ensure_session();
        page.refresh_saved();
        page
    }

    fn ensure_session(&self) -> Option<SessionId> {
        match self.cache.get(CacheKey::SessionId) {
            Ok(Some(raw)) => match SessionId::parse(&raw) {
                Ok(id) => return Some(id),
                Err(e) => warn!(error = %e, "discarding cached session id"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not read cached session id"),
        }

        match self.store.new_session_id() {
            Ok(id) => {
                info!(session = %id, "started new session");
                self.remember(CacheKey::SessionId, id.as_str());
                Some(id)
            }
            Err(e) => {
                warn!(error = %e, "could not obtain a session id");
                None
            }
        }
    }

    fn remember(&self, key: CacheKey, value: &str) {
        if let Err(e) = self.cache.set(key, value) {
            warn!(key = key.name(), error = %e, "could not write cache entry");
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn state(&self) -> &SubmissionState {
        self.pipeline.state()
    }

    pub fn last_result(&self) -> Option<&PlotArtifacts> {
        self.pipeline.last_result()
    }

    pub fn saved_plots(&self) -> &[SavedPlotEntry] {
        &self.saved
    }

    pub fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    pub fn apply(&mut self, event: FormEvent) -> AppResult<&Visibility> {
        self.visibility = self.form.apply(event)?;
        Ok(&self.visibility)
    }

    /// The settings a submit would send right now.
    pub fn settings(&self) -> SettingsMap {
        serialize(&self.form)
    }

    fn replace_form(&mut self, form: FormState) {
        self.visibility = evaluate(&form);
        self.form = form;
    }

    /// Replace the form with settings pasted as JSON. On error the form is
    /// left as it was.
    pub fn load_settings_text(&mut self, text: &str) -> AppResult<()> {
        let settings = parse_settings_json(text)?;
        let form = deserialize(&settings)?;
        self.replace_form(form);
        Ok(())
    }

    /// Enter `Pending` for the current form. A request still in flight is
    /// cancelled and its response will be ignored.
    pub fn begin_submit(&mut self) -> PlotRequest {
        let request = self.pipeline.begin(&self.form);
        if request.superseded.is_some() {
            self.service.cancel();
        }
        request
    }

    pub fn finish_submit(
        &mut self,
        ticket: RequestTicket,
        result: Result<PlotArtifacts, PlotFailure>,
    ) -> Completion {
        let completion = self.pipeline.complete(ticket, result);
        if completion == Completion::Applied {
            if let Some(snapshot) = self.pipeline.snapshot() {
                match serde_json::to_string(snapshot.settings()) {
                    Ok(json) => self.remember(CacheKey::LastSettings, &json),
                    Err(e) => warn!(error = %e, "could not encode settings snapshot"),
                }
            }
        }
        completion
    }

    /// Submit and wait for the response.
    pub fn submit(&mut self) -> &SubmissionState {
        let request = self.begin_submit();
        let result = self.service.plot(&request.query);
        self.finish_submit(request.ticket, result);
        self.pipeline.state()
    }

    /// Append the last successful plot to the gallery and persist the list.
    /// A snapshot already in the gallery is not added again.
    pub fn save_current(&mut self) -> AppResult<&SavedPlotEntry> {
        let entry = self
            .pipeline
            .snapshot()
            .cloned()
            .ok_or(AppError::NothingToSave)?;
        if self.saved.contains(&entry) {
            return Err(AppError::AlreadySaved);
        }
        let session = self.session.clone().ok_or(AppError::NoSession)?;

        self.saved.push(entry);
        if let Err(e) = self.store.save(&session, &self.saved) {
            self.saved.pop();
            warn!(error = %e, "saving plot failed, gallery rolled back");
            return Err(e.into());
        }

        debug!(session = %session, count = self.saved.len(), "saved plot");
        let index = self.saved.len() - 1;
        Ok(&self.saved[index])
    }

    /// Remove entry `index` from the gallery and persist the list.
    pub fn delete_saved(&mut self, index: usize) -> AppResult<SavedPlotEntry> {
        if index >= self.saved.len() {
            return Err(AppError::SavedPlotNotFound {
                index,
                len: self.saved.len(),
            });
        }
        let session = self.session.clone().ok_or(AppError::NoSession)?;

        let removed = self.saved.remove(index);
        if let Err(e) = self.store.save(&session, &self.saved) {
            self.saved.insert(index, removed);
            warn!(error = %e, "deleting saved plot failed, gallery rolled back");
            return Err(e.into());
        }
        Ok(removed)
    }

    /// Load the settings of saved entry `index` into the form and submit.
    pub fn restore_saved(&mut self, index: usize) -> AppResult<&SubmissionState> {
        let entry = self.saved.get(index).ok_or(AppError::SavedPlotNotFound {
            index,
            len: self.saved.len(),
        })?;
        let form = deserialize(entry.settings())?;
        self.replace_form(form);
        Ok(self.submit())
    }

    /// Switch to a user supplied session id and load its gallery.
    pub fn use_session(&mut self, raw: &str) -> AppResult<usize> {
        let id = SessionId::parse(raw)?;
        self.remember(CacheKey::SessionId, id.as_str());
        self.session = Some(id);
        Ok(self.refresh_saved())
    }

    pub fn new_session(&mut self) -> AppResult<&SessionId> {
        let id = self.store.new_session_id()?;
        info!(session = %id, "started new session");
        self.remember(CacheKey::SessionId, id.as_str());
        self.session = Some(id);
        self.refresh_saved();
        self.session.as_ref().ok_or(AppError::NoSession)
    }

    /// Reload the gallery of the current session. A failing store yields an
    /// empty gallery.
    pub fn refresh_saved(&mut self) -> usize {
        self.saved = match &self.session {
            Some(session) => self.store.load(session).unwrap_or_else(|e| {
                warn!(session = %session, error = %e, "loading saved plots failed");
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.saved.len()
    }

    /// Table catalog, fetched on first use.
    pub fn tables(&mut self) -> AppResult<&TableCatalog> {
        if self.catalog.is_none() {
            let catalog = self.service.list_tables()?;
            debug!(tables = catalog.len(), "fetched table catalog");
            self.catalog = Some(catalog);
        }
        self.catalog
            .as_ref()
            .ok_or_else(|| AppError::Catalog("no catalog".to_string()))
    }

    /// Variable hint of plot `index`, once the catalog has been fetched.
    pub fn variable_hint(&self, index: usize) -> Option<String> {
        let plot = self.form.plot(index)?;
        self.catalog.as_ref()?.hint_for(plot)
    }

    /// Direct image URL of the last successful plot.
    pub fn embed_url(&self) -> Option<String> {
        let snapshot = self.pipeline.snapshot()?;
        self.service.embed_url(&to_query(snapshot.settings()))
    }

    /// JSON of the last successful plot's settings and artifacts, suitable
    /// for [`Self::load_settings_text`].
    pub fn snapshot_json(&self) -> Option<String> {
        self.pipeline.snapshot().and_then(|s| s.to_json().ok())
    }
}

fn restore_last_settings(cache: &impl LocalCache) -> FormState {
    let text = match cache.get(CacheKey::LastSettings) {
        Ok(Some(text)) => text,
        Ok(None) => return FormState::new(),
        Err(e) => {
            warn!(error = %e, "could not read cached settings");
            return FormState::new();
        }
    };
    match parse_settings_json(&text).and_then(|settings| deserialize(&settings)) {
        Ok(form) => {
            debug!(plots = form.plot_count(), "restored last settings");
            form
        }
        Err(e) => {
            warn!(error = %e, "discarding cached settings");
            FormState::new()
        }
    }
}
