use tokio::sync::watch;
use tracing::debug;

use crate::error::AppError;
use crate::state::request_state::{PersistedRequest, RequestTab, TabPatch};
use crate::state::response_state::ResponseData;

/// Open request tabs plus the response viewer slot.
///
/// The viewer slot is overwritten wholesale on every successful dispatch;
/// readers subscribe for change notifications.
#[derive(Debug)]
pub struct PlaygroundStore {
    tabs: Vec<RequestTab>,
    active_tab_id: Option<String>,
    response: watch::Sender<Option<ResponseData>>,
}

impl Default for PlaygroundStore {
    fn default() -> Self {
        let (response, _) = watch::channel(None);
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
            response,
        }
    }
}

impl PlaygroundStore {
    pub fn tabs(&self) -> &[RequestTab] {
        &self.tabs
    }

    pub fn tab(&self, id: &str) -> Option<&RequestTab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn active_tab_id(&self) -> Option<&str> {
        self.active_tab_id.as_deref()
    }

    pub fn active_tab(&self) -> Option<&RequestTab> {
        self.active_tab_id.as_deref().and_then(|id| self.tab(id))
    }

    /// Open a new blank tab and make it active.
    pub fn open_tab(&mut self) -> &RequestTab {
        self.push(RequestTab::default())
    }

    /// Open a tab holding `tab` as-is and make it active.
    pub fn open_with(&mut self, tab: RequestTab) -> &RequestTab {
        self.push(tab)
    }

    /// Open a tab linked to a persisted request.
    pub fn open_saved_tab(&mut self, saved: &PersistedRequest) -> &RequestTab {
        let mut tab = RequestTab::default();
        tab.load_saved(saved);
        self.push(tab)
    }

    fn push(&mut self, tab: RequestTab) -> &RequestTab {
        self.active_tab_id = Some(tab.id.clone());
        self.tabs.push(tab);
        &self.tabs[self.tabs.len() - 1]
    }

    pub fn set_active_tab(&mut self, id: &str) -> Result<(), AppError> {
        if self.tab(id).is_none() {
            return Err(AppError::not_found("tab", id));
        }
        self.active_tab_id = Some(id.to_string());
        Ok(())
    }

    pub fn update_tab(&mut self, id: &str, patch: TabPatch) -> Result<&RequestTab, AppError> {
        let tab = self.tab_mut(id)?;
        tab.apply(patch);
        Ok(&*tab)
    }

    pub fn update_tab_from_saved_request(
        &mut self,
        id: &str,
        saved: &PersistedRequest,
    ) -> Result<&RequestTab, AppError> {
        let tab = self.tab_mut(id)?;
        tab.load_saved(saved);
        debug!(tab = id, request = %saved.id, "tab linked to saved request");
        Ok(&*tab)
    }

    /// Close a tab. When it was active, the tab now at its position (or the
    /// new last tab) becomes active.
    pub fn close_tab(&mut self, id: &str) -> Result<RequestTab, AppError> {
        let idx = self
            .tabs
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AppError::not_found("tab", id))?;
        let closed = self.tabs.remove(idx);
        if self.active_tab_id.as_deref() == Some(id) {
            let next = idx.min(self.tabs.len().saturating_sub(1));
            self.active_tab_id = self.tabs.get(next).map(|t| t.id.clone());
        }
        Ok(closed)
    }

    fn tab_mut(&mut self, id: &str) -> Result<&mut RequestTab, AppError> {
        self.tabs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::not_found("tab", id))
    }

    pub fn set_response_viewer_data(&self, data: ResponseData) {
        debug!(run = %data.request_run.id, "response viewer updated");
        self.response.send_replace(Some(data));
    }

    pub fn response_viewer_data(&self) -> Option<ResponseData> {
        self.response.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ResponseData>> {
        self.response.subscribe()
    }
}
