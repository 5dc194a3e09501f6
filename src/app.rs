use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::http::client::build_client;
use crate::http::dispatcher::Dispatcher;
use crate::http::runner::SavedRequestRunner;
use crate::http::transport::{ReqwestTransport, Transport};
use crate::state::collection::Collection;
use crate::state::query_cache::{QueryCache, QueryKey, query_key};
use crate::state::request_state::{PersistedRequest, RequestDraft};
use crate::state::response_state::ResponseData;
use crate::state::store::PlaygroundStore;
use crate::state::workspace::Workspace;
use crate::storage::{FileStore, RequestRepository, WorkspaceRepository};

/// Ties the playground store, the query cache and the collaborators
/// together. Every mutation that succeeds invalidates the cached lists it
/// affects; a failed one leaves all state as it was.
pub struct App {
    pub store: PlaygroundStore,
    cache: QueryCache,
    dispatcher: Dispatcher,
    requests: Arc<dyn RequestRepository>,
    workspaces: Arc<dyn WorkspaceRepository>,
}

impl App {
    pub fn new(
        dispatcher: Dispatcher,
        requests: Arc<dyn RequestRepository>,
        workspaces: Arc<dyn WorkspaceRepository>,
    ) -> Self {
        Self {
            store: PlaygroundStore::default(),
            cache: QueryCache::default(),
            dispatcher,
            requests,
            workspaces,
        }
    }

    /// File-backed storage under the configured data dir, reqwest transport.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(build_client(config)?));
        let files = Arc::new(FileStore::new(config.data_dir()));
        debug!(root = %files.root().display(), "using file store");
        let runner = Arc::new(SavedRequestRunner::new(files.clone(), transport.clone()));
        Ok(Self::new(Dispatcher::new(transport, runner), files.clone(), files))
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn invalidate(&mut self, key: QueryKey) {
        self.cache.invalidate(&key);
    }

    /// Send a tab and publish the normalized response to the viewer.
    pub async fn send(&mut self, tab_id: &str) -> Result<ResponseData, AppError> {
        let tab = self
            .store
            .tab(tab_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("tab", tab_id))?;

        let data = match self.dispatcher.send(&tab).await {
            Ok(data) => data,
            Err(e) => {
                warn!(tab = tab_id, error = %e, "send failed");
                return Err(e);
            }
        };

        self.invalidate(query_key(["requests"]));
        self.store.set_response_viewer_data(data.clone());
        Ok(data)
    }

    pub async fn add_request_to_collection(
        &mut self,
        collection_id: &str,
        draft: RequestDraft,
    ) -> Result<PersistedRequest, AppError> {
        let draft = draft.validated()?;
        let saved = self.requests.add_request_to_collection(collection_id, draft).await?;
        self.invalidate(query_key(["requests", collection_id]));
        self.link_active_tab(&saved);
        Ok(saved)
    }

    pub async fn save_request(
        &mut self,
        id: &str,
        draft: RequestDraft,
    ) -> Result<PersistedRequest, AppError> {
        let draft = draft.validated()?;
        let saved = self.requests.save_request(id, draft).await?;
        self.invalidate(query_key(["requests"]));
        self.link_active_tab(&saved);
        Ok(saved)
    }

    pub async fn delete_request(&mut self, collection_id: &str, request_id: &str) -> Result<(), AppError> {
        self.requests.delete_request(request_id).await?;
        self.invalidate(query_key(["requests", collection_id]));
        Ok(())
    }

    pub async fn list_requests(&mut self, collection_id: &str) -> Result<Vec<PersistedRequest>, AppError> {
        let key = query_key(["requests", collection_id]);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }
        let requests = self.requests.get_all_request_from_collection(collection_id).await?;
        self.cache.insert(key, &requests);
        Ok(requests)
    }

    fn link_active_tab(&mut self, saved: &PersistedRequest) {
        let Some(active) = self.store.active_tab_id().map(str::to_string) else {
            return;
        };
        if let Err(e) = self.store.update_tab_from_saved_request(&active, saved) {
            warn!(tab = %active, error = %e, "could not link tab to saved request");
        }
    }

    pub async fn initialize_workspace(&mut self) -> Result<Workspace, AppError> {
        let workspace = self.workspaces.initialize_workspace().await?;
        self.invalidate(query_key(["workspaces"]));
        Ok(workspace)
    }

    pub async fn create_workspace(&mut self, name: &str) -> Result<Workspace, AppError> {
        let name = required(name, "Workspace name is required")?;
        let workspace = self.workspaces.create_workspace(name).await?;
        self.invalidate(query_key(["workspaces"]));
        Ok(workspace)
    }

    pub async fn workspaces(&mut self) -> Result<Vec<Workspace>, AppError> {
        let key = query_key(["workspaces"]);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }
        let workspaces = self.workspaces.get_workspaces().await?;
        self.cache.insert(key, &workspaces);
        Ok(workspaces)
    }

    pub async fn workspace(&mut self, id: &str) -> Result<Workspace, AppError> {
        let key = query_key(["workspace", id]);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }
        let workspace = self.workspaces.get_workspace_by_id(id).await?;
        self.cache.insert(key, &workspace);
        Ok(workspace)
    }

    pub async fn create_collection(&mut self, workspace_id: &str, name: &str) -> Result<Collection, AppError> {
        let name = required(name, "Collection name is required")?;
        let collection = self.workspaces.create_collection(workspace_id, name).await?;
        self.invalidate(query_key(["collections", workspace_id]));
        Ok(collection)
    }

    pub async fn collections(&mut self, workspace_id: &str) -> Result<Vec<Collection>, AppError> {
        let key = query_key(["collections", workspace_id]);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }
        let collections = self.workspaces.get_collections(workspace_id).await?;
        self.cache.insert(key, &collections);
        Ok(collections)
    }
}

fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::Validation(message.to_string()))
    } else {
        Ok(trimmed)
    }
}
