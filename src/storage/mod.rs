//! Persistence for workspaces, collections and saved requests.
//!
//! The app talks to the traits; `FileStore` is the on-disk implementation.

pub mod file_store;

use async_trait::async_trait;

use crate::error::AppError;
use crate::state::collection::Collection;
use crate::state::request_state::{PersistedRequest, RequestDraft};
use crate::state::workspace::Workspace;

pub use file_store::FileStore;

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn get_request(&self, id: &str) -> Result<PersistedRequest, AppError>;

    /// Overwrite an existing request's fields.
    async fn save_request(&self, id: &str, draft: RequestDraft) -> Result<PersistedRequest, AppError>;

    async fn add_request_to_collection(
        &self,
        collection_id: &str,
        draft: RequestDraft,
    ) -> Result<PersistedRequest, AppError>;

    async fn delete_request(&self, id: &str) -> Result<(), AppError>;

    async fn get_all_request_from_collection(
        &self,
        collection_id: &str,
    ) -> Result<Vec<PersistedRequest>, AppError>;
}

#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn create_workspace(&self, name: &str) -> Result<Workspace, AppError>;

    async fn get_workspaces(&self) -> Result<Vec<Workspace>, AppError>;

    async fn get_workspace_by_id(&self, id: &str) -> Result<Workspace, AppError>;

    /// First workspace, creating the default one when none exists yet.
    async fn initialize_workspace(&self) -> Result<Workspace, AppError>;

    async fn create_collection(&self, workspace_id: &str, name: &str)
    -> Result<Collection, AppError>;

    async fn get_collections(&self, workspace_id: &str) -> Result<Vec<Collection>, AppError>;
}
