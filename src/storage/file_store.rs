use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::collection::Collection;
use crate::state::request_state::{PersistedRequest, RequestDraft};
use crate::state::workspace::{DEFAULT_WORKSPACE_NAME, Workspace};
use crate::storage::{RequestRepository, WorkspaceRepository};

const WORKSPACES: &str = "workspaces";
const COLLECTIONS: &str = "collections";
const REQUESTS: &str = "requests";

/// One TOML file per record: `<root>/<kind>/<id>.toml`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, kind: &str, id: &str) -> PathBuf {
        self.root.join(kind).join(format!("{id}.toml"))
    }

    async fn write<T: Serialize>(&self, kind: &str, id: &str, record: &T) -> Result<(), AppError> {
        let path = self.path(kind, id);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let content = toml::to_string_pretty(record)?;
        tokio::fs::write(&path, content).await?;
        debug!(path = %path.display(), "record written");
        Ok(())
    }

    async fn read<T: DeserializeOwned>(&self, kind: &'static str, id: &str) -> Result<T, AppError> {
        // Ids become file names; anything outside the uuid alphabet can't exist.
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(AppError::not_found(singular(kind), id));
        }
        match tokio::fs::read_to_string(self.path(kind, id)).await {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found(singular(kind), id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All parseable records of a kind. Unreadable files are skipped.
    async fn read_all<T: DeserializeOwned>(&self, kind: &str) -> Result<Vec<T>, AppError> {
        let dir = self.root.join(kind);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path).await?;
            match toml::from_str::<T>(&content) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable record"),
            }
        }
        Ok(records)
    }
}

fn singular(kind: &str) -> &'static str {
    match kind {
        WORKSPACES => "workspace",
        COLLECTIONS => "collection",
        _ => "request",
    }
}

#[async_trait]
impl RequestRepository for FileStore {
    async fn get_request(&self, id: &str) -> Result<PersistedRequest, AppError> {
        self.read(REQUESTS, id).await
    }

    async fn save_request(&self, id: &str, draft: RequestDraft) -> Result<PersistedRequest, AppError> {
        let mut request: PersistedRequest = self.read(REQUESTS, id).await?;
        request.update(draft);
        self.write(REQUESTS, &request.id, &request).await?;
        Ok(request)
    }

    async fn add_request_to_collection(
        &self,
        collection_id: &str,
        draft: RequestDraft,
    ) -> Result<PersistedRequest, AppError> {
        let collection: Collection = self.read(COLLECTIONS, collection_id).await?;
        let request = PersistedRequest::from_draft(collection.id, draft);
        self.write(REQUESTS, &request.id, &request).await?;
        Ok(request)
    }

    async fn delete_request(&self, id: &str) -> Result<(), AppError> {
        let request: PersistedRequest = self.read(REQUESTS, id).await?;
        tokio::fs::remove_file(self.path(REQUESTS, &request.id)).await?;
        debug!(request = id, "request deleted");
        Ok(())
    }

    async fn get_all_request_from_collection(
        &self,
        collection_id: &str,
    ) -> Result<Vec<PersistedRequest>, AppError> {
        let mut requests: Vec<PersistedRequest> = self
            .read_all::<PersistedRequest>(REQUESTS)
            .await?
            .into_iter()
            .filter(|r: &PersistedRequest| r.collection_id == collection_id)
            .collect();
        requests.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(requests)
    }
}

#[async_trait]
impl WorkspaceRepository for FileStore {
    async fn create_workspace(&self, name: &str) -> Result<Workspace, AppError> {
        let workspace = Workspace::new(name);
        self.write(WORKSPACES, &workspace.id, &workspace).await?;
        Ok(workspace)
    }

    async fn get_workspaces(&self) -> Result<Vec<Workspace>, AppError> {
        let mut workspaces: Vec<Workspace> = self.read_all(WORKSPACES).await?;
        workspaces.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(workspaces)
    }

    async fn get_workspace_by_id(&self, id: &str) -> Result<Workspace, AppError> {
        self.read(WORKSPACES, id).await
    }

    async fn initialize_workspace(&self) -> Result<Workspace, AppError> {
        if let Some(first) = self.get_workspaces().await?.into_iter().next() {
            return Ok(first);
        }
        self.create_workspace(DEFAULT_WORKSPACE_NAME).await
    }

    async fn create_collection(
        &self,
        workspace_id: &str,
        name: &str,
    ) -> Result<Collection, AppError> {
        let workspace: Workspace = self.read(WORKSPACES, workspace_id).await?;
        let collection = Collection::new(workspace.id, name);
        self.write(COLLECTIONS, &collection.id, &collection).await?;
        Ok(collection)
    }

    async fn get_collections(&self, workspace_id: &str) -> Result<Vec<Collection>, AppError> {
        let mut collections: Vec<Collection> = self
            .read_all::<Collection>(COLLECTIONS)
            .await?
            .into_iter()
            .filter(|c: &Collection| c.workspace_id == workspace_id)
            .collect();
        collections.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(collections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::request_state::HttpMethod;

    async fn seeded() -> (tempfile::TempDir, FileStore, Collection) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let ws = store.create_workspace("Team").await.unwrap();
        let col = store.create_collection(&ws.id, "Users API").await.unwrap();
        (dir, store, col)
    }

    #[tokio::test]
    async fn test_add_and_list_requests() {
        let (_dir, store, col) = seeded().await;
        let mut draft = RequestDraft::new("List", HttpMethod::Get, "https://api.test/users");
        draft.headers = Some(r#"[{"key":"Accept","value":"application/json"}]"#.into());
        let saved = store.add_request_to_collection(&col.id, draft).await.unwrap();
        store
            .add_request_to_collection(&col.id, RequestDraft::new("Create", HttpMethod::Post, "https://api.test/users"))
            .await
            .unwrap();

        let listed = store.get_all_request_from_collection(&col.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&saved));
        assert!(store.get_all_request_from_collection("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_to_unknown_collection() {
        let (_dir, store, _col) = seeded().await;
        let err = store
            .add_request_to_collection("missing", RequestDraft::new("x", HttpMethod::Get, "https://a"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { kind: "collection", .. }));
    }

    #[tokio::test]
    async fn test_save_request_updates_fields() {
        let (_dir, store, col) = seeded().await;
        let saved = store
            .add_request_to_collection(&col.id, RequestDraft::new("Old", HttpMethod::Get, "https://a"))
            .await
            .unwrap();
        let updated = store
            .save_request(&saved.id, RequestDraft::new("New", HttpMethod::Patch, "https://b"))
            .await
            .unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.created_at, saved.created_at);
        assert_eq!(store.get_request(&saved.id).await.unwrap().name, "New");
        assert_eq!(updated.method, HttpMethod::Patch);
    }

    #[tokio::test]
    async fn test_delete_request() {
        let (_dir, store, col) = seeded().await;
        let saved = store
            .add_request_to_collection(&col.id, RequestDraft::new("x", HttpMethod::Get, "https://a"))
            .await
            .unwrap();
        store.delete_request(&saved.id).await.unwrap();
        assert!(matches!(
            store.get_request(&saved.id).await,
            Err(AppError::NotFound { kind: "request", .. })
        ));
        assert!(store.delete_request(&saved.id).await.is_err());
    }

    #[tokio::test]
    async fn test_path_like_ids_are_not_found() {
        let (_dir, store, _col) = seeded().await;
        assert!(matches!(
            store.get_request("../workspaces/x").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_initialize_workspace_creates_default_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let first = store.initialize_workspace().await.unwrap();
        assert_eq!(first.name, DEFAULT_WORKSPACE_NAME);
        let again = store.initialize_workspace().await.unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(store.get_workspaces().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_files_skipped() {
        let (dir, store, col) = seeded().await;
        std::fs::write(dir.path().join("collections").join("junk.toml"), "not = [toml").unwrap();
        let collections = store.get_collections(&col.workspace_id).await.unwrap();
        assert_eq!(collections, vec![col]);
    }
}
