use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::http::transport::{DirectRequest, Transport};
use crate::state::response_state::{RequestRun, ResponseData};
use crate::storage::RequestRepository;

/// Executes a persisted request by id and reports the run.
#[async_trait]
pub trait RequestRunner: Send + Sync {
    async fn run(&self, request_id: &str) -> Result<ResponseData, AppError>;
}

/// Loads the saved definition and sends it over a transport.
///
/// Headers come back unfiltered; the dispatcher owns the allow-list.
pub struct SavedRequestRunner {
    repository: Arc<dyn RequestRepository>,
    transport: Arc<dyn Transport>,
}

impl SavedRequestRunner {
    pub fn new(repository: Arc<dyn RequestRepository>, transport: Arc<dyn Transport>) -> Self {
        Self {
            repository,
            transport,
        }
    }
}

#[async_trait]
impl RequestRunner for SavedRequestRunner {
    async fn run(&self, request_id: &str) -> Result<ResponseData, AppError> {
        let saved = self.repository.get_request(request_id).await?;
        debug!(request = %saved.id, name = %saved.name, "running saved request");

        let request = DirectRequest::from_fields(
            saved.method,
            &saved.url,
            saved.body.as_deref(),
            saved.headers.as_deref(),
            saved.parameters.as_deref(),
        );
        let result = self.transport.send_request(request).await?;

        Ok(ResponseData {
            success: true,
            request_run: RequestRun {
                id: Uuid::new_v4().to_string(),
                request_id: Some(saved.id),
                status: result.status,
                status_text: result.status_text.clone(),
                headers: result.headers.clone(),
                body: Some(result.data.clone()),
                duration_ms: result.duration,
                created_at: Utc::now(),
            },
            result: Some(result),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::http::client::build_client;
    use crate::http::transport::ReqwestTransport;
    use crate::state::request_state::{HttpMethod, RequestDraft};
    use crate::storage::{FileStore, WorkspaceRepository};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_run_uses_saved_definition() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/items/7"))
            .and(query_param("dry", "1"))
            .and(header("authorization", "Bearer t"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-trace", "abc")
                    .set_body_json(json!({"ok": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let ws = store.create_workspace("w").await.unwrap();
        let col = store.create_collection(&ws.id, "c").await.unwrap();
        let mut draft = RequestDraft::new("Update", HttpMethod::Put, format!("{}/items/7", server.uri()));
        draft.headers = Some(r#"[{"key":"Authorization","value":"Bearer t"}]"#.into());
        draft.parameters = Some(r#"[{"key":"dry","value":"1"}]"#.into());
        let saved = store.add_request_to_collection(&col.id, draft).await.unwrap();

        let transport = Arc::new(ReqwestTransport::new(build_client(&Config::default()).unwrap()));
        let runner = SavedRequestRunner::new(store, transport);
        let data = runner.run(&saved.id).await.unwrap();

        assert!(data.success);
        assert_eq!(data.request_run.request_id.as_deref(), Some(saved.id.as_str()));
        assert_ne!(data.request_run.id, saved.id);
        assert_eq!(data.request_run.status, Some(200));
        assert_eq!(data.request_run.body, Some(json!({"ok": true})));
        let headers = data.request_run.headers.unwrap();
        assert_eq!(headers.get("x-trace").map(String::as_str), Some("abc"));
    }

    #[tokio::test]
    async fn test_run_unknown_request() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let transport = Arc::new(ReqwestTransport::new(build_client(&Config::default()).unwrap()));
        let runner = SavedRequestRunner::new(store, transport);
        let err = runner.run("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
