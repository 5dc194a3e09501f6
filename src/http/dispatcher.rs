use std::sync::Arc;

use tracing::info;

use crate::error::AppError;
use crate::http::headers::filter_response_data;
use crate::http::normalize::normalize;
use crate::http::runner::RequestRunner;
use crate::http::transport::{DirectRequest, Transport};
use crate::state::request_state::{ExecutionMode, RequestTab};
use crate::state::response_state::ResponseData;

/// Sends a tab either straight from its fields (playground) or by its
/// persisted id (saved). Errors are passed through untouched; nothing is
/// retried.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    runner: Arc<dyn RequestRunner>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, runner: Arc<dyn RequestRunner>) -> Self {
        Self { transport, runner }
    }

    /// The call a playground send would issue for `tab`.
    pub fn direct_request(tab: &RequestTab) -> DirectRequest {
        DirectRequest::from_fields(
            tab.method,
            &tab.url,
            tab.body.as_deref(),
            tab.headers.as_deref(),
            tab.parameters.as_deref(),
        )
    }

    pub async fn send(&self, tab: &RequestTab) -> Result<ResponseData, AppError> {
        match tab.mode() {
            ExecutionMode::Playground => {
                info!(tab = %tab.id, method = %tab.method, url = %tab.url, "sending playground request");
                let raw = self.transport.send_request(Self::direct_request(tab)).await?;
                Ok(normalize(raw))
            }
            ExecutionMode::Saved { request_id } => {
                info!(tab = %tab.id, request = %request_id, "running saved request");
                let data = self.runner.run(&request_id).await?;
                Ok(filter_response_data(data))
            }
        }
    }
}
