use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            other => Err(AppError::Validation(format!("Unsupported HTTP method '{other}'"))),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// One row of the headers or parameters editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl KeyValueEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

/// Editor rows are loosely typed: numbers and booleans are accepted and kept
/// as their text form, null reads as empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

/// How a tab is executed when sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Built from the in-memory tab fields.
    Playground,
    /// Executed by persisted id.
    Saved { request_id: String },
}

/// Editable draft of a request, one per open tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTab {
    pub id: String,
    pub request_id: Option<String>,
    pub collection_id: Option<String>,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub headers: Option<String>,
    pub parameters: Option<String>,
    pub unsaved_changes: bool,
}

impl Default for RequestTab {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            request_id: None,
            collection_id: None,
            name: String::from("Untitled"),
            method: HttpMethod::default(),
            url: String::new(),
            body: None,
            headers: None,
            parameters: None,
            unsaved_changes: false,
        }
    }
}

impl RequestTab {
    pub fn is_playground(&self) -> bool {
        self.request_id.is_none() || self.unsaved_changes
    }

    pub fn mode(&self) -> ExecutionMode {
        match &self.request_id {
            Some(id) if !self.unsaved_changes => ExecutionMode::Saved {
                request_id: id.clone(),
            },
            _ => ExecutionMode::Playground,
        }
    }

    /// Apply an edit. Every edit marks the tab as diverged from its saved form.
    pub fn apply(&mut self, patch: TabPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(method) = patch.method {
            self.method = method;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(body) = patch.body {
            self.body = non_empty(body);
        }
        if let Some(headers) = patch.headers {
            self.headers = non_empty(headers);
        }
        if let Some(parameters) = patch.parameters {
            self.parameters = non_empty(parameters);
        }
        self.unsaved_changes = true;
    }

    /// Overwrite the editable fields with a persisted request and link to it.
    pub fn load_saved(&mut self, saved: &PersistedRequest) {
        self.request_id = Some(saved.id.clone());
        self.collection_id = Some(saved.collection_id.clone());
        self.name = saved.name.clone();
        self.method = saved.method;
        self.url = saved.url.clone();
        self.body = saved.body.clone();
        self.headers = saved.headers.clone();
        self.parameters = saved.parameters.clone();
        self.unsaved_changes = false;
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Partial update for a tab; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct TabPatch {
    pub name: Option<String>,
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub body: Option<String>,
    pub headers: Option<String>,
    pub parameters: Option<String>,
}

/// Request fields submitted for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub headers: Option<String>,
    pub parameters: Option<String>,
}

impl RequestDraft {
    pub fn new(name: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            url: url.into(),
            body: None,
            headers: None,
            parameters: None,
        }
    }

    /// Name and URL are required; both are trimmed, and empty optional text
    /// fields are dropped.
    pub fn validated(self) -> Result<Self, AppError> {
        let name = self.name.trim().to_string();
        let url = self.url.trim().to_string();
        if name.is_empty() || url.is_empty() {
            return Err(AppError::Validation("Name and URL are required".into()));
        }
        Ok(Self {
            name,
            url,
            body: self.body.and_then(non_empty),
            headers: self.headers.and_then(non_empty),
            parameters: self.parameters.and_then(non_empty),
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRequest {
    pub id: String,
    pub collection_id: String,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub headers: Option<String>,
    pub parameters: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersistedRequest {
    pub fn from_draft(collection_id: impl Into<String>, draft: RequestDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            collection_id: collection_id.into(),
            name: draft.name,
            method: draft.method,
            url: draft.url,
            body: draft.body,
            headers: draft.headers,
            parameters: draft.parameters,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update(&mut self, draft: RequestDraft) {
        self.name = draft.name;
        self.method = draft.method;
        self.url = draft.url;
        self.body = draft.body;
        self.headers = draft.headers;
        self.parameters = draft.parameters;
        self.updated_at = Utc::now();
    }
}
