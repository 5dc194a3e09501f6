#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Request timed out")]
    Timeout,
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid header '{0}'")]
    InvalidHeader(String),
    #[error("{0}")]
    Validation(String),
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl AppError {
    /// Failures at the transport boundary. The UI collapses all of these
    /// into one generic notification.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Http(_)
                | AppError::Timeout
                | AppError::InvalidUrl { .. }
                | AppError::InvalidHeader(_)
        )
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound { kind, id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(AppError::Timeout.is_transport());
        assert!(AppError::InvalidHeader("x y".into()).is_transport());
        assert!(!AppError::Validation("Name and URL are required".into()).is_transport());
        assert!(!AppError::not_found("request", "r1").is_transport());
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("collection", "c1");
        assert_eq!(err.to_string(), "collection 'c1' not found");
    }
}
