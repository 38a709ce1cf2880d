use std::path::PathBuf;
use thiserror::Error;

/// A non-success response from the GitHub API.
///
/// The status and body are kept verbatim so callers can inspect the
/// platform's message (see [`crate::disabled`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("GitHub API returned {status}: {body}")]
pub struct ApiError {
    pub status: u16,
    pub body: String,
}

impl ApiError {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The `message` field of a GitHub JSON error body, if the body is one.
    pub fn message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value.get("message")?.as_str().map(str::to_string)
    }
}

/// Unified error type for alert retrieval and reporting.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server version could not be determined.
    #[error("Failed to determine server version from {url}: {reason}")]
    VersionLookup { url: String, reason: String },

    /// The stafftools repository report kept answering 202.
    #[error("Repository report at {url} was not ready after {attempts} attempts")]
    ReportNotReady { url: String, attempts: u32 },

    /// The request never produced a response.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON.
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    /// The underlying API error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            ReportError::Api(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_from_json_body() {
        let err = ApiError::new(
            404,
            r#"{"message":"Secret scanning is disabled on this repository.","documentation_url":"https://docs.github.com"}"#,
        );
        assert_eq!(
            err.message().as_deref(),
            Some("Secret scanning is disabled on this repository.")
        );
    }

    #[test]
    fn test_api_error_message_plain_body() {
        let err = ApiError::new(500, "upstream timeout");
        assert_eq!(err.message(), None);
        assert_eq!(err.to_string(), "GitHub API returned 500: upstream timeout");
    }

    #[test]
    fn test_as_api() {
        let err = ReportError::from(ApiError::new(401, "Bad credentials"));
        assert_eq!(err.as_api().map(|e| e.status), Some(401));
        assert!(ReportError::Config("x".into()).as_api().is_none());
    }
}
