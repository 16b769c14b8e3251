//! Error types for Confluence integration.

use std::fmt;
use std::path::PathBuf;

use crate::reference::{ContentId, PageReference};
use crate::template::TemplateError;
use crate::types::{ContentType, Representation};

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Response parsed but did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Coarse classification of a [`ConfluenceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 401 or 403.
    Unauthorized,
    /// 404.
    NotFound,
    /// 409: the write was based on a stale version.
    Conflict,
    /// Network failure, timeout, 429 or 5xx. Worth retrying.
    Transient,
    /// Bad request or a response we could not parse.
    Malformed,
    Other,
}

impl ConfluenceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HttpRequest(_) | Self::Io(_) => ErrorKind::Transient,
            Self::HttpResponse { status, .. } => match status {
                401 | 403 => ErrorKind::Unauthorized,
                404 => ErrorKind::NotFound,
                409 => ErrorKind::Conflict,
                408 | 429 | 500..=599 => ErrorKind::Transient,
                400 | 413 | 415 => ErrorKind::Malformed,
                _ => ErrorKind::Other,
            },
            Self::Json(_) | Self::UnexpectedResponse(_) => ErrorKind::Malformed,
        }
    }

    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

/// Pipeline stage of a publish run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prepare,
    Render,
    Resolve,
    Convert,
    Fetch,
    Merge,
    Write,
    Attachments,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prepare => "prepare",
            Self::Render => "render",
            Self::Resolve => "resolve",
            Self::Convert => "convert",
            Self::Fetch => "fetch",
            Self::Merge => "merge",
            Self::Write => "write",
            Self::Attachments => "attachments",
            Self::Export => "export",
        };
        f.write_str(name)
    }
}

/// Terminal error of a publish run.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Request is incomplete or contradictory.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("ambiguous page reference: {0}")]
    AmbiguousReference(String),

    /// Relative reference matched nothing.
    #[error("{content_type} not found: {reference}")]
    NotFound {
        content_type: ContentType,
        reference: PageReference,
    },

    #[error("failed to render input")]
    Render(#[from] TemplateError),

    #[error("conversion to storage format failed")]
    ConversionFailed(#[source] ConfluenceError),

    /// Merge was attempted on a body that is not in storage format.
    #[error("cannot merge {0} content, convert it to storage first")]
    UnconvertedBody(Representation),

    /// Someone else wrote the item between our read and our write.
    #[error("version conflict on content {id}: update was based on version {version}")]
    Conflict {
        id: ContentId,
        version: u32,
        #[source]
        source: ConfluenceError,
    },

    #[error("{stage} stage failed")]
    Transport {
        stage: Stage,
        #[source]
        source: ConfluenceError,
    },

    #[error("cancelled during {0} stage")]
    Cancelled(Stage),

    #[error("I/O error on {}", path.display())]
    Io {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    /// Stage the run stopped in.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Config(_) | Self::AmbiguousReference(_) => Stage::Prepare,
            Self::NotFound { .. } => Stage::Resolve,
            Self::Render(_) => Stage::Render,
            Self::ConversionFailed(_) => Stage::Convert,
            Self::UnconvertedBody(_) => Stage::Merge,
            Self::Conflict { .. } => Stage::Write,
            Self::Transport { stage, .. } | Self::Io { stage, .. } | Self::Cancelled(stage) => {
                *stage
            }
        }
    }

    /// Wrap a client error raised in `stage`.
    pub(crate) fn transport(stage: Stage) -> impl FnOnce(ConfluenceError) -> Self {
        move |source| Self::Transport { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> ConfluenceError {
        ConfluenceError::HttpResponse {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(status(401).kind(), ErrorKind::Unauthorized);
        assert_eq!(status(403).kind(), ErrorKind::Unauthorized);
        assert_eq!(status(404).kind(), ErrorKind::NotFound);
        assert_eq!(status(409).kind(), ErrorKind::Conflict);
        assert_eq!(status(400).kind(), ErrorKind::Malformed);
        assert_eq!(status(418).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_transient_statuses() {
        for code in [408, 429, 500, 502, 503, 504] {
            assert!(status(code).is_transient(), "{code} should be transient");
        }
        assert!(!status(404).is_transient());
    }

    #[test]
    fn test_unexpected_response_is_malformed() {
        let err = ConfluenceError::UnexpectedResponse("empty".to_owned());
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_publish_error_stage() {
        assert_eq!(PublishError::Config("x".to_owned()).stage(), Stage::Prepare);
        assert_eq!(PublishError::Cancelled(Stage::Convert).stage(), Stage::Convert);
        let err = PublishError::transport(Stage::Fetch)(status(500));
        assert_eq!(err.stage(), Stage::Fetch);
        assert_eq!(err.to_string(), "fetch stage failed");
    }
}
