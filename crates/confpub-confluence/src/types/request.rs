//! Request shapes sent to the content API.

use std::path::Path;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Value, json};

use super::ContentType;
use crate::reference::ContentId;

/// Default page size for content searches.
const DEFAULT_LIMIT: usize = 25;

/// Lifecycle status filter for searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStatus {
    Current,
    Draft,
    Trashed,
}

impl ContentStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Draft => "draft",
            Self::Trashed => "trashed",
        }
    }
}

/// Filter for `GET /rest/api/content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub content_type: ContentType,
    pub space_key: Option<String>,
    pub title: Option<String>,
    pub status: Option<ContentStatus>,
    pub expand: Vec<String>,
    pub start: usize,
    pub limit: usize,
}

impl ContentQuery {
    /// Query for content of `content_type` with an exact title in a space.
    #[must_use]
    pub fn by_title(content_type: ContentType, space_key: &str, title: &str) -> Self {
        Self {
            content_type,
            space_key: Some(space_key.to_owned()),
            title: Some(title.to_owned()),
            status: None,
            expand: Vec::new(),
            start: 0,
            limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub fn expand(mut self, fields: &[&str]) -> Self {
        self.expand = fields.iter().map(|field| (*field).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn status(mut self, status: ContentStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn page(mut self, start: usize, limit: usize) -> Self {
        self.start = start;
        self.limit = limit;
        self
    }

    /// Percent-encoded query string, without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut params = vec![("type", self.content_type.as_str().to_owned())];
        if let Some(space) = &self.space_key {
            params.push(("spaceKey", space.clone()));
        }
        if let Some(title) = &self.title {
            params.push(("title", title.clone()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_owned()));
        }
        if !self.expand.is_empty() {
            params.push(("expand", self.expand.join(",")));
        }
        params.push(("start", self.start.to_string()));
        params.push(("limit", self.limit.to_string()));

        params
            .iter()
            .map(|(key, value)| format!("{key}={}", utf8_percent_encode(value, NON_ALPHANUMERIC)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// New content item. The body is always in storage format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub content_type: ContentType,
    pub space_key: Option<String>,
    pub title: Option<String>,
    /// Parent pages; only the first is sent.
    pub ancestors: Vec<ContentId>,
    /// Page a comment belongs to.
    pub container: Option<ContentId>,
    pub storage: String,
}

impl NewContent {
    /// Child page of `parent`.
    #[must_use]
    pub fn page(space_key: &str, title: &str, parent: ContentId, storage: String) -> Self {
        Self {
            content_type: ContentType::Page,
            space_key: Some(space_key.to_owned()),
            title: Some(title.to_owned()),
            ancestors: vec![parent],
            container: None,
            storage,
        }
    }

    /// Blog post in a space.
    #[must_use]
    pub fn blog_post(space_key: &str, title: &str, storage: String) -> Self {
        Self {
            content_type: ContentType::BlogPost,
            space_key: Some(space_key.to_owned()),
            title: Some(title.to_owned()),
            ancestors: Vec::new(),
            container: None,
            storage,
        }
    }

    /// Comment on a page.
    #[must_use]
    pub fn comment(page: ContentId, storage: String) -> Self {
        Self {
            content_type: ContentType::Comment,
            space_key: None,
            title: None,
            ancestors: Vec::new(),
            container: Some(page),
            storage,
        }
    }

    /// JSON payload for `POST /rest/api/content`.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let mut payload = json!({
            "type": self.content_type.as_str(),
            "body": {
                "storage": {
                    "value": self.storage,
                    "representation": "storage"
                }
            }
        });
        if let Some(title) = &self.title {
            payload["title"] = json!(title);
        }
        if let Some(space) = &self.space_key {
            payload["space"] = json!({ "key": space });
        }
        if let Some(parent) = self.ancestors.first() {
            payload["ancestors"] = json!([{ "id": parent.as_str() }]);
        }
        if let Some(container) = &self.container {
            payload["container"] = json!({ "id": container.as_str(), "type": "page" });
        }
        payload
    }
}

/// Replacement body and metadata for an existing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUpdate {
    pub content_type: ContentType,
    pub title: String,
    pub storage: String,
    /// Version comment shown in page history.
    pub message: Option<String>,
}

impl ContentUpdate {
    /// JSON payload for `PUT /rest/api/content/{id}` at version `number`.
    #[must_use]
    pub fn to_payload(&self, number: u32) -> Value {
        let mut payload = json!({
            "type": self.content_type.as_str(),
            "title": self.title,
            "body": {
                "storage": {
                    "value": self.storage,
                    "representation": "storage"
                }
            },
            "version": { "number": number }
        });
        if let Some(message) = &self.message {
            payload["version"]["message"] = json!(message);
        }
        payload
    }
}

/// A local file ready to be uploaded as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub filename: String,
    pub media_type: &'static str,
    pub data: Vec<u8>,
}

impl AttachmentFile {
    /// Read `path` and guess its media type from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the path has no file name or cannot be read.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("no usable file name in {}", path.display()),
                )
            })?
            .to_owned();
        let data = std::fs::read(path)?;
        Ok(Self {
            media_type: guess_media_type(&filename),
            filename,
            data,
        })
    }
}

fn guess_media_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("html" | "htm") => "text/html",
        Some("txt" | "log") => "text/plain",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("jar") => "application/java-archive",
        Some("doc") => "application/msword",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
