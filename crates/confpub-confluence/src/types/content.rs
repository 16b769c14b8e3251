//! Confluence content types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Page,
    BlogPost,
    Comment,
    Attachment,
    /// Any type this client does not handle.
    #[serde(other)]
    Other,
}

impl ContentType {
    /// Name used by the REST API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::BlogPost => "blogpost",
            Self::Comment => "comment",
            Self::Attachment => "attachment",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markup representation of a content body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Confluence storage format (XHTML with `ac:` macros).
    Storage,
    /// Legacy wiki markup.
    Wiki,
}

impl Representation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Wiki => "wiki",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content item as returned by `/rest/api/content`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Content {
    /// Content ID.
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(default)]
    pub status: Option<String>,
    /// Title. Comments come back with an empty or generated title.
    #[serde(default)]
    pub title: String,
    /// Owning space, present when `space` is expanded.
    #[serde(default)]
    pub space: Option<SpaceRef>,
    /// Version information, present when `version` is expanded.
    #[serde(default)]
    pub version: Option<Version>,
    /// Body, present when `body.storage` is expanded.
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl Content {
    /// Storage-format body text, if it was expanded.
    #[must_use]
    pub fn storage_value(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.storage.as_ref())
            .map(|storage| storage.value.as_str())
    }

    /// Web UI path relative to the server base URL.
    #[must_use]
    pub fn webui(&self) -> Option<&str> {
        self.links.as_ref().and_then(|links| links.webui.as_deref())
    }
}

/// Space reference embedded in content.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpaceRef {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Content version.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Version message/comment.
    #[serde(default)]
    pub message: Option<String>,
}

/// Content body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Body {
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    pub value: String,
    /// Representation name (always "storage").
    pub representation: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Links {
    /// Web UI link.
    #[serde(default)]
    pub webui: Option<String>,
    /// Download link, set on attachments.
    #[serde(default)]
    pub download: Option<String>,
    /// API self link.
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResults {
    pub results: Vec<Content>,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub limit: usize,
    /// Number of results in this page.
    #[serde(default)]
    pub size: usize,
    /// Total matches, when the server reports it.
    #[serde(rename = "totalSize", default)]
    pub total_size: Option<usize>,
}
