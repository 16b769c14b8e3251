//! Content identity and page references.

use std::fmt;

use crate::error::PublishError;
use crate::types::{Content, ContentType, Representation};

/// Server-assigned content identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Version a write is based on. The server rejects writes whose base
/// version is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionToken(u32);

impl VersionToken {
    #[must_use]
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    #[must_use]
    pub fn number(self) -> u32 {
        self.0
    }

    /// Version number the next write will carry.
    #[must_use]
    pub fn next(self) -> u32 {
        self.0 + 1
    }
}

/// How a caller names a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageReference {
    /// Server id; resolves without a lookup.
    Absolute { id: ContentId },
    /// Space key and exact title; resolves with one search.
    Relative { space: String, title: String },
}

impl PageReference {
    pub fn absolute(id: impl Into<String>) -> Self {
        Self::Absolute {
            id: ContentId::new(id),
        }
    }

    pub fn relative(space: impl Into<String>, title: impl Into<String>) -> Self {
        Self::Relative {
            space: space.into(),
            title: title.into(),
        }
    }

    /// Reject references with empty parts.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Config`] naming the empty field.
    pub fn validate(&self) -> Result<(), PublishError> {
        match self {
            Self::Absolute { id } if id.as_str().trim().is_empty() => {
                Err(PublishError::Config("page id is empty".to_owned()))
            }
            Self::Relative { space, .. } if space.trim().is_empty() => {
                Err(PublishError::Config("space key is empty".to_owned()))
            }
            Self::Relative { title, .. } if title.trim().is_empty() => {
                Err(PublishError::Config("page title is empty".to_owned()))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for PageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute { id } => write!(f, "id {id}"),
            Self::Relative { space, title } => write!(f, "'{title}' in space {space}"),
        }
    }
}

/// Loosely specified page location as collected from flags or config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDescriptor {
    pub id: Option<String>,
    pub space: Option<String>,
    pub title: Option<String>,
}

impl PageDescriptor {
    /// Turn the descriptor into exactly one reference form.
    ///
    /// # Errors
    ///
    /// - [`PublishError::AmbiguousReference`] when an id is given together
    ///   with a space or title
    /// - [`PublishError::Config`] when neither form is complete
    pub fn to_reference(&self) -> Result<PageReference, PublishError> {
        let reference = match (&self.id, &self.space, &self.title) {
            (Some(id), None, None) => PageReference::absolute(id.as_str()),
            (Some(id), _, _) => {
                return Err(PublishError::AmbiguousReference(format!(
                    "page id {id} given together with space/title"
                )));
            }
            (None, Some(space), Some(title)) => PageReference::relative(space.as_str(), title.as_str()),
            (None, None, None) => {
                return Err(PublishError::Config(
                    "page reference requires an id or a space and title".to_owned(),
                ));
            }
            (None, _, _) => {
                return Err(PublishError::Config(
                    "page reference requires both space and title".to_owned(),
                ));
            }
        };
        reference.validate()?;
        Ok(reference)
    }
}

/// Resolved handle to a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentIdentity {
    pub id: ContentId,
    pub content_type: ContentType,
    pub space: Option<String>,
    pub title: Option<String>,
    /// Known only after a lookup that expanded `version`.
    pub version: Option<VersionToken>,
}

impl ContentIdentity {
    /// Identity for an id nobody has looked up yet.
    #[must_use]
    pub fn unresolved(id: ContentId, content_type: ContentType) -> Self {
        Self {
            id,
            content_type,
            space: None,
            title: None,
            version: None,
        }
    }

    #[must_use]
    pub fn from_content(content: &Content) -> Self {
        Self {
            id: ContentId::new(content.id.as_str()),
            content_type: content.content_type,
            space: content.space.as_ref().map(|space| space.key.clone()),
            title: Some(content.title.clone()),
            version: content
                .version
                .as_ref()
                .map(|version| VersionToken::new(version.number)),
        }
    }
}

/// Document text tagged with its markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBody {
    pub representation: Representation,
    pub text: String,
}

impl ContentBody {
    pub fn storage(text: impl Into<String>) -> Self {
        Self {
            representation: Representation::Storage,
            text: text.into(),
        }
    }

    pub fn wiki(text: impl Into<String>) -> Self {
        Self {
            representation: Representation::Wiki,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn is_storage(&self) -> bool {
        self.representation == Representation::Storage
    }
}
