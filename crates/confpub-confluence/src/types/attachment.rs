//! Confluence attachment types.

use serde::{Deserialize, Serialize};

use super::Links;

/// Confluence attachment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment filename.
    pub title: String,
    /// Content type (always "attachment").
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

/// Attachments API response.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsResponse {
    pub results: Vec<Attachment>,
    #[serde(default)]
    pub size: usize,
}
