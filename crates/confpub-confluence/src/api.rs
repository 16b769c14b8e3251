//! Content service seam.
//!
//! Everything above this trait talks to Confluence only through it, so the
//! pipeline runs the same against the HTTP client and the in-memory mock.

use std::io::Write;

use crate::error::ConfluenceError;
use crate::reference::{ContentId, VersionToken};
use crate::types::{
    Attachment, AttachmentFile, Content, ContentQuery, ContentResults, ContentUpdate,
    ExportFormat, NewContent, Representation,
};

/// Operations against a Confluence content service.
pub trait ContentClient {
    /// Server base URL, without a trailing slash.
    fn base_url(&self) -> &str;

    /// Search content by type, space and title.
    fn get_content(&self, query: &ContentQuery) -> Result<ContentResults, ConfluenceError>;

    /// Fetch one item with the given fields expanded.
    fn get_content_by_id(&self, id: &ContentId, expand: &[&str]) -> Result<Content, ConfluenceError>;

    fn create_content(&self, content: &NewContent) -> Result<Content, ConfluenceError>;

    /// Replace an item's body, writing version `version.next()`.
    fn update_content(
        &self,
        id: &ContentId,
        version: VersionToken,
        update: &ContentUpdate,
    ) -> Result<Content, ConfluenceError>;

    /// Convert `value` from `from` to storage format.
    fn convert_to_storage(&self, value: &str, from: Representation) -> Result<String, ConfluenceError>;

    /// Upload a file, replacing an attachment with the same filename.
    fn upload_attachment(
        &self,
        parent: &ContentId,
        file: &AttachmentFile,
        comment: Option<&str>,
    ) -> Result<Attachment, ConfluenceError>;

    /// Stream a rendered export into `sink`. Returns the number of bytes written.
    fn download_export(
        &self,
        id: &ContentId,
        format: ExportFormat,
        sink: &mut dyn Write,
    ) -> Result<u64, ConfluenceError>;

    fn delete_content(&self, id: &ContentId) -> Result<(), ConfluenceError>;
}
