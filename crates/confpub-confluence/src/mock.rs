//! Mock content client for testing.
//!
//! Provides [`MockContentClient`], an in-memory content service that records
//! every call so tests can assert on network traffic.

use std::collections::HashMap;
use std::io::Write;
use std::sync::RwLock;

use crate::api::ContentClient;
use crate::cancel::CancellationToken;
use crate::error::ConfluenceError;
use crate::reference::{ContentId, VersionToken};
use crate::types::{
    Attachment, AttachmentFile, Body, Content, ContentQuery, ContentResults, ContentType,
    ContentUpdate, ExportFormat, Links, NewContent, Representation, SpaceRef, Storage, Version,
};

/// Base URL reported by the mock.
pub const MOCK_BASE_URL: &str = "https://wiki.example.com";

/// Client operation, used to count calls and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOp {
    GetContent,
    GetContentById,
    CreateContent,
    UpdateContent,
    Convert,
    UploadAttachment,
    DownloadExport,
    DeleteContent,
}

/// A recorded client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    GetContent(ContentQuery),
    GetContentById {
        id: ContentId,
        expand: Vec<String>,
    },
    CreateContent(NewContent),
    UpdateContent {
        id: ContentId,
        version: VersionToken,
        update: ContentUpdate,
    },
    Convert {
        value: String,
        from: Representation,
    },
    UploadAttachment {
        parent: ContentId,
        filename: String,
        comment: Option<String>,
    },
    DownloadExport {
        id: ContentId,
        format: ExportFormat,
    },
    DeleteContent(ContentId),
}

impl MockCall {
    #[must_use]
    pub fn op(&self) -> MockOp {
        match self {
            Self::GetContent(_) => MockOp::GetContent,
            Self::GetContentById { .. } => MockOp::GetContentById,
            Self::CreateContent(_) => MockOp::CreateContent,
            Self::UpdateContent { .. } => MockOp::UpdateContent,
            Self::Convert { .. } => MockOp::Convert,
            Self::UploadAttachment { .. } => MockOp::UploadAttachment,
            Self::DownloadExport { .. } => MockOp::DownloadExport,
            Self::DeleteContent(_) => MockOp::DeleteContent,
        }
    }
}

#[derive(Debug)]
struct Failure {
    op: MockOp,
    /// Only fail uploads of this filename.
    filename: Option<String>,
    status: u16,
}

/// Mock content service for testing.
///
/// Holds content in memory. Use the builder methods to seed it.
///
/// # Example
///
/// ```ignore
/// use confpub_confluence::{ContentClient, MockContentClient, MockOp};
///
/// let client = MockContentClient::new()
///     .with_page("100", "DEV", "Home", "<p>Welcome</p>")
///     .with_next_id(205);
///
/// // ... run a publish ...
/// assert_eq!(client.count(MockOp::CreateContent), 1);
/// ```
#[derive(Debug)]
pub struct MockContentClient {
    contents: RwLock<Vec<Content>>,
    attachments: RwLock<Vec<(ContentId, String)>>,
    conversions: RwLock<HashMap<String, String>>,
    failures: RwLock<Vec<Failure>>,
    calls: RwLock<Vec<MockCall>>,
    next_id: RwLock<u64>,
    cancel_after: RwLock<Option<(MockOp, CancellationToken)>>,
}

impl Default for MockContentClient {
    fn default() -> Self {
        Self {
            contents: RwLock::new(Vec::new()),
            attachments: RwLock::new(Vec::new()),
            conversions: RwLock::new(HashMap::new()),
            failures: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
            next_id: RwLock::new(1000),
            cancel_after: RwLock::new(None),
        }
    }
}

impl MockContentClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page at version 1.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, id: &str, space: &str, title: &str, storage: &str) -> Self {
        self.contents
            .write()
            .unwrap()
            .push(stored(id, ContentType::Page, space, title, storage, 1));
        self
    }

    /// Add a page at a given version.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page_version(
        self,
        id: &str,
        space: &str,
        title: &str,
        storage: &str,
        version: u32,
    ) -> Self {
        self.contents
            .write()
            .unwrap()
            .push(stored(id, ContentType::Page, space, title, storage, version));
        self
    }

    /// Id assigned to the next created item; later items count up from it.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_next_id(self, id: u64) -> Self {
        *self.next_id.write().unwrap() = id;
        self
    }

    /// Fixed conversion result for an input. Unregistered inputs are wrapped
    /// in `<p>`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_conversion(self, input: &str, storage: &str) -> Self {
        self.conversions
            .write()
            .unwrap()
            .insert(input.to_owned(), storage.to_owned());
        self
    }

    /// Make every call of `op` fail with HTTP `status`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, op: MockOp, status: u16) -> Self {
        self.failures.write().unwrap().push(Failure {
            op,
            filename: None,
            status,
        });
        self
    }

    /// Make uploads of `filename` fail with HTTP `status`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_upload_failure(self, filename: &str, status: u16) -> Self {
        self.failures.write().unwrap().push(Failure {
            op: MockOp::UploadAttachment,
            filename: Some(filename.to_owned()),
            status,
        });
        self
    }

    /// Cancel `token` once a call of `op` has completed.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_cancel_after(self, op: MockOp, token: CancellationToken) -> Self {
        *self.cancel_after.write().unwrap() = Some((op, token));
        self
    }

    /// All calls made so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls of `op`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn count(&self, op: MockOp) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|call| call.op() == op)
            .count()
    }

    /// Total number of calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Current server-side state of an item.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn content(&self, id: &str) -> Option<Content> {
        self.contents
            .read()
            .unwrap()
            .iter()
            .find(|content| content.id == id)
            .cloned()
    }

    /// Filenames attached to `parent`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn attachment_names(&self, parent: &str) -> Vec<String> {
        self.attachments
            .read()
            .unwrap()
            .iter()
            .filter(|(owner, _)| owner.as_str() == parent)
            .map(|(_, name)| name.clone())
            .collect()
    }

    fn record(&self, call: MockCall) -> Result<(), ConfluenceError> {
        let failure = self
            .failures
            .read()
            .unwrap()
            .iter()
            .find(|failure| {
                failure.op == call.op()
                    && match (&failure.filename, &call) {
                        (Some(name), MockCall::UploadAttachment { filename, .. }) => {
                            name == filename
                        }
                        (Some(_), _) => false,
                        (None, _) => true,
                    }
            })
            .map(|failure| failure.status);
        if let Some((op, token)) = self.cancel_after.read().unwrap().as_ref()
            && *op == call.op()
        {
            token.cancel();
        }
        self.calls.write().unwrap().push(call);
        match failure {
            Some(status) => Err(http_error(status, "injected failure")),
            None => Ok(()),
        }
    }

    fn allocate_id(&self) -> String {
        let mut next = self.next_id.write().unwrap();
        let id = next.to_string();
        *next += 1;
        id
    }
}

impl ContentClient for MockContentClient {
    fn base_url(&self) -> &str {
        MOCK_BASE_URL
    }

    fn get_content(&self, query: &ContentQuery) -> Result<ContentResults, ConfluenceError> {
        self.record(MockCall::GetContent(query.clone()))?;
        let expand: Vec<&str> = query.expand.iter().map(String::as_str).collect();
        let results: Vec<Content> = self
            .contents
            .read()
            .unwrap()
            .iter()
            .filter(|content| {
                content.content_type == query.content_type
                    && query
                        .space_key
                        .as_ref()
                        .is_none_or(|key| content.space.as_ref().is_some_and(|s| &s.key == key))
                    && query.title.as_ref().is_none_or(|title| &content.title == title)
            })
            .skip(query.start)
            .take(query.limit)
            .map(|content| expanded(content, &expand))
            .collect();
        Ok(ContentResults {
            size: results.len(),
            start: query.start,
            limit: query.limit,
            total_size: None,
            results,
        })
    }

    fn get_content_by_id(&self, id: &ContentId, expand: &[&str]) -> Result<Content, ConfluenceError> {
        self.record(MockCall::GetContentById {
            id: id.clone(),
            expand: expand.iter().map(|field| (*field).to_owned()).collect(),
        })?;
        self.content(id.as_str())
            .map(|content| expanded(&content, expand))
            .ok_or_else(|| not_found(id))
    }

    fn create_content(&self, content: &NewContent) -> Result<Content, ConfluenceError> {
        self.record(MockCall::CreateContent(content.clone()))?;
        let id = self.allocate_id();
        let created = stored(
            &id,
            content.content_type,
            content.space_key.as_deref().unwrap_or_default(),
            content.title.as_deref().unwrap_or_default(),
            &content.storage,
            1,
        );
        self.contents.write().unwrap().push(created.clone());
        Ok(created)
    }

    fn update_content(
        &self,
        id: &ContentId,
        version: VersionToken,
        update: &ContentUpdate,
    ) -> Result<Content, ConfluenceError> {
        self.record(MockCall::UpdateContent {
            id: id.clone(),
            version,
            update: update.clone(),
        })?;
        let mut contents = self.contents.write().unwrap();
        let content = contents
            .iter_mut()
            .find(|content| content.id == id.as_str())
            .ok_or_else(|| not_found(id))?;
        let current = content.version.as_ref().map_or(0, |v| v.number);
        if current != version.number() {
            return Err(http_error(
                409,
                &format!("version {} is stale, current is {current}", version.number()),
            ));
        }
        content.title.clone_from(&update.title);
        content.version = Some(Version {
            number: version.next(),
            message: update.message.clone(),
        });
        content.body = Some(storage_body(&update.storage));
        Ok(content.clone())
    }

    fn convert_to_storage(&self, value: &str, from: Representation) -> Result<String, ConfluenceError> {
        self.record(MockCall::Convert {
            value: value.to_owned(),
            from,
        })?;
        Ok(self
            .conversions
            .read()
            .unwrap()
            .get(value)
            .cloned()
            .unwrap_or_else(|| format!("<p>{value}</p>")))
    }

    fn upload_attachment(
        &self,
        parent: &ContentId,
        file: &AttachmentFile,
        comment: Option<&str>,
    ) -> Result<Attachment, ConfluenceError> {
        self.record(MockCall::UploadAttachment {
            parent: parent.clone(),
            filename: file.filename.clone(),
            comment: comment.map(str::to_owned),
        })?;
        let mut attachments = self.attachments.write().unwrap();
        let exists = attachments
            .iter()
            .any(|(owner, name)| owner == parent && name == &file.filename);
        if !exists {
            attachments.push((parent.clone(), file.filename.clone()));
        }
        Ok(Attachment {
            id: format!("att-{}-{}", parent, file.filename),
            title: file.filename.clone(),
            content_type: "attachment".to_owned(),
            links: None,
        })
    }

    fn download_export(
        &self,
        id: &ContentId,
        format: ExportFormat,
        sink: &mut dyn Write,
    ) -> Result<u64, ConfluenceError> {
        self.record(MockCall::DownloadExport {
            id: id.clone(),
            format,
        })?;
        if self.content(id.as_str()).is_none() {
            return Err(not_found(id));
        }
        let data = format!("{format} export of {id}");
        sink.write_all(data.as_bytes())?;
        Ok(data.len() as u64)
    }

    fn delete_content(&self, id: &ContentId) -> Result<(), ConfluenceError> {
        self.record(MockCall::DeleteContent(id.clone()))?;
        let mut contents = self.contents.write().unwrap();
        let before = contents.len();
        contents.retain(|content| content.id != id.as_str());
        if contents.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn stored(
    id: &str,
    content_type: ContentType,
    space: &str,
    title: &str,
    storage: &str,
    version: u32,
) -> Content {
    Content {
        id: id.to_owned(),
        content_type,
        status: Some("current".to_owned()),
        title: title.to_owned(),
        space: (!space.is_empty()).then(|| SpaceRef {
            key: space.to_owned(),
            name: None,
        }),
        version: Some(Version {
            number: version,
            message: None,
        }),
        body: Some(storage_body(storage)),
        links: Some(Links {
            webui: Some(format!("/pages/viewpage.action?pageId={id}")),
            ..Links::default()
        }),
    }
}

fn storage_body(value: &str) -> Body {
    Body {
        storage: Some(Storage {
            value: value.to_owned(),
            representation: "storage".to_owned(),
        }),
    }
}

/// Copy of `content` with only the requested fields expanded.
fn expanded(content: &Content, expand: &[&str]) -> Content {
    let mut copy = content.clone();
    if !expand.contains(&"body.storage") {
        copy.body = None;
    }
    if !expand.contains(&"version") {
        copy.version = None;
    }
    if !expand.contains(&"space") {
        copy.space = None;
    }
    copy
}

fn http_error(status: u16, body: &str) -> ConfluenceError {
    ConfluenceError::HttpResponse {
        status,
        body: body.to_owned(),
    }
}

fn not_found(id: &ContentId) -> ConfluenceError {
    http_error(404, &format!("no content with id {id}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_search_filters_and_expands() {
        let client = MockContentClient::new()
            .with_page("100", "DEV", "Home", "<p>a</p>")
            .with_page("101", "OPS", "Home", "<p>b</p>");

        let query = ContentQuery::by_title(ContentType::Page, "DEV", "Home").expand(&["version"]);
        let results = client.get_content(&query).unwrap();

        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].id, "100");
        assert!(results.results[0].version.is_some());
        assert!(results.results[0].body.is_none());
        assert_eq!(client.count(MockOp::GetContent), 1);
    }

    #[test]
    fn test_stale_update_conflicts() {
        let client = MockContentClient::new().with_page_version("100", "DEV", "Home", "", 3);
        let update = ContentUpdate {
            content_type: ContentType::Page,
            title: "Home".to_owned(),
            storage: "<p>new</p>".to_owned(),
            message: None,
        };

        let err = client
            .update_content(&ContentId::new("100"), VersionToken::new(2), &update)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let updated = client
            .update_content(&ContentId::new("100"), VersionToken::new(3), &update)
            .unwrap();
        assert_eq!(updated.version.unwrap().number, 4);
    }

    #[test]
    fn test_injected_upload_failure_matches_filename() {
        let client = MockContentClient::new().with_upload_failure("b.png", 503);
        let parent = ContentId::new("1");
        let file = |name: &str| AttachmentFile {
            filename: name.to_owned(),
            media_type: "image/png",
            data: Vec::new(),
        };

        assert!(client.upload_attachment(&parent, &file("a.png"), None).is_ok());
        let err = client.upload_attachment(&parent, &file("b.png"), None).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(client.attachment_names("1"), vec!["a.png"]);
        assert_eq!(client.count(MockOp::UploadAttachment), 2);
    }

    #[test]
    fn test_created_ids_count_up() {
        let client = MockContentClient::new().with_next_id(205);
        let first = client
            .create_content(&NewContent::blog_post("DEV", "One", String::new()))
            .unwrap();
        let second = client
            .create_content(&NewContent::blog_post("DEV", "Two", String::new()))
            .unwrap();
        assert_eq!(first.id, "205");
        assert_eq!(second.id, "206");
    }
}
