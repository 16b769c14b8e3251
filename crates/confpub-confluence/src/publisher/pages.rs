//! Page maintenance that needs no rendering: attach, export, delete.

use std::path::{Path, PathBuf};

use tracing::info;

use super::attachments::{self, AttachmentReport};
use super::executor::lookup_error;
use super::export::{self, ExportedFile};
use crate::api::ContentClient;
use crate::cancel::CancellationToken;
use crate::error::{PublishError, Stage};
use crate::reference::{ContentIdentity, PageReference};
use crate::resolver::IdentityResolver;
use crate::types::ContentType;

/// Operations on an existing page.
pub struct PageActions<'a> {
    client: &'a dyn ContentClient,
    cancel: CancellationToken,
}

impl<'a> PageActions<'a> {
    #[must_use]
    pub fn new(client: &'a dyn ContentClient) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop once `cancel` trips. Checked before every blocking call.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Upload files to a page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be resolved or the run is
    /// cancelled. Per-file failures are reported, not returned.
    pub fn attach(
        &self,
        page: &PageReference,
        files: &[PathBuf],
        comment: Option<&str>,
    ) -> Result<AttachmentReport, PublishError> {
        let identity = self.resolve(page)?;
        attachments::upload_all(self.client, &identity.id, files, comment, &self.cancel)
    }

    /// Export a page to `destination` as PDF or Word, by extension.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported extensions (before any network call),
    /// unresolvable pages, failed downloads or unwritable destinations.
    pub fn export(
        &self,
        page: &PageReference,
        destination: &Path,
    ) -> Result<ExportedFile, PublishError> {
        export::format_for(destination)?;
        let identity = self.resolve(page)?;
        export::export_to_file(self.client, &identity.id, destination, &self.cancel)
    }

    /// Delete a page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be resolved or deleted.
    pub fn delete(&self, page: &PageReference) -> Result<ContentIdentity, PublishError> {
        let identity = self.resolve(page)?;
        self.cancel.check(Stage::Write)?;
        self.client
            .delete_content(&identity.id)
            .map_err(lookup_error(Stage::Write, ContentType::Page, &identity.id))?;
        info!(id = %identity.id, "Deleted page");
        Ok(identity)
    }

    fn resolve(&self, page: &PageReference) -> Result<ContentIdentity, PublishError> {
        self.cancel.check(Stage::Resolve)?;
        Ok(IdentityResolver::new(self.client)
            .resolve(page, ContentType::Page, &[])?
            .identity)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::mock::{MockContentClient, MockOp};
    use crate::reference::ContentId;
    use crate::types::ExportFormat;

    #[test]
    fn test_attach_by_id_needs_no_lookup() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "a").unwrap();
        let client = MockContentClient::new();

        let report = PageActions::new(&client)
            .attach(&PageReference::absolute("205"), &[file], Some("first"))
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(client.total_calls(), 1);
    }

    #[test]
    fn test_export_resolves_title() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("page.doc");
        let client = MockContentClient::new().with_page("205", "DEV", "Page", "");

        let exported = PageActions::new(&client)
            .export(&PageReference::relative("DEV", "Page"), &destination)
            .unwrap();

        assert_eq!(exported.format, ExportFormat::Doc);
        assert_eq!(client.count(MockOp::GetContent), 1);
        assert_eq!(client.count(MockOp::DownloadExport), 1);
    }

    #[test]
    fn test_export_bad_extension_skips_lookup() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new();

        let err = PageActions::new(&client)
            .export(
                &PageReference::relative("DEV", "Page"),
                &dir.path().join("page.html"),
            )
            .unwrap_err();

        assert!(matches!(err, PublishError::Config(_)));
        assert_eq!(client.total_calls(), 0);
    }

    #[test]
    fn test_delete_page() {
        let client = MockContentClient::new().with_page("205", "DEV", "Page", "");

        let deleted = PageActions::new(&client)
            .delete(&PageReference::relative("DEV", "Page"))
            .unwrap();

        assert_eq!(deleted.id, ContentId::new("205"));
        assert!(client.content("205").is_none());
    }

    #[test]
    fn test_delete_unknown_id() {
        let client = MockContentClient::new();

        let err = PageActions::new(&client)
            .delete(&PageReference::absolute("404"))
            .unwrap_err();

        assert!(matches!(err, PublishError::NotFound { .. }));
    }

    #[test]
    fn test_cancelled_delete_makes_no_call() {
        let client = MockContentClient::new().with_page("205", "DEV", "Page", "");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = PageActions::new(&client)
            .with_cancellation(cancel)
            .delete(&PageReference::absolute("205"))
            .unwrap_err();

        assert!(matches!(err, PublishError::Cancelled(Stage::Resolve)));
        assert!(client.content("205").is_some());
    }
}
