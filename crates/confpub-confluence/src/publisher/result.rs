//! Result types for publish runs.

use std::path::PathBuf;

use super::attachments::AttachmentReport;
use super::export::ExportedFile;
use crate::reference::{ContentIdentity, VersionToken};

/// Result of a successful publish run.
#[derive(Debug)]
pub struct PublishResult {
    /// The written item, at its new version.
    pub identity: ContentIdentity,
    /// Whether the run created the item (as opposed to updating it).
    pub created: bool,
    /// URL to view the item, from the `webui` link the service returns.
    pub url: Option<String>,
    pub attachments: AttachmentReport,
    pub exported: Option<ExportedFile>,
}

/// Outcome of [`Publisher::publish`](super::Publisher::publish).
#[derive(Debug)]
pub enum PublishOutcome {
    Published(PublishResult),
    /// Update skipped because its input file does not exist.
    Skipped { input: PathBuf },
}

/// Result of a dry-run operation (no changes made).
#[derive(Debug)]
pub struct DryRunResult {
    /// Item that would be updated, or the parent/container of a new one.
    /// `None` for blog posts.
    pub target: Option<ContentIdentity>,
    /// Whether the run would create a new item.
    pub creates: bool,
    /// Final storage-format body that would be written.
    pub body: String,
    /// Version the update would be based on.
    pub current_version: Option<VersionToken>,
    /// Files that would be uploaded.
    pub attachments: Vec<PathBuf>,
    /// Export destination, if any.
    pub export: Option<PathBuf>,
}
