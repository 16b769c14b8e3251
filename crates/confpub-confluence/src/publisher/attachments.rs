//! Attachment uploads.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::api::ContentClient;
use crate::cancel::CancellationToken;
use crate::error::{ConfluenceError, PublishError, Stage};
use crate::reference::ContentId;
use crate::types::AttachmentFile;

/// An uploaded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub id: ContentId,
    pub filename: String,
    /// Local file it was uploaded from.
    pub file: PathBuf,
}

/// Why a single file was not uploaded.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to read file")]
    Read(#[source] std::io::Error),

    #[error("upload failed")]
    Transport(#[source] ConfluenceError),
}

#[derive(Debug)]
pub struct FailedUpload {
    pub file: PathBuf,
    pub error: UploadError,
}

/// Per-file outcome of an attachment run.
#[derive(Debug, Default)]
pub struct AttachmentReport {
    pub uploaded: Vec<AttachmentRef>,
    pub failed: Vec<FailedUpload>,
}

impl AttachmentReport {
    /// Whether every file was uploaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub(crate) fn extend(&mut self, other: Self) {
        self.uploaded.extend(other.uploaded);
        self.failed.extend(other.failed);
    }
}

/// Upload `files` to `parent` one by one.
///
/// A file that cannot be read or uploaded is recorded in the report and the
/// remaining files are still attempted. Only cancellation stops the loop.
pub(crate) fn upload_all(
    client: &dyn ContentClient,
    parent: &ContentId,
    files: &[PathBuf],
    comment: Option<&str>,
    cancel: &CancellationToken,
) -> Result<AttachmentReport, PublishError> {
    let mut report = AttachmentReport::default();

    for path in files {
        cancel.check(Stage::Attachments)?;
        match upload_one(client, parent, path, comment) {
            Ok(uploaded) => report.uploaded.push(uploaded),
            Err(error) => {
                warn!(file = %path.display(), error = %error, "Attachment not uploaded");
                report.failed.push(FailedUpload {
                    file: path.clone(),
                    error,
                });
            }
        }
    }

    info!(
        uploaded = report.uploaded.len(),
        failed = report.failed.len(),
        "Attachments processed for {}",
        parent
    );
    Ok(report)
}

fn upload_one(
    client: &dyn ContentClient,
    parent: &ContentId,
    path: &Path,
    comment: Option<&str>,
) -> Result<AttachmentRef, UploadError> {
    let file = AttachmentFile::read(path).map_err(UploadError::Read)?;
    let attachment = client
        .upload_attachment(parent, &file, comment)
        .map_err(UploadError::Transport)?;
    Ok(AttachmentRef {
        id: ContentId::new(attachment.id),
        filename: attachment.title,
        file: path.to_path_buf(),
    })
}
