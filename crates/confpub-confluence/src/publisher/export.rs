//! Page export to a local file.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::api::ContentClient;
use crate::cancel::CancellationToken;
use crate::error::{PublishError, Stage};
use crate::reference::ContentId;
use crate::types::ExportFormat;

/// A written export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub bytes: u64,
}

/// Export format for `destination`, from its extension.
pub(crate) fn format_for(destination: &Path) -> Result<ExportFormat, PublishError> {
    ExportFormat::from_path(destination).ok_or_else(|| {
        PublishError::Config(format!(
            "unsupported export format for {}, use .pdf or .doc",
            destination.display()
        ))
    })
}

/// Download an export of `id` into `destination`.
///
/// The download goes to a temporary file next to `destination`, which is only
/// replaced once the download has completed.
pub(crate) fn export_to_file(
    client: &dyn ContentClient,
    id: &ContentId,
    destination: &Path,
    cancel: &CancellationToken,
) -> Result<ExportedFile, PublishError> {
    let format = format_for(destination)?;
    cancel.check(Stage::Export)?;

    let io_error = |source: std::io::Error| PublishError::Io {
        stage: Stage::Export,
        path: destination.to_path_buf(),
        source,
    };

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_error)?;
    let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;

    let bytes = {
        let mut sink = BufWriter::new(temp.as_file_mut());
        let bytes = client
            .download_export(id, format, &mut sink)
            .map_err(PublishError::transport(Stage::Export))?;
        sink.flush().map_err(io_error)?;
        bytes
    };
    temp.persist(destination).map_err(|err| io_error(err.error))?;

    info!(bytes, "Exported {} to {}", id, destination.display());
    Ok(ExportedFile {
        path: destination.to_path_buf(),
        format,
        bytes,
    })
}
