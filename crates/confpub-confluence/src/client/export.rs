//! Page export downloads.

use std::io::Write;

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::reference::ContentId;
use crate::types::ExportFormat;

impl ConfluenceClient {
    /// Stream a PDF or Word export of a page into `sink`.
    pub fn stream_export(
        &self,
        id: &ContentId,
        format: ExportFormat,
        sink: &mut dyn Write,
    ) -> Result<u64, ConfluenceError> {
        let url = format!("{}{}?pageId={}", self.base_url, format.action_path(), id);
        info!("Exporting content {} as {}", id, format);

        let body = self.get(&url, "*/*")?;
        let mut reader = body.into_reader();
        let written = std::io::copy(&mut reader, sink)?;
        Ok(written)
    }
}
