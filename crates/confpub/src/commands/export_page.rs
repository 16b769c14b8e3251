//! `export-page` command implementation.

use std::path::PathBuf;

use clap::Args;
use confpub_config::CliSettings;
use confpub_confluence::PageActions;

use super::common::{ConnectionArgs, PageArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export-page command.
#[derive(Args)]
pub(crate) struct ExportPageArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Destination file. The extension picks the format: .pdf or .doc.
    output_file: PathBuf,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl ExportPageArgs {
    /// Execute the export-page command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let page = self.page.reference()?;
        let session = self.connection.connect(CliSettings::default())?;

        let actions = PageActions::new(&session.client).with_cancellation(session.cancel);

        let exported = actions.export(&page, &self.output_file)?;
        output.success(&format!(
            "Exported {page} as {} ({} bytes) to {}",
            exported.format,
            exported.bytes,
            exported.path.display()
        ));
        Ok(())
    }
}
