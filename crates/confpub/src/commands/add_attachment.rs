//! `add-attachment` command implementation.

use std::path::PathBuf;

use clap::Args;
use confpub_config::CliSettings;
use confpub_confluence::PageActions;

use super::common::{ConnectionArgs, PageArgs, print_attachment_report};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the add-attachment command.
#[derive(Args)]
pub(crate) struct AddAttachmentArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Files to upload. An existing attachment with the same name gets a new version.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Comment stored with each attachment.
    #[arg(long)]
    comment: Option<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl AddAttachmentArgs {
    /// Execute the add-attachment command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let page = self.page.reference()?;
        let session = self.connection.connect(CliSettings::default())?;

        let actions = PageActions::new(&session.client).with_cancellation(session.cancel);

        output.info(&format!("Uploading {} file(s) to {page}...", self.files.len()));
        let report = actions.attach(&page, &self.files, self.comment.as_deref())?;
        print_attachment_report(&output, &report);

        if report.is_complete() {
            output.success("Done.");
            Ok(())
        } else {
            Err(CliError::Validation(format!(
                "{} of {} attachment(s) failed",
                report.failed.len(),
                self.files.len()
            )))
        }
    }
}
