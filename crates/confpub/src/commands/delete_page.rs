//! `delete-page` command implementation.

use clap::Args;
use confpub_config::CliSettings;
use confpub_confluence::PageActions;

use super::common::{ConnectionArgs, PageArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the delete-page command.
#[derive(Args)]
pub(crate) struct DeletePageArgs {
    #[command(flatten)]
    page: PageArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl DeletePageArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let page = self.page.reference()?;
        let session = self.connection.connect(CliSettings::default())?;

        let actions = PageActions::new(&session.client).with_cancellation(session.cancel);

        let deleted = actions.delete(&page)?;
        output.success(&format!("Deleted page {}", deleted.id));
        Ok(())
    }
}
