//! `add-comment` command implementation.

use clap::Args;
use confpub_confluence::Operation;

use super::common::{PageArgs, PublishArgs};
use crate::error::CliError;

/// Arguments for the add-comment command.
#[derive(Args)]
pub(crate) struct AddCommentArgs {
    #[command(flatten)]
    page: PageArgs,

    #[command(flatten)]
    pub publish: PublishArgs,
}

impl AddCommentArgs {
    /// Execute the add-comment command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let operation = Operation::AddComment {
            page: self.page.reference()?,
        };
        self.publish.run(operation, None)
    }
}
