//! `update-page` command implementation.

use std::path::PathBuf;

use clap::Args;
use confpub_confluence::{MergePolicy, Operation};

use super::common::{PageArgs, PublishArgs};
use crate::error::CliError;

/// Arguments for the update-page command.
#[derive(Args)]
pub(crate) struct UpdatePageArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Add the rendered input after the current body.
    #[arg(long, conflicts_with = "prepend")]
    append: bool,

    /// Add the rendered input before the current body.
    #[arg(long)]
    prepend: bool,

    /// Version comment.
    #[arg(short, long)]
    message: Option<String>,

    /// Export the page to this file (.pdf or .doc) after the update.
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    #[command(flatten)]
    pub publish: PublishArgs,
}

impl UpdatePageArgs {
    /// Execute the update-page command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let operation = Operation::UpdatePage {
            target: self.page.reference()?,
            policy: MergePolicy::from_flags(self.append, self.prepend)?,
            message: self.message,
        };
        self.publish.run(operation, self.output_file)
    }
}
