//! `add-blog-entry` command implementation.

use clap::Args;
use confpub_confluence::Operation;

use super::common::PublishArgs;
use crate::error::CliError;

/// Arguments for the add-blog-entry command.
#[derive(Args)]
pub(crate) struct AddBlogEntryArgs {
    /// Space to post in.
    #[arg(short, long)]
    space: String,

    /// Title of the post.
    #[arg(short, long)]
    title: String,

    #[command(flatten)]
    pub publish: PublishArgs,
}

impl AddBlogEntryArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let operation = Operation::AddBlogEntry {
            space: self.space,
            title: self.title,
        };
        self.publish.run(operation, None)
    }
}
