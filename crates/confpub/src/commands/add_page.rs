//! `add-page` command implementation.

use std::path::PathBuf;

use clap::Args;
use confpub_confluence::{Operation, PageDescriptor};

use super::common::PublishArgs;
use crate::error::CliError;

/// Arguments for the add-page command.
#[derive(Args)]
pub(crate) struct AddPageArgs {
    /// Space of the parent page.
    #[arg(short, long)]
    space: Option<String>,

    /// Title of the parent page (requires --space).
    #[arg(long, conflicts_with = "parent_id")]
    parent_title: Option<String>,

    /// Id of the parent page.
    #[arg(long)]
    parent_id: Option<String>,

    /// Title of the new page.
    #[arg(short, long)]
    title: String,

    /// Export the new page to this file (.pdf or .doc).
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    #[command(flatten)]
    pub publish: PublishArgs,
}

impl AddPageArgs {
    /// Execute the add-page command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let parent = PageDescriptor {
            id: self.parent_id,
            space: self.space,
            title: self.parent_title,
        }
        .to_reference()?;
        let operation = Operation::CreatePage {
            parent,
            title: self.title,
        };
        self.publish.run(operation, self.output_file)
    }
}
