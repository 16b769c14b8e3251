//! confpub CLI - publish documents to Confluence.
//!
//! Provides commands for:
//! - `add-page`: Create a child page from a template
//! - `update-page`: Replace, append to or prepend to a page
//! - `add-comment`: Comment on a page
//! - `add-blog-entry`: Post to a space blog
//! - `add-attachment`: Upload files to a page
//! - `export-page`: Download a page as PDF or Word
//! - `delete-page`: Delete a page

mod commands;
mod error;
mod output;

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    AddAttachmentArgs, AddBlogEntryArgs, AddCommentArgs, AddPageArgs, DeletePageArgs,
    ExportPageArgs, UpdatePageArgs,
};
use output::Output;

/// confpub - publish documents to Confluence.
#[derive(Parser)]
#[command(name = "confpub", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a page under a parent page.
    AddPage(AddPageArgs),
    /// Update an existing page.
    UpdatePage(UpdatePageArgs),
    /// Add a comment to a page.
    AddComment(AddCommentArgs),
    /// Add a blog post to a space.
    AddBlogEntry(AddBlogEntryArgs),
    /// Upload attachments to a page.
    AddAttachment(AddAttachmentArgs),
    /// Export a page as PDF or Word.
    ExportPage(ExportPageArgs),
    /// Delete a page.
    DeletePage(DeletePageArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        let connection = match self {
            Self::AddPage(args) => &args.publish.connection,
            Self::UpdatePage(args) => &args.publish.connection,
            Self::AddComment(args) => &args.publish.connection,
            Self::AddBlogEntry(args) => &args.publish.connection,
            Self::AddAttachment(args) => &args.connection,
            Self::ExportPage(args) => &args.connection,
            Self::DeletePage(args) => &args.connection,
        };
        connection.verbose
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::AddPage(args) => args.execute(),
        Commands::UpdatePage(args) => args.execute(),
        Commands::AddComment(args) => args.execute(),
        Commands::AddBlogEntry(args) => args.execute(),
        Commands::AddAttachment(args) => args.execute(),
        Commands::ExportPage(args) => args.execute(),
        Commands::DeletePage(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {}", error_chain(&err)));
        std::process::exit(1);
    }
}

/// Walk the error source chain and join all messages.
fn error_chain(err: &dyn Error) -> String {
    let mut msgs = vec![err.to_string()];
    let mut source = err.source();
    while let Some(s) = source {
        msgs.push(s.to_string());
        source = s.source();
    }
    msgs.join(": ")
}
