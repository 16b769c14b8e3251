//! Publish orchestration.
//!
//! [`Publisher`] runs a [`PublishRequest`] through the pipeline:
//!
//! 1. Validate the request (no network)
//! 2. Render the input template
//! 3. Resolve page references
//! 4. Convert the body to storage format
//! 5. Fetch and merge the existing body (updates only)
//! 6. Write
//! 7. Run dependents: attachment uploads, export
//!
//! [`PageActions`] covers the page operations that render nothing: attach,
//! export and delete.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use confpub_confluence::{
//!     ConfluenceClient, JinjaRenderer, MergePolicy, Operation, PageReference, PublishRequest,
//!     Publisher,
//! };
//!
//! let client = ConfluenceClient::new("https://confluence.example.com", None);
//! let renderer = JinjaRenderer::new();
//! let request = PublishRequest::new(
//!     Operation::UpdatePage {
//!         target: PageReference::relative("DEV", "Release Notes"),
//!         policy: MergePolicy::Append,
//!         message: Some("release 2.0".to_owned()),
//!     },
//!     "notes.xhtml",
//! )
//! .export_to("notes.pdf");
//!
//! let outcome = Publisher::new(&client, &renderer).publish(&request)?;
//! # Ok(())
//! # }
//! ```

mod attachments;
mod executor;
mod export;
mod operation;
mod pages;
mod result;

pub use attachments::{AttachmentRef, AttachmentReport, FailedUpload, UploadError};
pub use executor::Publisher;
pub use export::ExportedFile;
pub use operation::{Dependent, Operation, PublishRequest};
pub use pages::PageActions;
pub use result::{DryRunResult, PublishOutcome, PublishResult};
