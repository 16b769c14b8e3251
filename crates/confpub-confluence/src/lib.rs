//! Confluence content synchronization for confpub.
//!
//! This crate publishes local documents to Confluence:
//! - [`ConfluenceClient`]: REST API client with optional basic authentication
//! - [`Publisher`]: create, update, comment and blog workflows with attachment
//!   upload and export
//! - [`ContentClient`]: the seam between the two, implemented by the client and
//!   by `MockContentClient` (feature `mock`)
//!
//! # API Client
//!
//! ```ignore
//! use confpub_confluence::{ConfluenceClient, ContentClient, ContentId};
//!
//! let client = ConfluenceClient::new("https://confluence.example.com", None);
//! let page = client.get_content_by_id(&ContentId::new("123"), &["body.storage"])?;
//! println!("Page title: {}", page.title);
//! ```

// Content service seam
mod api;
pub use api::ContentClient;

// API client
mod client;
pub use client::ConfluenceClient;

#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MOCK_BASE_URL, MockCall, MockContentClient, MockOp};

// Types
mod types;
pub use types::{
    Attachment, AttachmentFile, AttachmentsResponse, Body, Content, ContentQuery, ContentResults,
    ContentStatus, ContentType, ContentUpdate, ExportFormat, Links, NewContent, Representation,
    SpaceRef, Storage, Version,
};

mod reference;
pub use reference::{
    ContentBody, ContentId, ContentIdentity, PageDescriptor, PageReference, VersionToken,
};

// Pipeline components
mod cancel;
mod convert;
pub mod macros;
mod merge;
mod resolver;
mod template;
pub use cancel::CancellationToken;
pub use convert::FormatConverter;
pub use merge::{MergePolicy, merge};
pub use resolver::{IdentityResolver, Resolved};
pub use template::{JinjaRenderer, TemplateError, TemplateRenderer};

// Publish workflow
pub mod publisher;
pub use publisher::{
    AttachmentReport, DryRunResult, ExportedFile, Operation, PageActions, PublishOutcome,
    PublishRequest, PublishResult, Publisher,
};

// Errors
pub mod error;
pub use error::{ConfluenceError, ErrorKind, PublishError, Stage};
