//! Confluence API types.

mod attachment;
mod content;
mod export;
mod request;

pub use attachment::{Attachment, AttachmentsResponse};
pub use content::{
    Body, Content, ContentResults, ContentType, Links, Representation, SpaceRef, Storage, Version,
};
pub use export::ExportFormat;
pub use request::{AttachmentFile, ContentQuery, ContentStatus, ContentUpdate, NewContent};
