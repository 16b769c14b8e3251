//! CLI command implementations.

mod add_attachment;
mod add_blog_entry;
mod add_comment;
mod add_page;
mod common;
mod delete_page;
mod export_page;
mod update_page;

pub(crate) use add_attachment::AddAttachmentArgs;
pub(crate) use add_blog_entry::AddBlogEntryArgs;
pub(crate) use add_comment::AddCommentArgs;
pub(crate) use add_page::AddPageArgs;
pub(crate) use delete_page::DeletePageArgs;
pub(crate) use export_page::ExportPageArgs;
pub(crate) use update_page::UpdatePageArgs;
