//! Publish requests.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::PublishError;
use crate::merge::MergePolicy;
use crate::reference::PageReference;
use crate::types::{ContentType, Representation};

/// What a publish run writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// New child page under `parent`.
    CreatePage { parent: PageReference, title: String },
    /// Existing page, combined with its current body under `policy`.
    UpdatePage {
        target: PageReference,
        policy: MergePolicy,
        /// Version comment.
        message: Option<String>,
    },
    /// New comment on `page`.
    AddComment { page: PageReference },
    /// New blog post.
    AddBlogEntry { space: String, title: String },
}

impl Operation {
    /// Type of the item the operation writes.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::CreatePage { .. } | Self::UpdatePage { .. } => ContentType::Page,
            Self::AddComment { .. } => ContentType::Comment,
            Self::AddBlogEntry { .. } => ContentType::BlogPost,
        }
    }

    #[must_use]
    pub fn is_update(&self) -> bool {
        matches!(self, Self::UpdatePage { .. })
    }

    fn validate(&self) -> Result<(), PublishError> {
        match self {
            Self::CreatePage { parent, title } => {
                parent.validate()?;
                require_non_empty(title, "page title")
            }
            Self::UpdatePage { target, .. } => target.validate(),
            Self::AddComment { page } => page.validate(),
            Self::AddBlogEntry { space, title } => {
                require_non_empty(space, "space key")?;
                require_non_empty(title, "blog title")
            }
        }
    }
}

fn require_non_empty(value: &str, what: &str) -> Result<(), PublishError> {
    if value.trim().is_empty() {
        return Err(PublishError::Config(format!("{what} is empty")));
    }
    Ok(())
}

/// Work run after the main write, in order, against the written item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependent {
    /// Upload files; a failed file does not stop the others.
    Attachments {
        files: Vec<PathBuf>,
        comment: Option<String>,
    },
    /// Download a rendered export; the format follows the file extension.
    Export { destination: PathBuf },
}

/// A complete publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub operation: Operation,
    /// Input file, rendered as a template.
    pub input: PathBuf,
    pub parameters: BTreeMap<String, String>,
    /// Markup of the rendered input.
    pub representation: Representation,
    pub dependents: Vec<Dependent>,
    /// For updates: a missing input file skips the run instead of failing.
    pub skip_missing_input: bool,
}

impl PublishRequest {
    /// Request with storage-format input, no parameters and no dependents.
    pub fn new(operation: Operation, input: impl Into<PathBuf>) -> Self {
        Self {
            operation,
            input: input.into(),
            parameters: BTreeMap::new(),
            representation: Representation::Storage,
            dependents: Vec::new(),
            skip_missing_input: true,
        }
    }

    #[must_use]
    pub fn parameters(mut self, parameters: BTreeMap<String, String>) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    /// Upload `files` after the write. Empty lists are ignored.
    #[must_use]
    pub fn attach(mut self, files: Vec<PathBuf>, comment: Option<String>) -> Self {
        if !files.is_empty() {
            self.dependents.push(Dependent::Attachments { files, comment });
        }
        self
    }

    /// Export the written item to `destination` after the write.
    #[must_use]
    pub fn export_to(mut self, destination: impl Into<PathBuf>) -> Self {
        self.dependents.push(Dependent::Export {
            destination: destination.into(),
        });
        self
    }

    #[must_use]
    pub fn skip_missing_input(mut self, skip: bool) -> Self {
        self.skip_missing_input = skip;
        self
    }

    /// Check everything that can be checked without the network.
    pub(crate) fn validate(&self) -> Result<(), PublishError> {
        self.operation.validate()?;
        for dependent in &self.dependents {
            if let Dependent::Export { destination } = dependent {
                super::export::format_for(destination)?;
            }
        }
        Ok(())
    }
}
