//! Merge policies for updating existing content.

use crate::error::PublishError;
use crate::reference::ContentBody;

/// How incoming content combines with what is already on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Incoming content becomes the whole body.
    #[default]
    Replace,
    /// Existing body first, then incoming.
    Append,
    /// Incoming first, then the existing body.
    Prepend,
}

impl MergePolicy {
    /// Whether the existing body has to be fetched before merging.
    #[must_use]
    pub fn requires_existing(self) -> bool {
        !matches!(self, Self::Replace)
    }

    /// Policy from mutually exclusive append/prepend switches.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Config`] if both are set.
    pub fn from_flags(append: bool, prepend: bool) -> Result<Self, PublishError> {
        match (append, prepend) {
            (true, true) => Err(PublishError::Config(
                "append and prepend are mutually exclusive".to_owned(),
            )),
            (true, false) => Ok(Self::Append),
            (false, true) => Ok(Self::Prepend),
            (false, false) => Ok(Self::Replace),
        }
    }
}

/// Combine `existing` and `incoming` under `policy`.
///
/// Both bodies must already be in storage format. A missing existing body
/// merges like an empty one, so every policy then yields `incoming`.
///
/// # Errors
///
/// Returns [`PublishError::UnconvertedBody`] for non-storage input.
pub fn merge(
    policy: MergePolicy,
    existing: Option<&ContentBody>,
    incoming: ContentBody,
) -> Result<ContentBody, PublishError> {
    if !incoming.is_storage() {
        return Err(PublishError::UnconvertedBody(incoming.representation));
    }
    if let Some(existing) = existing
        && !existing.is_storage()
    {
        return Err(PublishError::UnconvertedBody(existing.representation));
    }

    let existing = existing.map_or("", |body| body.text.as_str());
    let text = match policy {
        MergePolicy::Replace => return Ok(incoming),
        MergePolicy::Append => format!("{existing}{}", incoming.text),
        MergePolicy::Prepend => format!("{}{existing}", incoming.text),
    };
    Ok(ContentBody::storage(text))
}
