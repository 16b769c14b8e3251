//! Page reference resolution.

use tracing::{debug, warn};

use crate::api::ContentClient;
use crate::error::{PublishError, Stage};
use crate::reference::{ContentBody, ContentIdentity, PageReference};
use crate::types::{ContentQuery, ContentStatus, ContentType};

/// Search page size. Only the first match is used; the rest are counted for
/// the duplicate warning.
const SEARCH_LIMIT: usize = 10;

/// A resolved reference, plus the body if the lookup expanded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub identity: ContentIdentity,
    pub body: Option<ContentBody>,
}

/// Turns [`PageReference`]s into [`ContentIdentity`]s.
pub struct IdentityResolver<'a> {
    client: &'a dyn ContentClient,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(client: &'a dyn ContentClient) -> Self {
        Self { client }
    }

    /// Resolve `reference` to an item of `content_type`.
    ///
    /// Absolute references resolve without a network call and carry no
    /// version; existence is checked by whichever operation uses the id next.
    /// Relative references cost one search with `expand` applied. When
    /// several items share the title, the first result wins.
    ///
    /// # Errors
    ///
    /// - [`PublishError::NotFound`] when a relative search matches nothing
    /// - [`PublishError::Transport`] when the search fails
    pub fn resolve(
        &self,
        reference: &PageReference,
        content_type: ContentType,
        expand: &[&str],
    ) -> Result<Resolved, PublishError> {
        reference.validate()?;
        match reference {
            PageReference::Absolute { id } => Ok(Resolved {
                identity: ContentIdentity::unresolved(id.clone(), content_type),
                body: None,
            }),
            PageReference::Relative { space, title } => {
                let query = ContentQuery::by_title(content_type, space, title)
                    .status(ContentStatus::Current)
                    .expand(expand)
                    .page(0, SEARCH_LIMIT);
                let results = self
                    .client
                    .get_content(&query)
                    .map_err(PublishError::transport(Stage::Resolve))?;

                let total = results.total_size.unwrap_or(results.results.len());
                if total > 1 {
                    warn!(
                        space = %space,
                        title = %title,
                        matches = total,
                        "Title matches several items, using the first"
                    );
                }

                let Some(content) = results.results.into_iter().next() else {
                    return Err(PublishError::NotFound {
                        content_type,
                        reference: reference.clone(),
                    });
                };

                let mut identity = ContentIdentity::from_content(&content);
                identity.space.get_or_insert_with(|| space.clone());
                debug!(id = %identity.id, "Resolved {}", reference);

                Ok(Resolved {
                    body: content.storage_value().map(ContentBody::storage),
                    identity,
                })
            }
        }
    }
}
