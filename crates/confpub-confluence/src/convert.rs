//! Body conversion to storage format.

use tracing::debug;

use crate::api::ContentClient;
use crate::error::PublishError;
use crate::reference::ContentBody;
use crate::types::Representation;

/// Converts bodies to storage format through the server's conversion
/// endpoint. Storage input is passed through without a call.
pub struct FormatConverter<'a> {
    client: &'a dyn ContentClient,
}

impl<'a> FormatConverter<'a> {
    pub fn new(client: &'a dyn ContentClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns [`PublishError::ConversionFailed`] if the server rejects the
    /// input or cannot be reached.
    pub fn to_storage(&self, body: ContentBody) -> Result<ContentBody, PublishError> {
        match body.representation {
            Representation::Storage => Ok(body),
            from @ Representation::Wiki => {
                debug!(bytes = body.text.len(), "Converting {} to storage", from);
                let text = self
                    .client
                    .convert_to_storage(&body.text, from)
                    .map_err(PublishError::ConversionFailed)?;
                Ok(ContentBody::storage(text))
            }
        }
    }
}
