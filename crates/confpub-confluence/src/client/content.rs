//! Content operations for Confluence API.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{ConfluenceClient, checked_body};
use crate::error::ConfluenceError;
use crate::reference::{ContentId, VersionToken};
use crate::types::{Content, ContentQuery, ContentResults, ContentUpdate, NewContent, Representation};

/// Response of the body conversion endpoint.
#[derive(Debug, Deserialize)]
struct ConvertedBody {
    value: String,
}

impl ConfluenceClient {
    /// Search content by type, space and title.
    pub fn search_content(&self, query: &ContentQuery) -> Result<ContentResults, ConfluenceError> {
        let url = format!("{}/content?{}", self.api_url(), query.to_query_string());
        debug!(url = %url, "Searching content");
        self.get_json(&url)
    }

    /// Get content by ID with optional field expansion.
    pub fn fetch_content(&self, id: &ContentId, expand: &[&str]) -> Result<Content, ConfluenceError> {
        let mut url = format!("{}/content/{}", self.api_url(), id);

        if !expand.is_empty() {
            url.push_str("?expand=");
            url.push_str(&expand.join(","));
        }

        debug!("Getting content {}", id);
        self.get_json(&url)
    }

    /// Create a page, blog post or comment.
    pub fn post_content(&self, content: &NewContent) -> Result<Content, ConfluenceError> {
        let url = format!("{}/content", self.api_url());
        let created: Content = self.post_json(&url, &content.to_payload())?;
        info!(
            "Created {} {} '{}'",
            created.content_type, created.id, created.title
        );
        Ok(created)
    }

    /// Update existing content (writes `version + 1`).
    pub fn put_content(
        &self,
        id: &ContentId,
        version: VersionToken,
        update: &ContentUpdate,
    ) -> Result<Content, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), id);

        info!(
            "Updating {} {} from version {} to {}",
            update.content_type,
            id,
            version.number(),
            version.next()
        );

        self.put_json(&url, &update.to_payload(version.next()))
    }

    /// Convert a body to storage format on the server.
    pub fn convert_body(&self, value: &str, from: Representation) -> Result<String, ConfluenceError> {
        let url = format!("{}/contentbody/convert/storage", self.api_url());
        let payload = json!({
            "value": value,
            "representation": from.as_str(),
        });
        let converted: ConvertedBody = self.post_json(&url, &payload)?;
        Ok(converted.value)
    }

    /// Delete content. Pages go to the space trash.
    pub fn remove_content(&self, id: &ContentId) -> Result<(), ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), id);
        let response = self.authorize(self.agent.delete(&url)).call()?;
        checked_body(response)?;
        info!("Deleted content {}", id);
        Ok(())
    }
}
