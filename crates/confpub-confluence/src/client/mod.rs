//! Confluence REST API client.
//!
//! Sync HTTP client for Confluence Server/Data Center with optional basic
//! authentication. Idempotent GETs are retried on transient failures; writes
//! are sent once.

mod attachments;
mod content;
mod export;

use std::io::Write;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use confpub_config::{ConfluenceConfig, Credentials};
use tracing::warn;
use ureq::{Agent, Body, RequestBuilder};

use crate::api::ContentClient;
use crate::error::ConfluenceError;
use crate::reference::{ContentId, VersionToken};
use crate::types::{
    Attachment, AttachmentFile, Content, ContentQuery, ContentResults, ContentUpdate,
    ExportFormat, NewContent, Representation,
};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Default number of retries for idempotent reads.
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base delay between retries; grows linearly with the attempt number.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: Option<String>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl ConfluenceClient {
    /// Create a client with default timeout and retry settings.
    ///
    /// Without credentials requests are sent anonymously.
    #[must_use]
    pub fn new(base_url: &str, credentials: Option<&Credentials>) -> Self {
        Self::with_settings(
            base_url,
            credentials,
            Duration::from_secs(DEFAULT_TIMEOUT),
            DEFAULT_MAX_RETRIES,
        )
    }

    /// Create a client from the `[confluence]` config section.
    #[must_use]
    pub fn from_config(config: &ConfluenceConfig, credentials: Option<&Credentials>) -> Self {
        Self::with_settings(
            &config.base_url,
            credentials,
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )
    }

    fn with_settings(
        base_url: &str,
        credentials: Option<&Credentials>,
        timeout: Duration,
        max_retries: u32,
    ) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: credentials.map(basic_auth),
            max_retries,
            retry_backoff: RETRY_BACKOFF,
        }
    }

    /// Override the retry policy for reads.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        match &self.auth_header {
            Some(value) => request.header("Authorization", value),
            None => request,
        }
    }

    /// GET `url`, retrying transient failures.
    fn get(&self, url: &str, accept: &str) -> Result<Body, ConfluenceError> {
        let mut attempt = 0;
        loop {
            let result = self
                .authorize(self.agent.get(url))
                .header("Accept", accept)
                .call()
                .map_err(ConfluenceError::from)
                .and_then(checked_body);

            match result {
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(url, attempt, error = %err, "Transient failure, retrying");
                    std::thread::sleep(self.retry_backoff * attempt);
                }
                other => return other,
            }
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ConfluenceError> {
        let mut body = self.get(url, "application/json")?;
        read_json(&mut body)
    }

    fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T, ConfluenceError> {
        let payload_bytes = serde_json::to_vec(payload)?;
        let response = self
            .authorize(self.agent.post(url))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;
        read_json(&mut checked_body(response)?)
    }

    fn put_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T, ConfluenceError> {
        let payload_bytes = serde_json::to_vec(payload)?;
        let response = self
            .authorize(self.agent.put(url))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;
        read_json(&mut checked_body(response)?)
    }
}

fn basic_auth(credentials: &Credentials) -> String {
    let token = BASE64.encode(format!("{}:{}", credentials.username, credentials.password));
    format!("Basic {token}")
}

/// Turn an error status into [`ConfluenceError::HttpResponse`].
fn checked_body(response: ureq::http::Response<Body>) -> Result<Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body = response.into_body();
    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }
    Ok(body)
}

fn read_json<T: serde::de::DeserializeOwned>(body: &mut Body) -> Result<T, ConfluenceError> {
    let text = body.read_to_string()?;
    Ok(serde_json::from_str(&text)?)
}

impl ContentClient for ConfluenceClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_content(&self, query: &ContentQuery) -> Result<ContentResults, ConfluenceError> {
        self.search_content(query)
    }

    fn get_content_by_id(&self, id: &ContentId, expand: &[&str]) -> Result<Content, ConfluenceError> {
        self.fetch_content(id, expand)
    }

    fn create_content(&self, content: &NewContent) -> Result<Content, ConfluenceError> {
        self.post_content(content)
    }

    fn update_content(
        &self,
        id: &ContentId,
        version: VersionToken,
        update: &ContentUpdate,
    ) -> Result<Content, ConfluenceError> {
        self.put_content(id, version, update)
    }

    fn convert_to_storage(&self, value: &str, from: Representation) -> Result<String, ConfluenceError> {
        self.convert_body(value, from)
    }

    fn upload_attachment(
        &self,
        parent: &ContentId,
        file: &AttachmentFile,
        comment: Option<&str>,
    ) -> Result<Attachment, ConfluenceError> {
        self.upsert_attachment(parent, file, comment)
    }

    fn download_export(
        &self,
        id: &ContentId,
        format: ExportFormat,
        sink: &mut dyn Write,
    ) -> Result<u64, ConfluenceError> {
        self.stream_export(id, format, sink)
    }

    fn delete_content(&self, id: &ContentId) -> Result<(), ConfluenceError> {
        self.remove_content(id)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ConfluenceClient::new("https://wiki.example.com/", None);
        assert_eq!(client.base_url(), "https://wiki.example.com");
        assert_eq!(client.api_url(), "https://wiki.example.com/rest/api");
    }

    #[test]
    fn test_basic_auth_header() {
        let credentials = Credentials {
            username: "alice".to_owned(),
            password: "secret".to_owned(),
        };
        assert_eq!(basic_auth(&credentials), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_anonymous_client_has_no_auth_header() {
        let client = ConfluenceClient::new("https://wiki.example.com", None);
        assert!(client.auth_header.is_none());
    }

    #[test]
    fn test_from_config_uses_retry_setting() {
        let mut config = ConfluenceConfig::new("https://wiki.example.com");
        config.max_retries = 5;
        let client = ConfluenceClient::from_config(&config, None);
        assert_eq!(client.max_retries, 5);
    }

    #[test]
    fn test_connection_refused_is_transient() {
        let client = ConfluenceClient::new("http://127.0.0.1:1", None)
            .with_retries(0, Duration::from_millis(1));
        let err = client
            .get_content_by_id(&ContentId::new("1"), &[])
            .unwrap_err();
        assert!(err.is_transient());
    }
}
