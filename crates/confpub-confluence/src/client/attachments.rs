//! Attachment operations for Confluence API.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngExt;
use tracing::info;

use super::{ConfluenceClient, checked_body, read_json};
use crate::error::ConfluenceError;
use crate::reference::ContentId;
use crate::types::{Attachment, AttachmentFile, AttachmentsResponse};

impl ConfluenceClient {
    /// Upload or update attachment (upsert by filename).
    pub fn upsert_attachment(
        &self,
        parent: &ContentId,
        file: &AttachmentFile,
        comment: Option<&str>,
    ) -> Result<Attachment, ConfluenceError> {
        let existing = self.find_attachment_by_name(parent, &file.filename)?;

        let url = if let Some(ref att) = existing {
            info!(
                "Updating existing attachment '{}' (id={})",
                file.filename, att.id
            );
            format!(
                "{}/content/{}/child/attachment/{}/data",
                self.api_url(),
                parent,
                att.id
            )
        } else {
            info!(
                "Uploading new attachment '{}' to content {}",
                file.filename, parent
            );
            format!("{}/content/{}/child/attachment", self.api_url(), parent)
        };

        let boundary = format!(
            "----ConfpubFormBoundary{:016x}",
            rand::rng().random::<u64>()
        );
        let body = multipart_body(&boundary, file, comment);

        let response = self
            .authorize(self.agent.post(&url))
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;
        let mut body_reader = checked_body(response)?;

        // Response is a list for new uploads, single object for updates
        if existing.is_some() {
            read_json(&mut body_reader)
        } else {
            let response: AttachmentsResponse = read_json(&mut body_reader)?;
            response.results.into_iter().next().ok_or_else(|| {
                ConfluenceError::UnexpectedResponse("empty attachment response".to_owned())
            })
        }
    }

    /// Find attachment by filename on a content item.
    fn find_attachment_by_name(
        &self,
        parent: &ContentId,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        let url = format!(
            "{}/content/{}/child/attachment?filename={}",
            self.api_url(),
            parent,
            utf8_percent_encode(filename, NON_ALPHANUMERIC)
        );
        let attachments: AttachmentsResponse = self.get_json(&url)?;
        Ok(attachments
            .results
            .into_iter()
            .find(|a| a.title == filename))
    }
}

fn multipart_body(boundary: &str, file: &AttachmentFile, comment: Option<&str>) -> Vec<u8> {
    let mut body = Vec::with_capacity(file.data.len() + 512);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            file.filename.replace('"', "%22")
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.media_type).as_bytes());
    body.extend_from_slice(&file.data);
    body.extend_from_slice(b"\r\n");

    if let Some(c) = comment {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"comment\"\r\n\r\n");
        body.extend_from_slice(c.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn file() -> AttachmentFile {
        AttachmentFile {
            filename: "notes.txt".to_owned(),
            media_type: "text/plain",
            data: b"hello".to_vec(),
        }
    }

    #[test]
    fn test_multipart_body_without_comment() {
        let body = multipart_body("XYZ", &file(), None);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             hello\r\n\
             --XYZ--\r\n"
        );
    }

    #[test]
    fn test_multipart_body_with_comment() {
        let body = String::from_utf8(multipart_body("XYZ", &file(), Some("v2"))).unwrap();
        assert!(body.contains("name=\"comment\"\r\n\r\nv2\r\n"));
        assert!(body.ends_with("--XYZ--\r\n"));
    }
}
