//! Publish pipeline implementation.

use tracing::{debug, info, warn};

use super::attachments::{self, AttachmentReport};
use super::export;
use super::operation::{Dependent, Operation, PublishRequest};
use super::result::{DryRunResult, PublishOutcome, PublishResult};
use crate::api::ContentClient;
use crate::cancel::CancellationToken;
use crate::convert::FormatConverter;
use crate::error::{ConfluenceError, ErrorKind, PublishError, Stage};
use crate::merge::{MergePolicy, merge};
use crate::reference::{ContentBody, ContentId, ContentIdentity, PageReference, VersionToken};
use crate::resolver::{IdentityResolver, Resolved};
use crate::template::TemplateRenderer;
use crate::types::{Content, ContentType, ContentUpdate, NewContent};

/// Where the main write goes, once references are resolved.
enum Target {
    NewPage {
        parent: ContentIdentity,
        space: String,
        title: String,
    },
    Comment {
        page: ContentIdentity,
    },
    BlogPost {
        space: String,
        title: String,
    },
    Existing {
        resolved: Resolved,
        policy: MergePolicy,
        message: Option<String>,
    },
}

impl Target {
    fn creates(&self) -> bool {
        !matches!(self, Self::Existing { .. })
    }

    fn identity(&self) -> Option<&ContentIdentity> {
        match self {
            Self::NewPage { parent, .. } => Some(parent),
            Self::Comment { page } => Some(page),
            Self::BlogPost { .. } => None,
            Self::Existing { resolved, .. } => Some(&resolved.identity),
        }
    }
}

/// Resolved target plus the final storage body.
struct Prepared {
    target: Target,
    body: ContentBody,
}

/// Runs publish requests against a content service.
pub struct Publisher<'a> {
    client: &'a dyn ContentClient,
    renderer: &'a dyn TemplateRenderer,
    cancel: CancellationToken,
}

impl<'a> Publisher<'a> {
    /// Create a new publisher.
    #[must_use]
    pub fn new(client: &'a dyn ContentClient, renderer: &'a dyn TemplateRenderer) -> Self {
        Self {
            client,
            renderer,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop the run once `cancel` trips. Checked before every blocking call.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run a publish request.
    ///
    /// Stages run in order: render the input, resolve references, convert to
    /// storage, fetch and merge the existing body (updates only), write, then
    /// the dependents. A failure stops the run; anything already written stays
    /// written.
    ///
    /// # Errors
    ///
    /// Returns the first error, tagged with the stage it happened in.
    pub fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome, PublishError> {
        let Some(prepared) = self.prepare(request)? else {
            return Ok(PublishOutcome::Skipped {
                input: request.input.clone(),
            });
        };

        let created = prepared.target.creates();
        let content = self.write(prepared)?;
        let identity = ContentIdentity::from_content(&content);
        let url = web_url(self.client.base_url(), &content);
        info!(
            id = %identity.id,
            created,
            "Published {} '{}'",
            identity.content_type,
            content.title
        );

        let mut result = PublishResult {
            identity,
            created,
            url,
            attachments: AttachmentReport::default(),
            exported: None,
        };
        self.run_dependents(&request.dependents, &mut result)?;
        Ok(PublishOutcome::Published(result))
    }

    /// Run every read-only stage and report what [`publish`](Self::publish)
    /// would write.
    ///
    /// Returns `None` when the update would be skipped for a missing input.
    ///
    /// # Errors
    ///
    /// Same as [`publish`](Self::publish) up to the write stage.
    pub fn dry_run(&self, request: &PublishRequest) -> Result<Option<DryRunResult>, PublishError> {
        let Some(prepared) = self.prepare(request)? else {
            return Ok(None);
        };

        let current_version = match &prepared.target {
            Target::Existing { resolved, .. } => resolved.identity.version,
            _ => None,
        };
        let mut attachments = Vec::new();
        let mut export = None;
        for dependent in &request.dependents {
            match dependent {
                Dependent::Attachments { files, .. } => attachments.extend(files.iter().cloned()),
                Dependent::Export { destination } => export = Some(destination.clone()),
            }
        }

        Ok(Some(DryRunResult {
            target: prepared.target.identity().cloned(),
            creates: prepared.target.creates(),
            body: prepared.body.text,
            current_version,
            attachments,
            export,
        }))
    }

    /// Stages up to and including merge. `None` means skipped.
    fn prepare(&self, request: &PublishRequest) -> Result<Option<Prepared>, PublishError> {
        request.validate()?;

        if request.operation.is_update() && request.skip_missing_input && !request.input.exists() {
            warn!(
                input = %request.input.display(),
                "Input file not found, skipping update"
            );
            return Ok(None);
        }

        let incoming = self.render(request)?;
        let target = self.resolve_target(&request.operation)?;

        self.cancel.check(Stage::Convert)?;
        let incoming = FormatConverter::new(self.client).to_storage(incoming)?;

        let prepared = match target {
            Target::Existing {
                resolved,
                policy,
                message,
            } => {
                let resolved = self.fetch_existing(resolved, policy)?;
                let body = merge(policy, resolved.body.as_ref(), incoming)?;
                Prepared {
                    target: Target::Existing {
                        resolved,
                        policy,
                        message,
                    },
                    body,
                }
            }
            target => Prepared {
                target,
                body: incoming,
            },
        };
        Ok(Some(prepared))
    }

    fn render(&self, request: &PublishRequest) -> Result<ContentBody, PublishError> {
        self.cancel.check(Stage::Render)?;
        let text = self.renderer.render(&request.input, &request.parameters)?;
        debug!(input = %request.input.display(), bytes = text.len(), "Rendered input");
        Ok(ContentBody {
            representation: request.representation,
            text,
        })
    }

    fn resolve_target(&self, operation: &Operation) -> Result<Target, PublishError> {
        let resolver = IdentityResolver::new(self.client);
        match operation {
            Operation::CreatePage { parent, title } => {
                self.cancel.check(Stage::Resolve)?;
                let parent = resolver.resolve(parent, ContentType::Page, &[])?.identity;
                let space = match &parent.space {
                    Some(space) => space.clone(),
                    None => self.space_of(&parent.id)?,
                };
                Ok(Target::NewPage {
                    parent,
                    space,
                    title: title.clone(),
                })
            }
            Operation::AddComment { page } => {
                self.cancel.check(Stage::Resolve)?;
                let page = resolver.resolve(page, ContentType::Page, &[])?.identity;
                Ok(Target::Comment { page })
            }
            Operation::AddBlogEntry { space, title } => Ok(Target::BlogPost {
                space: space.clone(),
                title: title.clone(),
            }),
            Operation::UpdatePage {
                target,
                policy,
                message,
            } => {
                self.cancel.check(Stage::Resolve)?;
                let expand: &[&str] = if policy.requires_existing() {
                    &["version", "body.storage"]
                } else {
                    &["version"]
                };
                Ok(Target::Existing {
                    resolved: resolver.resolve(target, ContentType::Page, expand)?,
                    policy: *policy,
                    message: message.clone(),
                })
            }
        }
    }

    /// Space key of a page only known by id.
    fn space_of(&self, id: &ContentId) -> Result<String, PublishError> {
        let content = self
            .client
            .get_content_by_id(id, &["space"])
            .map_err(lookup_error(Stage::Resolve, ContentType::Page, id))?;
        content.space.map(|space| space.key).ok_or_else(|| {
            PublishError::Transport {
                stage: Stage::Resolve,
                source: ConfluenceError::UnexpectedResponse(format!("content {id} has no space")),
            }
        })
    }

    /// Fill in the version, and the body when `policy` needs it.
    fn fetch_existing(
        &self,
        resolved: Resolved,
        policy: MergePolicy,
    ) -> Result<Resolved, PublishError> {
        let needs_body = policy.requires_existing();
        if resolved.identity.version.is_some() && (!needs_body || resolved.body.is_some()) {
            return Ok(resolved);
        }

        self.cancel.check(Stage::Fetch)?;
        let expand: &[&str] = if needs_body {
            &["version", "space", "body.storage"]
        } else {
            &["version", "space"]
        };
        let id = &resolved.identity.id;
        let content = self
            .client
            .get_content_by_id(id, expand)
            .map_err(lookup_error(Stage::Fetch, ContentType::Page, id))?;
        debug!(id = %id, "Fetched current content");

        Ok(Resolved {
            identity: ContentIdentity::from_content(&content),
            body: content.storage_value().map(ContentBody::storage),
        })
    }

    fn write(&self, prepared: Prepared) -> Result<Content, PublishError> {
        self.cancel.check(Stage::Write)?;
        let storage = prepared.body.text;

        let new_content = match prepared.target {
            Target::Existing {
                resolved, message, ..
            } => return self.update(resolved.identity, storage, message),
            Target::NewPage {
                parent,
                space,
                title,
            } => NewContent::page(&space, &title, parent.id, storage),
            Target::Comment { page } => NewContent::comment(page.id, storage),
            Target::BlogPost { space, title } => NewContent::blog_post(&space, &title, storage),
        };

        self.client
            .create_content(&new_content)
            .map_err(PublishError::transport(Stage::Write))
    }

    fn update(
        &self,
        identity: ContentIdentity,
        storage: String,
        message: Option<String>,
    ) -> Result<Content, PublishError> {
        let (Some(version), Some(title)) = (identity.version, identity.title) else {
            return Err(PublishError::Transport {
                stage: Stage::Fetch,
                source: ConfluenceError::UnexpectedResponse(format!(
                    "content {} came back without version or title",
                    identity.id
                )),
            });
        };

        let update = ContentUpdate {
            content_type: identity.content_type,
            title,
            storage,
            message,
        };
        let id = identity.id;
        self.client
            .update_content(&id, version, &update)
            .map_err(|source| conflict_or_transport(id.clone(), version, source))
    }

    fn run_dependents(
        &self,
        dependents: &[Dependent],
        result: &mut PublishResult,
    ) -> Result<(), PublishError> {
        for dependent in dependents {
            match dependent {
                Dependent::Attachments { files, comment } => {
                    let report = attachments::upload_all(
                        self.client,
                        &result.identity.id,
                        files,
                        comment.as_deref(),
                        &self.cancel,
                    )?;
                    result.attachments.extend(report);
                }
                Dependent::Export { destination } => {
                    result.exported = Some(export::export_to_file(
                        self.client,
                        &result.identity.id,
                        destination,
                        &self.cancel,
                    )?);
                }
            }
        }
        Ok(())
    }
}

fn conflict_or_transport(
    id: ContentId,
    version: VersionToken,
    source: ConfluenceError,
) -> PublishError {
    if source.kind() == ErrorKind::Conflict {
        PublishError::Conflict {
            id,
            version: version.number(),
            source,
        }
    } else {
        PublishError::Transport {
            stage: Stage::Write,
            source,
        }
    }
}

/// Map a 404 on an id lookup to [`PublishError::NotFound`].
pub(super) fn lookup_error(
    stage: Stage,
    content_type: ContentType,
    id: &ContentId,
) -> impl FnOnce(ConfluenceError) -> PublishError {
    let id = id.clone();
    move |source| {
        if source.kind() == ErrorKind::NotFound {
            PublishError::NotFound {
                content_type,
                reference: PageReference::Absolute { id },
            }
        } else {
            PublishError::Transport { stage, source }
        }
    }
}

/// Web URL for content, when the service returned a `webui` link.
fn web_url(base_url: &str, content: &Content) -> Option<String> {
    content.webui().map(|webui| format!("{base_url}{webui}"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::mock::{MOCK_BASE_URL, MockCall, MockContentClient, MockOp};
    use crate::template::JinjaRenderer;
    use crate::types::Representation;

    fn input(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn published(outcome: PublishOutcome) -> PublishResult {
        match outcome {
            PublishOutcome::Published(result) => result,
            PublishOutcome::Skipped { input } => panic!("unexpected skip of {}", input.display()),
        }
    }

    fn update_page(target: PageReference, policy: MergePolicy) -> Operation {
        Operation::UpdatePage {
            target,
            policy,
            message: None,
        }
    }

    fn updates(client: &MockContentClient) -> Vec<(ContentId, VersionToken, ContentUpdate)> {
        client
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::UpdateContent {
                    id,
                    version,
                    update,
                } => Some((id, version, update)),
                _ => None,
            })
            .collect()
    }

    fn creates(client: &MockContentClient) -> Vec<NewContent> {
        client
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::CreateContent(content) => Some(content),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_create_page_under_relative_parent() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new()
            .with_page("100", "DEV", "Home", "<p>root</p>")
            .with_next_id(205);
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            Operation::CreatePage {
                parent: PageReference::relative("DEV", "Home"),
                title: "Child".to_owned(),
            },
            input(&dir, "child.xhtml", "<p>Hi</p>"),
        );

        let result = published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        assert_eq!(result.identity.id, ContentId::new("205"));
        assert!(result.created);
        assert_eq!(
            result.url,
            Some(format!("{MOCK_BASE_URL}/pages/viewpage.action?pageId=205"))
        );
        let created = creates(&client);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].ancestors, vec![ContentId::new("100")]);
        assert_eq!(created[0].space_key.as_deref(), Some("DEV"));
        assert_eq!(created[0].storage, "<p>Hi</p>");
        assert_eq!(client.count(MockOp::GetContent), 1);
        assert_eq!(client.total_calls(), 2);
    }

    #[test]
    fn test_create_page_under_absolute_parent_looks_up_space() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new().with_page("100", "DEV", "Home", "");
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            Operation::CreatePage {
                parent: PageReference::absolute("100"),
                title: "Child".to_owned(),
            },
            input(&dir, "child.xhtml", "<p>Hi</p>"),
        );

        published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        assert_eq!(client.count(MockOp::GetContent), 0);
        assert_eq!(client.count(MockOp::GetContentById), 1);
        assert_eq!(creates(&client)[0].space_key.as_deref(), Some("DEV"));
    }

    #[test]
    fn test_update_append_by_id() {
        let dir = TempDir::new().unwrap();
        let client =
            MockContentClient::new().with_page_version("205", "DEV", "Page", "<p>A</p>", 7);
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            update_page(PageReference::absolute("205"), MergePolicy::Append),
            input(&dir, "page.xhtml", "<p>B</p>"),
        );

        let result = published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        let updates = updates(&client);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1, VersionToken::new(7));
        assert_eq!(updates[0].2.storage, "<p>A</p><p>B</p>");
        assert_eq!(updates[0].2.title, "Page");
        assert_eq!(client.count(MockOp::GetContentById), 1);
        assert_eq!(client.total_calls(), 2);
        assert!(!result.created);
        assert_eq!(result.identity.version, Some(VersionToken::new(8)));
    }

    #[test]
    fn test_update_prepend_by_title_needs_no_fetch() {
        let dir = TempDir::new().unwrap();
        let client =
            MockContentClient::new().with_page_version("205", "DEV", "Page", "<p>A</p>", 3);
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            update_page(PageReference::relative("DEV", "Page"), MergePolicy::Prepend),
            input(&dir, "page.xhtml", "<p>B</p>"),
        );

        published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        assert_eq!(updates(&client)[0].2.storage, "<p>B</p><p>A</p>");
        assert_eq!(client.count(MockOp::GetContentById), 0);
        assert_eq!(client.total_calls(), 2);
    }

    #[test]
    fn test_replace_by_id_fetches_version_only() {
        let dir = TempDir::new().unwrap();
        let client =
            MockContentClient::new().with_page_version("205", "DEV", "Page", "<p>A</p>", 2);
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            update_page(PageReference::absolute("205"), MergePolicy::Replace),
            input(&dir, "page.xhtml", "<p>B</p>"),
        );

        published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        let fetch = client
            .calls()
            .into_iter()
            .find_map(|call| match call {
                MockCall::GetContentById { expand, .. } => Some(expand),
                _ => None,
            })
            .unwrap();
        assert!(!fetch.iter().any(|field| field == "body.storage"));
        assert_eq!(
            client.content("205").unwrap().storage_value(),
            Some("<p>B</p>")
        );
    }

    #[test]
    fn test_update_missing_input_skipped_without_calls() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new();
        let renderer = JinjaRenderer::new();
        let missing = dir.path().join("absent.xhtml");
        let request = PublishRequest::new(
            update_page(PageReference::relative("DEV", "Page"), MergePolicy::Replace),
            &missing,
        );

        let outcome = Publisher::new(&client, &renderer).publish(&request).unwrap();

        assert!(matches!(outcome, PublishOutcome::Skipped { input } if input == missing));
        assert_eq!(client.total_calls(), 0);
    }

    #[test]
    fn test_update_missing_input_fails_when_not_skipping() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new();
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            update_page(PageReference::relative("DEV", "Page"), MergePolicy::Replace),
            dir.path().join("absent.xhtml"),
        )
        .skip_missing_input(false);

        let err = Publisher::new(&client, &renderer)
            .publish(&request)
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Render);
        assert_eq!(client.total_calls(), 0);
    }

    #[test]
    fn test_wiki_input_converted_once() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new()
            .with_conversion("h1. Title", "<h1>Title</h1>")
            .with_next_id(300);
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            Operation::AddBlogEntry {
                space: "DEV".to_owned(),
                title: "News".to_owned(),
            },
            input(&dir, "news.wiki", "h1. Title"),
        )
        .representation(Representation::Wiki);

        published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        assert_eq!(client.count(MockOp::Convert), 1);
        assert_eq!(creates(&client)[0].storage, "<h1>Title</h1>");
        assert_eq!(creates(&client)[0].content_type, ContentType::BlogPost);
    }

    #[test]
    fn test_wiki_monospace_survives_rendering() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new()
            .with_conversion(
                "Run {{mvn install}} for 2.0",
                "<p>Run <code>mvn install</code> for 2.0</p>",
            )
            .with_next_id(301);
        let renderer = JinjaRenderer::new();
        let parameters = BTreeMap::from([("version".to_owned(), "2.0".to_owned())]);
        let request = PublishRequest::new(
            Operation::AddBlogEntry {
                space: "DEV".to_owned(),
                title: "Build".to_owned(),
            },
            input(&dir, "notes.wiki", "Run {{mvn install}} for ${ version }"),
        )
        .parameters(parameters)
        .representation(Representation::Wiki);

        published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        assert_eq!(
            client.calls()[0],
            MockCall::Convert {
                value: "Run {{mvn install}} for 2.0".to_owned(),
                from: Representation::Wiki,
            }
        );
        assert_eq!(
            creates(&client)[0].storage,
            "<p>Run <code>mvn install</code> for 2.0</p>"
        );
    }

    #[test]
    fn test_storage_input_not_converted() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new();
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            Operation::AddBlogEntry {
                space: "DEV".to_owned(),
                title: "News".to_owned(),
            },
            input(&dir, "news.xhtml", "<p>x</p>"),
        );

        published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        assert_eq!(client.count(MockOp::Convert), 0);
        assert_eq!(client.count(MockOp::GetContent), 0);
        assert_eq!(client.total_calls(), 1);
    }

    #[test]
    fn test_template_parameters_rendered() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new();
        let renderer = JinjaRenderer::new();
        let parameters = BTreeMap::from([("version".to_owned(), "2.0".to_owned())]);
        let request = PublishRequest::new(
            Operation::AddBlogEntry {
                space: "DEV".to_owned(),
                title: "Release".to_owned(),
            },
            input(&dir, "release.xhtml", "<p>Release ${ version }</p>"),
        )
        .parameters(parameters);

        published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        assert_eq!(creates(&client)[0].storage, "<p>Release 2.0</p>");
    }

    #[test]
    fn test_undefined_parameter_fails_before_network() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new();
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            Operation::AddBlogEntry {
                space: "DEV".to_owned(),
                title: "Release".to_owned(),
            },
            input(&dir, "release.xhtml", "<p>${ version }</p>"),
        );

        let err = Publisher::new(&client, &renderer)
            .publish(&request)
            .unwrap_err();

        assert!(matches!(err, PublishError::Render(_)));
        assert_eq!(client.total_calls(), 0);
    }

    #[test]
    fn test_version_conflict() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new()
            .with_page_version("205", "DEV", "Page", "<p>A</p>", 7)
            .with_failure(MockOp::UpdateContent, 409);
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            update_page(PageReference::absolute("205"), MergePolicy::Append),
            input(&dir, "page.xhtml", "<p>B</p>"),
        );

        let err = Publisher::new(&client, &renderer)
            .publish(&request)
            .unwrap_err();

        assert!(matches!(err, PublishError::Conflict { version: 7, .. }));
        assert_eq!(err.stage(), Stage::Write);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new();
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            update_page(PageReference::absolute("999"), MergePolicy::Replace),
            input(&dir, "page.xhtml", "<p>B</p>"),
        );

        let err = Publisher::new(&client, &renderer)
            .publish(&request)
            .unwrap_err();

        assert!(matches!(err, PublishError::NotFound { .. }));
        assert_eq!(client.count(MockOp::UpdateContent), 0);
    }

    #[test]
    fn test_missing_parent_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new();
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            Operation::CreatePage {
                parent: PageReference::relative("DEV", "Nowhere"),
                title: "Child".to_owned(),
            },
            input(&dir, "child.xhtml", "<p>Hi</p>"),
        );

        let err = Publisher::new(&client, &renderer)
            .publish(&request)
            .unwrap_err();

        assert!(matches!(err, PublishError::NotFound { .. }));
        assert_eq!(client.count(MockOp::CreateContent), 0);
    }

    #[test]
    fn test_comment_attached_to_page() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new().with_page("205", "DEV", "Page", "");
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            Operation::AddComment {
                page: PageReference::relative("DEV", "Page"),
            },
            input(&dir, "comment.xhtml", "<p>Looks good</p>"),
        );

        let result = published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        let created = creates(&client);
        assert_eq!(created[0].content_type, ContentType::Comment);
        assert_eq!(created[0].container, Some(ContentId::new("205")));
        assert_eq!(result.identity.content_type, ContentType::Comment);
    }

    #[test]
    fn test_attachment_failure_keeps_going() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            input(&dir, "a.png", "a"),
            input(&dir, "b.png", "b"),
            input(&dir, "c.png", "c"),
        ];
        let client = MockContentClient::new()
            .with_page("100", "DEV", "Home", "")
            .with_next_id(205)
            .with_upload_failure("b.png", 503);
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            Operation::CreatePage {
                parent: PageReference::relative("DEV", "Home"),
                title: "Child".to_owned(),
            },
            input(&dir, "child.xhtml", "<p>Hi</p>"),
        )
        .attach(files, None);

        let result = published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        assert_eq!(result.attachments.uploaded.len(), 2);
        assert_eq!(result.attachments.failed.len(), 1);
        assert_eq!(client.attachment_names("205"), vec!["a.png", "c.png"]);
    }

    #[test]
    fn test_cancel_after_write_leaves_page() {
        let dir = TempDir::new().unwrap();
        let cancel = CancellationToken::new();
        let client = MockContentClient::new()
            .with_page("100", "DEV", "Home", "")
            .with_next_id(205)
            .with_cancel_after(MockOp::CreateContent, cancel.clone());
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            Operation::CreatePage {
                parent: PageReference::relative("DEV", "Home"),
                title: "Child".to_owned(),
            },
            input(&dir, "child.xhtml", "<p>Hi</p>"),
        )
        .attach(vec![input(&dir, "a.png", "a")], None);

        let err = Publisher::new(&client, &renderer)
            .with_cancellation(cancel)
            .publish(&request)
            .unwrap_err();

        assert!(matches!(err, PublishError::Cancelled(Stage::Attachments)));
        assert!(client.content("205").is_some());
        assert_eq!(client.count(MockOp::UploadAttachment), 0);
    }

    #[test]
    fn test_cancelled_before_start() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new();
        let renderer = JinjaRenderer::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let request = PublishRequest::new(
            Operation::AddBlogEntry {
                space: "DEV".to_owned(),
                title: "News".to_owned(),
            },
            input(&dir, "news.xhtml", "<p>x</p>"),
        );

        let err = Publisher::new(&client, &renderer)
            .with_cancellation(cancel)
            .publish(&request)
            .unwrap_err();

        assert!(matches!(err, PublishError::Cancelled(Stage::Render)));
        assert_eq!(client.total_calls(), 0);
    }

    #[test]
    fn test_update_then_export() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("page.pdf");
        let client =
            MockContentClient::new().with_page_version("205", "DEV", "Page", "<p>A</p>", 1);
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            update_page(PageReference::absolute("205"), MergePolicy::Replace),
            input(&dir, "page.xhtml", "<p>B</p>"),
        )
        .export_to(&destination);

        let result = published(Publisher::new(&client, &renderer).publish(&request).unwrap());

        let exported = result.exported.unwrap();
        assert_eq!(exported.path, destination);
        assert_eq!(
            std::fs::read_to_string(&destination).unwrap(),
            "pdf export of 205"
        );
    }

    #[test]
    fn test_bad_export_extension_fails_before_network() {
        let dir = TempDir::new().unwrap();
        let client = MockContentClient::new();
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            update_page(PageReference::absolute("205"), MergePolicy::Replace),
            input(&dir, "page.xhtml", "<p>B</p>"),
        )
        .export_to(dir.path().join("page.html"));

        let err = Publisher::new(&client, &renderer)
            .publish(&request)
            .unwrap_err();

        assert!(matches!(err, PublishError::Config(_)));
        assert_eq!(client.total_calls(), 0);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let client =
            MockContentClient::new().with_page_version("205", "DEV", "Page", "<p>A</p>", 7);
        let renderer = JinjaRenderer::new();
        let request = PublishRequest::new(
            update_page(PageReference::relative("DEV", "Page"), MergePolicy::Append),
            input(&dir, "page.xhtml", "<p>B</p>"),
        )
        .attach(vec![dir.path().join("a.png")], None);

        let result = Publisher::new(&client, &renderer)
            .dry_run(&request)
            .unwrap()
            .unwrap();

        assert_eq!(result.body, "<p>A</p><p>B</p>");
        assert!(!result.creates);
        assert_eq!(result.current_version, Some(VersionToken::new(7)));
        assert_eq!(result.attachments.len(), 1);
        assert_eq!(client.count(MockOp::UpdateContent), 0);
        assert_eq!(client.count(MockOp::UploadAttachment), 0);
    }

    #[test]
    fn test_web_url_needs_webui_link() {
        let mut content: Content =
            serde_json::from_str(r#"{"id": "7", "type": "page", "title": "Home"}"#).unwrap();
        assert_eq!(web_url(MOCK_BASE_URL, &content), None);

        content = serde_json::from_str(
            r#"{"id": "7", "type": "page", "_links": {"webui": "/display/DEV/Home"}}"#,
        )
        .unwrap();
        assert_eq!(
            web_url(MOCK_BASE_URL, &content),
            Some(format!("{MOCK_BASE_URL}/display/DEV/Home"))
        );
    }
}
