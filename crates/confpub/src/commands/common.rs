//! Arguments and plumbing shared by all commands.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use confpub_config::{CliSettings, Config};
use confpub_confluence::{
    CancellationToken, ConfluenceClient, DryRunResult, JinjaRenderer, Operation, PageDescriptor,
    PageReference, PublishOutcome, PublishRequest, PublishResult, Publisher, Representation,
};
use tracing::debug;

use crate::error::CliError;
use crate::output::Output;

/// Connection options.
#[derive(Args)]
pub(crate) struct ConnectionArgs {
    /// Path to configuration file (default: auto-discover confpub.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Confluence base URL (overrides config).
    #[arg(long, env = "CONFLUENCE_URL")]
    url: Option<String>,

    /// Username (overrides config).
    #[arg(short, long, env = "CONFLUENCE_USERNAME")]
    username: Option<String>,

    /// Password or API token (overrides config).
    #[arg(short, long, env = "CONFLUENCE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Server id for the settings store lookup (default: the URL).
    #[arg(long)]
    server_id: Option<String>,

    /// Give up after this many seconds.
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Loaded configuration plus a ready client.
pub(crate) struct Session {
    pub config: Config,
    pub client: ConfluenceClient,
    pub cancel: CancellationToken,
}

impl ConnectionArgs {
    /// Load config, resolve credentials and build the client.
    pub(crate) fn connect(&self, extra: CliSettings) -> Result<Session, CliError> {
        let cli_settings = CliSettings {
            base_url: self.url.clone(),
            server_id: self.server_id.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            ..extra
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let confluence = config.require_confluence()?;
        let credentials = confluence.resolve_credentials()?;
        if credentials.is_none() {
            debug!("No credentials configured, connecting anonymously");
        }
        let client = ConfluenceClient::from_config(confluence, credentials.as_ref());

        let cancel = self.timeout.map_or_else(CancellationToken::new, |secs| {
            CancellationToken::with_timeout(Duration::from_secs(secs))
        });

        Ok(Session {
            config,
            client,
            cancel,
        })
    }
}

/// Page location by id, or by space and title.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Page id.
    #[arg(long)]
    page_id: Option<String>,

    /// Space key.
    #[arg(short, long)]
    space: Option<String>,

    /// Page title.
    #[arg(short, long)]
    title: Option<String>,
}

impl PageArgs {
    pub(crate) fn reference(&self) -> Result<PageReference, CliError> {
        let descriptor = PageDescriptor {
            id: self.page_id.clone(),
            space: self.space.clone(),
            title: self.title.clone(),
        };
        Ok(descriptor.to_reference()?)
    }
}

/// Options for commands that publish a rendered input file.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Input file, rendered as a template.
    input: PathBuf,

    /// Template parameter, repeatable.
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    parameters: Vec<(String, String)>,

    /// Input is wiki markup and must be converted to storage format.
    #[arg(long)]
    wiki_format: bool,

    /// File to upload to the written item, repeatable.
    #[arg(short, long = "attachment", value_name = "FILE")]
    attachments: Vec<PathBuf>,

    /// Comment stored with each uploaded attachment.
    #[arg(long)]
    attachment_comment: Option<String>,

    /// Do nothing.
    #[arg(long)]
    skip: bool,

    /// Preview changes without writing to Confluence.
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl PublishArgs {
    /// Run `operation` with these options. `export` adds an export after the write.
    pub(crate) fn run(self, operation: Operation, export: Option<PathBuf>) -> Result<(), CliError> {
        let output = Output::new();
        if self.skip {
            output.info("Skipping, --skip is set");
            return Ok(());
        }

        let session = self.connection.connect(CliSettings {
            wiki_format: self.wiki_format.then_some(true),
            parameters: self.parameters,
            ..CliSettings::default()
        })?;
        if session.config.publish.skip {
            output.info("Skipping, publish.skip is set in config");
            return Ok(());
        }

        let representation = if session.config.publish.wiki_format {
            Representation::Wiki
        } else {
            Representation::Storage
        };
        let mut request = PublishRequest::new(operation, self.input)
            .parameters(session.config.template.parameters.clone())
            .representation(representation)
            .skip_missing_input(session.config.publish.skip_missing_input)
            .attach(self.attachments, self.attachment_comment);
        if let Some(destination) = export {
            request = request.export_to(destination);
        }

        output.info(&format!("Publishing {}...", request.input.display()));

        let renderer = JinjaRenderer::new();
        let publisher =
            Publisher::new(&session.client, &renderer).with_cancellation(session.cancel);

        if self.dry_run {
            match publisher.dry_run(&request)? {
                Some(result) => print_dry_run_result(&output, &result),
                None => print_skipped(&output, &request.input),
            }
        } else {
            match publisher.publish(&request)? {
                PublishOutcome::Published(result) => print_publish_result(&output, &result),
                PublishOutcome::Skipped { input } => print_skipped(&output, &input),
            }
        }
        Ok(())
    }
}

/// Parse a `KEY=VALUE` pair.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn print_skipped(output: &Output, input: &std::path::Path) {
    output.warning(&format!(
        "Input file {} not found, nothing published",
        input.display()
    ));
}

fn print_dry_run_result(output: &Output, result: &DryRunResult) {
    output.heading("[DRY RUN] No changes made.");

    match &result.target {
        Some(target) if result.creates => output.field("Would create under", &target.id),
        Some(target) => output.field(
            "Would update",
            format!(
                "{} (v{})",
                target.id,
                result.current_version.map_or(0, |v| v.number())
            ),
        ),
        None => output.info("Would create a new item"),
    }
    output.field("Body", format!("{} bytes", result.body.len()));

    if !result.attachments.is_empty() {
        output.field("Attachments", result.attachments.len());
        for file in &result.attachments {
            output.item(file.display());
        }
    }
    if let Some(export) = &result.export {
        output.field("Export to", export.display());
    }
}

fn print_publish_result(output: &Output, result: &PublishResult) {
    let verb = if result.created { "Created" } else { "Updated" };
    output.heading(&format!("{verb} {}", result.identity.content_type));
    output.field("ID", &result.identity.id);
    if let Some(title) = &result.identity.title {
        output.field("Title", title);
    }
    if let Some(version) = result.identity.version {
        output.field("Version", version.number());
    }
    if let Some(url) = &result.url {
        output.field("URL", url);
    }

    print_attachment_report(output, &result.attachments);

    if let Some(exported) = &result.exported {
        output.field(
            "Exported",
            format!(
                "{} ({} bytes) to {}",
                exported.format,
                exported.bytes,
                exported.path.display()
            ),
        );
    }
}

pub(crate) fn print_attachment_report(
    output: &Output,
    report: &confpub_confluence::AttachmentReport,
) {
    if !report.uploaded.is_empty() {
        output.field("Attachments uploaded", report.uploaded.len());
    }
    if !report.is_complete() {
        output.warning(&format!("{} attachment(s) failed:", report.failed.len()));
        for failed in &report.failed {
            output.item(format!(
                "{}: {}",
                failed.file.display(),
                crate::error_chain(&failed.error)
            ));
        }
    }
}
