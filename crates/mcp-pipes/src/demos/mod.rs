//! Client flows behind the `mcp-pipes` subcommands and `ocr_client`.
//!
//! Every flow connects to its provider(s), prints to the given writer and
//! closes what it opened before returning.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use mcp_pipes_tools::ReportAssembler;
use serde_json::Map;

use crate::config::{PipesConfig, ProviderSpec};
use crate::normalize::{first_blob, joined_text};
use crate::orchestrator::Orchestrator;
use crate::providers::{self, basics, ocr, report, ProviderKind};
use crate::session::{ClientSession, SessionOptions};
use crate::types::{CapabilityDescriptor, CapabilityKind, InvocationRequest, McpResult};

/// Name used by the demo clients when none is given.
pub const DEMO_NAME: &str = "Lavanthi";

/// Suffix of the file `ocr_client --out` writes.
pub const OCR_OUTPUT_SUFFIX: &str = "_ocr.txt";

/// How demo clients reach their providers.
#[derive(Debug, Clone)]
pub enum Launch {
    /// Spawn `<exe> serve <provider>` (or the configured command).
    Spawn(PathBuf),
    /// Serve the provider on a task in this process.
    InProcess,
}

/// Shared inputs of every demo flow.
#[derive(Debug, Clone)]
pub struct DemoContext {
    pub launch: Launch,
    pub config: PipesConfig,
    pub options: SessionOptions,
}

impl DemoContext {
    pub fn new(launch: Launch, config: PipesConfig) -> Self {
        Self {
            launch,
            config,
            options: SessionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    fn spec(&self, kind: ProviderKind) -> Option<ProviderSpec> {
        match &self.launch {
            Launch::Spawn(exe) => Some(self.config.provider_spec(kind.as_str(), exe)),
            Launch::InProcess => None,
        }
    }

    /// Open a ready session to one provider.
    pub async fn connect(&self, kind: ProviderKind) -> anyhow::Result<ClientSession> {
        let session = match self.spec(kind) {
            Some(spec) => ClientSession::connect(&spec, self.options.clone()).await,
            None => self.connect_in_process(kind).await,
        };
        session.with_context(|| format!("cannot connect to provider '{kind}'"))
    }

    async fn connect_in_process(&self, kind: ProviderKind) -> McpResult<ClientSession> {
        let transport = providers::in_process(kind, &self.config.assets);
        let mut session = ClientSession::new(transport, self.options.clone());
        session.initialize().await?;
        Ok(session)
    }

    async fn orchestrate(&self, kinds: &[ProviderKind]) -> anyhow::Result<Orchestrator> {
        if let Launch::Spawn(_) = self.launch {
            let specs: Vec<ProviderSpec> = kinds.iter().filter_map(|k| self.spec(*k)).collect();
            return Orchestrator::open_all(&specs, self.options.clone())
                .await
                .context("cannot open provider sessions");
        }

        let mut orchestrator = Orchestrator::new();
        for kind in kinds {
            let session = self.connect(*kind).await?;
            orchestrator.push(kind.as_str(), session)?;
        }
        Ok(orchestrator)
    }

    /// List the greet provider's prompts and render `greet-user`.
    pub async fn run_prompts(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let mut session = self.connect(ProviderKind::Greet).await?;
        let outcome = async {
            writeln!(out, "Available Prompts:")?;
            for prompt in session.list_prompts().await? {
                writeln!(
                    out,
                    " - {} ({})",
                    prompt.identifier,
                    prompt.description.as_deref().unwrap_or_default()
                )?;
            }

            let items = session
                .invoke(&InvocationRequest::prompt("greet-user").arg("name", DEMO_NAME))
                .await?;
            writeln!(out, "\nPrompt Response:")?;
            writeln!(out, "{}", joined_text(&items))?;
            anyhow::Ok(())
        }
        .await;
        session.close().await?;
        outcome
    }

    /// List the hello provider's resources and read `resource://hello`.
    pub async fn run_resources(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let mut session = self.connect(ProviderKind::Hello).await?;
        let outcome = async {
            writeln!(out, "Available Resources:")?;
            for resource in session.list_resources().await? {
                writeln!(out, " - {}", resource.label())?;
            }

            let items = session.read_resource(basics::HELLO_URI).await?;
            writeln!(out, "\nResource Content:")?;
            writeln!(out, "{}", joined_text(&items))?;
            anyhow::Ok(())
        }
        .await;
        session.close().await?;
        outcome
    }

    /// Talk to server A and server B at once.
    pub async fn run_multi(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let kinds = [ProviderKind::ServerA, ProviderKind::ServerB];
        let mut orchestrator = self.orchestrate(&kinds).await?;
        writeln!(out, "=== Connected to {} MCP servers ===", orchestrator.len())?;

        let outcome = multi_exchange(&mut orchestrator, out).await;

        let report = orchestrator.close_all().await;
        for failure in &report.failures {
            tracing::warn!("{failure}");
        }
        outcome
    }

    /// Fetch the logo and summary and assemble a PDF at `output`.
    pub async fn run_report(&self, output: &Path, out: &mut impl Write) -> anyhow::Result<PathBuf> {
        let mut session = self.connect(ProviderKind::Report).await?;
        let fetched = async {
            let logo = session.read_resource(report::LOGO_URI).await?;
            let summary = session.read_resource(report::SUMMARY_URI).await?;
            anyhow::Ok((logo, summary))
        }
        .await;
        session.close().await?;
        let (logo, summary) = fetched?;

        let logo_bytes = match first_blob(&logo) {
            Some((bytes, mime)) => {
                tracing::debug!(%mime, size = bytes.len(), "Logo received");
                bytes.to_vec()
            }
            None => {
                tracing::warn!("Logo resource carried no image, report will have no logo");
                Vec::new()
            }
        };
        let summary = joined_text(&summary);

        let path = ReportAssembler::new(output)
            .assemble_report(&logo_bytes, &summary)
            .context("cannot assemble report")?;
        writeln!(out, "PDF report generated: {}", path.display())?;
        Ok(path)
    }

    /// Render one certificate through the certificate provider.
    pub async fn run_certificate(
        &self,
        name: &str,
        course: &str,
        date: &str,
        out: &mut impl Write,
    ) -> anyhow::Result<String> {
        let mut session = self.connect(ProviderKind::Certificate).await?;
        let request = InvocationRequest::tool("create_certificate")
            .arg("name", name)
            .arg("course", course)
            .arg("date", date);
        let outcome = session.invoke(&request).await;
        session.close().await?;

        let path = joined_text(&outcome?);
        writeln!(out, "Certificate generated at: {path}")?;
        Ok(path)
    }

    /// Run `perform_ocr` on `image_path` and return the extracted text.
    pub async fn extract_text(&self, image_path: &Path) -> anyhow::Result<String> {
        let mut session = self.connect(ProviderKind::Ocr).await?;
        let mut args = Map::new();
        args.insert(
            "image_path".to_string(),
            image_path.display().to_string().into(),
        );
        let outcome = session.call_tool(ocr::TOOL_NAME, args).await;
        session.close().await?;

        let text = joined_text(&outcome?);
        if text.is_empty() {
            bail!("OCR provider returned no text");
        }
        Ok(text)
    }
}

async fn multi_exchange(
    orchestrator: &mut Orchestrator,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for (name, listed) in orchestrator.list_all(CapabilityKind::Prompt).await {
        writeln!(out, "\n[{name}] Prompts:")?;
        for prompt in listed? {
            writeln!(out, "{}", bullet(&prompt))?;
        }
    }

    let prompts = vec![
        (
            ProviderKind::ServerA.as_str().to_string(),
            InvocationRequest::prompt("greet-user-a").arg("name", DEMO_NAME),
        ),
        (
            ProviderKind::ServerB.as_str().to_string(),
            InvocationRequest::prompt("greet-user-b").arg("name", DEMO_NAME),
        ),
    ];
    for (key, result) in orchestrator.invoke_all(&prompts).await {
        writeln!(out, "\n[{}] Calling prompt: {}", key.session, key.identifier)?;
        writeln!(out, "  -> {}", joined_text(&result?))?;
    }

    for (name, listed) in orchestrator.list_all(CapabilityKind::Resource).await {
        writeln!(out, "\n[{name}] Resources:")?;
        for resource in listed? {
            writeln!(out, " - {}", resource.label())?;
        }
    }

    let reads = vec![
        (
            ProviderKind::ServerA.as_str().to_string(),
            InvocationRequest::resource("resource://hello-a"),
        ),
        (
            ProviderKind::ServerB.as_str().to_string(),
            InvocationRequest::resource("resource://time-b"),
        ),
    ];
    for (key, result) in orchestrator.invoke_all(&reads).await {
        writeln!(out, "\n[{}] Reading {}", key.session, key.identifier)?;
        writeln!(out, "  -> {}", joined_text(&result?))?;
    }
    Ok(())
}

fn bullet(descriptor: &CapabilityDescriptor) -> String {
    match descriptor.description.as_deref() {
        Some(desc) if !desc.is_empty() => format!(" - {}: {desc}", descriptor.identifier),
        _ => format!(" - {}", descriptor.identifier),
    }
}

/// Where `ocr_client --out <out>` writes the text extracted from `image`.
///
/// An existing directory, or a path ending in a separator, receives
/// `<image stem>_ocr.txt`; anything else is used as the file path.
pub fn output_path(out: &Path, image: &Path) -> PathBuf {
    let raw = out.as_os_str().to_string_lossy();
    if out.is_dir() || raw.ends_with('/') || raw.ends_with('\\') {
        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        out.join(format!("{stem}{OCR_OUTPUT_SUFFIX}"))
    } else {
        out.to_path_buf()
    }
}
