//! Certificate provider: `generate_text` and `create_certificate`.

use std::sync::Arc;

use mcp_pipes_tools::{generate_text, CertificateStudio};

use crate::config::AssetConfig;
use crate::registry::{handler_fn, required_str, Arguments, CapabilityRegistry};
use crate::types::{ArgumentSpec, CapabilityDescriptor, ContentItem, McpResult};

/// `name`, `course` and `date`, all required.
fn recipient_args(descriptor: CapabilityDescriptor) -> CapabilityDescriptor {
    descriptor
        .with_argument(ArgumentSpec::required("name").with_description("Recipient name"))
        .with_argument(ArgumentSpec::required("course").with_description("Course completed"))
        .with_argument(ArgumentSpec::required("date").with_description("Completion date"))
}

fn recipient(args: &Arguments) -> McpResult<(&str, &str, &str)> {
    Ok((
        required_str(args, "name")?,
        required_str(args, "course")?,
        required_str(args, "date")?,
    ))
}

pub fn registry(assets: &AssetConfig) -> CapabilityRegistry {
    let studio = Arc::new(CertificateStudio::new(
        assets.template_path(),
        assets.output_dir.clone(),
    ));

    CapabilityRegistry::new()
        .with(
            recipient_args(
                CapabilityDescriptor::tool("generate_text")
                    .with_description("Generate the certificate line for a recipient"),
            ),
            handler_fn(|args| async move {
                let (name, course, date) = recipient(&args)?;
                Ok(vec![ContentItem::text(generate_text(name, course, date))])
            }),
        )
        .with(
            recipient_args(
                CapabilityDescriptor::tool("create_certificate")
                    .with_description("Render a certificate and return the file path"),
            ),
            handler_fn(move |args| {
                let studio = Arc::clone(&studio);
                async move {
                    let (name, course, date) = recipient(&args)?;
                    let path = studio.create_certificate(name, course, date)?;
                    tracing::info!(path = %path.display(), "Certificate written");
                    Ok(vec![ContentItem::text(path.display().to_string())])
                }
            }),
        )
}
