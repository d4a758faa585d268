//! Report provider: the logo and summary that the PDF report is built from.
//!
//! Both resources answer with a JSON envelope in a single text item. The
//! envelope mirrors a `resources/read` result, so the client-side normalizer
//! unwraps it into the real content.

use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use crate::config::AssetConfig;
use crate::registry::{handler_fn, CapabilityRegistry};
use crate::types::{CapabilityDescriptor, ContentItem, McpError};

pub const LOGO_URI: &str = "resource://logo";
pub const SUMMARY_URI: &str = "resource://summary";

pub const SUMMARY_TEXT: &str =
    "This quarter, revenue grew by 25%. Customer satisfaction improved to 92%.";

fn logo_descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor::resource(LOGO_URI)
        .with_name("Company Logo")
        .with_description("Logo image in PNG format")
        .with_mime_type("image/png")
}

fn summary_descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor::resource(SUMMARY_URI)
        .with_name("Quarterly Summary")
        .with_description("Business summary text")
        .with_mime_type("text/plain")
}

/// Wrap `contents` in an envelope describing `descriptor`.
fn envelope(descriptor: &CapabilityDescriptor, contents: Value) -> ContentItem {
    let envelope = json!({
        "uri": descriptor.identifier,
        "name": descriptor.name,
        "description": descriptor.description,
        "mimeType": descriptor.mime_type,
        "contents": contents,
    });
    ContentItem::text(envelope.to_string())
}

pub fn registry(assets: &AssetConfig) -> CapabilityRegistry {
    let logo_path: Arc<PathBuf> = Arc::new(assets.logo_path());

    CapabilityRegistry::new()
        .with(
            logo_descriptor(),
            handler_fn(move |_| {
                let logo_path = Arc::clone(&logo_path);
                async move {
                    let bytes = tokio::fs::read(logo_path.as_path()).await.map_err(|e| {
                        McpError::ToolExecution(format!(
                            "cannot read logo {}: {e}",
                            logo_path.display()
                        ))
                    })?;
                    tracing::debug!(
                        path = %logo_path.display(),
                        size = bytes.len(),
                        "Serving logo"
                    );
                    let contents = json!([{
                        "type": "blob",
                        "mimeType": "image/png",
                        "data": STANDARD.encode(&bytes),
                    }]);
                    Ok(vec![envelope(&logo_descriptor(), contents)])
                }
            }),
        )
        .with(
            summary_descriptor(),
            handler_fn(|_| async {
                let contents = json!([{ "type": "text", "text": SUMMARY_TEXT }]);
                Ok(vec![envelope(&summary_descriptor(), contents)])
            }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_items;
    use crate::registry::Arguments;
    use crate::types::CapabilityKind;

    #[tokio::test]
    async fn test_logo_envelope_unwraps_to_blob() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        std::fs::write(&logo, b"\x89PNG\r\n").unwrap();
        let assets = AssetConfig {
            logo: Some(logo),
            ..AssetConfig::default()
        };

        let items = registry(&assets)
            .dispatch(CapabilityKind::Resource, LOGO_URI, Arguments::new())
            .await
            .unwrap();
        let items = normalize_items(&items);
        assert_eq!(items, vec![ContentItem::blob(b"\x89PNG\r\n".to_vec(), "image/png")]);
    }

    #[tokio::test]
    async fn test_missing_logo_is_execution_error() {
        let assets = AssetConfig {
            logo: Some(PathBuf::from("/nonexistent/logo.png")),
            ..AssetConfig::default()
        };
        let err = registry(&assets)
            .dispatch(CapabilityKind::Resource, LOGO_URI, Arguments::new())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::ToolExecution(_)));
    }

    #[tokio::test]
    async fn test_summary_text() {
        let items = registry(&AssetConfig::default())
            .dispatch(CapabilityKind::Resource, SUMMARY_URI, Arguments::new())
            .await
            .unwrap();
        assert_eq!(normalize_items(&items), vec![ContentItem::text(SUMMARY_TEXT)]);
    }
}
