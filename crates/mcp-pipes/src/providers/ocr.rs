//! OCR provider: `perform_ocr` backed by the Tesseract binary, with a mock
//! result when the binary is unavailable.

use std::path::Path;
use std::sync::Arc;

use mcp_pipes_tools::OcrEngine;

use crate::degrade::{Fallback, GracefulDegradation};
use crate::registry::{handler_fn, optional_str, required_str, Arguments, CapabilityRegistry};
use crate::types::{ArgumentSpec, CapabilityDescriptor, ContentItem};

pub const TOOL_NAME: &str = "perform_ocr";

/// Substitute text returned when Tesseract cannot be run.
pub fn mock_ocr_text(image_path: &str) -> String {
    format!(
        "Mock OCR result for '{image_path}' (Tesseract binary not found)\n\n\
         Sample extracted text:\nInvoice #12345\nDate: 2024-01-15\nTotal: $123.45"
    )
}

pub fn descriptor() -> CapabilityDescriptor {
    CapabilityDescriptor::tool(TOOL_NAME)
        .with_description("Perform OCR on an image file using Tesseract")
        .with_argument(
            ArgumentSpec::required("image_path")
                .with_description("Path to the image file to process"),
        )
}

/// Registry using the engine found by [`OcrEngine::locate`].
pub fn registry() -> CapabilityRegistry {
    registry_with(OcrEngine::locate())
}

pub fn registry_with(engine: OcrEngine) -> CapabilityRegistry {
    tracing::debug!(binary = %engine.command().display(), source = ?engine.source(), "OCR engine");
    let engine = Arc::new(engine);

    let inner = handler_fn(move |args| {
        let engine = Arc::clone(&engine);
        async move {
            let image_path = required_str(&args, "image_path")?;
            let text = engine.perform_ocr(Path::new(image_path)).await?;
            Ok(vec![ContentItem::text(text)])
        }
    });

    let fallback: Fallback = Arc::new(|args: &Arguments| {
        let image_path = optional_str(args, "image_path").unwrap_or_default();
        vec![ContentItem::text(mock_ocr_text(image_path))]
    });

    CapabilityRegistry::new().with(
        descriptor(),
        Arc::new(GracefulDegradation::new(TOOL_NAME, inner, fallback)),
    )
}
