//! Report assembly: a logo and a summary laid out as a paginated PDF.

pub mod pdf;

use std::path::{Path, PathBuf};

use crate::error::ToolResult;

use pdf::{wrap_text, Font, Line, PdfDocument, PdfImage};

/// Default report file name.
pub const DEFAULT_REPORT_NAME: &str = "report.pdf";

/// Logo box on the first page, in points.
const LOGO_SIZE: (f32, f32) = (120.0, 60.0);

/// Characters per summary line at 12pt Helvetica on A4.
const WRAP_WIDTH: usize = 85;

/// Writes reports into a fixed location.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    output_path: PathBuf,
    title: String,
}

impl ReportAssembler {
    /// Assemble reports at `output_path`.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            title: "Quarterly Report".to_string(),
        }
    }

    /// Override the report title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Where the report is written.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the report and return its path.
    ///
    /// JPEG and PNG logos are embedded on the first page. A non-empty logo
    /// that decodes as neither is written next to the report as
    /// `<stem>_logo.<ext>` and referenced by name in the document.
    pub fn assemble_report(&self, logo: &[u8], summary: &str) -> ToolResult<PathBuf> {
        if let Some(parent) = self.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut doc = PdfDocument::new();
        let mut logo_note = None;

        if !logo.is_empty() {
            match PdfImage::from_bytes(logo, LOGO_SIZE.0, LOGO_SIZE.1) {
                Some(image) => {
                    doc.image(image);
                }
                None => {
                    let sidecar = self.sidecar_path(logo);
                    std::fs::write(&sidecar, logo)?;
                    log::debug!("logo written beside report: {}", sidecar.display());
                    logo_note = sidecar
                        .file_name()
                        .map(|n| format!("Logo: {}", n.to_string_lossy()));
                }
            }
        }

        doc.line(Line::new(Font::Bold, 24.0, self.title.clone()));
        for (i, text) in wrap_text(summary, WRAP_WIDTH).into_iter().enumerate() {
            let line = Line::new(Font::Regular, 12.0, text);
            doc.line(if i == 0 { line.spaced(12.0) } else { line });
        }
        if let Some(note) = logo_note {
            doc.line(Line::new(Font::Italic, 10.0, note).spaced(12.0));
        }
        doc.line(
            Line::new(Font::Italic, 12.0, "Report generated using MCP resources.").spaced(12.0),
        );
        doc.line(Line::new(
            Font::Italic,
            9.0,
            format!("Generated {}", chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")),
        ));

        std::fs::write(&self.output_path, doc.to_bytes())?;
        log::info!("report written to {}", self.output_path.display());
        Ok(self.output_path.clone())
    }

    fn sidecar_path(&self, logo: &[u8]) -> PathBuf {
        let ext = if logo.starts_with(b"\x89PNG") { "png" } else { "bin" };
        let stem = self
            .output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        self.output_path.with_file_name(format!("{stem}_logo.{ext}"))
    }
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_NAME)
    }
}
