//! Certificate rendering: overlay a recipient line on a template image.
//!
//! The output is an SVG document that embeds the template as a data URI and
//! draws the text on top, so no raster library is required.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{ToolError, ToolResult};

/// Text origin on the template, in pixels.
const TEXT_X: u32 = 150;
const TEXT_Y: u32 = 300;
const FONT_SIZE: u32 = 40;

/// Canvas size used when the template dimensions cannot be read.
const FALLBACK_SIZE: (u32, u32) = (1200, 900);

/// Build the certificate line for a recipient.
pub fn generate_text(name: &str, course: &str, date: &str) -> String {
    format!(" {name} {course} {date}.")
}

/// Renders certificates from a template into an output directory.
#[derive(Debug, Clone)]
pub struct CertificateStudio {
    template: PathBuf,
    output_dir: PathBuf,
}

impl CertificateStudio {
    /// Create a studio for the given template and output directory.
    pub fn new(template: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Template image path.
    pub fn template(&self) -> &Path {
        &self.template
    }

    /// Directory certificates are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render a certificate and return the written file path.
    pub fn create_certificate(&self, name: &str, course: &str, date: &str) -> ToolResult<PathBuf> {
        let template = std::fs::read(&self.template).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ToolError::TemplateNotFound(self.template.clone()),
            _ => ToolError::Io(e),
        })?;

        let text = generate_text(name, course, date);
        let svg = render_svg(&template, &text);

        std::fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(certificate_file_name(name));
        std::fs::write(&output_path, svg)?;

        log::info!("certificate written to {}", output_path.display());
        Ok(output_path)
    }
}

/// `Alice Johnson` → `Alice_Johnson_certificate.svg`.
fn certificate_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("{stem}_certificate.svg")
}

fn render_svg(template: &[u8], text: &str) -> String {
    let (width, height) = png_dimensions(template).unwrap_or(FALLBACK_SIZE);
    let mime = sniff_mime(template);
    let data = STANDARD.encode(template);

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\">\n  \
         <image href=\"data:{mime};base64,{data}\" x=\"0\" y=\"0\" \
         width=\"{width}\" height=\"{height}\"/>\n  \
         <text x=\"{TEXT_X}\" y=\"{TEXT_Y}\" font-family=\"Arial, sans-serif\" \
         font-size=\"{FONT_SIZE}\" fill=\"black\">{}</text>\n\
         </svg>\n",
        escape_xml(text)
    )
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}

/// Width and height from a PNG IHDR chunk.
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if !bytes.starts_with(b"\x89PNG\r\n\x1a\n") || bytes.len() < 24 || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(bytes[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(bytes[20..24].try_into().ok()?);
    Some((width, height))
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
