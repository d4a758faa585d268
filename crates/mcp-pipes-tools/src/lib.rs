//! Tool bodies behind the mcp-pipes demo providers.
//!
//! Nothing in this crate knows about the wire protocol. Each tool is a plain
//! Rust API that a provider wraps in a capability handler:
//!
//! - [`ocr::OcrEngine`] shells out to an external Tesseract binary
//! - [`certificate::CertificateStudio`] overlays text on a template image
//! - [`report::ReportAssembler`] lays a logo and summary out as a PDF

pub mod certificate;
pub mod error;
pub mod ocr;
pub mod report;

pub use certificate::{generate_text, CertificateStudio};
pub use error::{ToolError, ToolResult};
pub use ocr::{BinarySource, OcrEngine, TESSERACT_ENV};
pub use report::ReportAssembler;
