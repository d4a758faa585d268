//! Error types for the tool bodies.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the tool bodies.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The input image does not exist.
    #[error("Image file '{}' not found", .0.display())]
    ImageNotFound(PathBuf),

    /// The external OCR binary is missing or cannot be launched.
    #[error("OCR binary unavailable: {0}")]
    BinaryMissing(String),

    /// The OCR binary ran but exited unsuccessfully.
    #[error("OCR process exited with {status}: {stderr}")]
    OcrFailed { status: String, stderr: String },

    /// The certificate template image does not exist.
    #[error("Certificate template '{}' not found", .0.display())]
    TemplateNotFound(PathBuf),

    /// Filesystem or process I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Whether this failure means an optional external dependency is absent.
    pub fn is_dependency_missing(&self) -> bool {
        matches!(self, ToolError::BinaryMissing(_))
    }
}

/// Convenience alias for tool results.
pub type ToolResult<T> = Result<T, ToolError>;
