//! OCR through an external Tesseract binary.
//!
//! The binary is resolved once, when the engine is built:
//!
//! 1. `TESSERACT_CMD`, if set, is authoritative (even when it points nowhere)
//! 2. the first existing well-known install path
//! 3. plain `tesseract`, resolved through `PATH` at spawn time

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::{ToolError, ToolResult};

/// Environment variable naming the Tesseract binary.
pub const TESSERACT_ENV: &str = "TESSERACT_CMD";

/// Where the engine's binary path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinarySource {
    /// Named by `TESSERACT_CMD`.
    Environment,
    /// Found at a well-known install location.
    KnownLocation,
    /// Left to `PATH` lookup.
    SearchPath,
    /// Supplied explicitly by the caller.
    Explicit,
}

/// Well-known Tesseract install locations, probed in order.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(local) = std::env::var_os("LOCALAPPDATA") {
        paths.push(
            PathBuf::from(local)
                .join("Programs")
                .join("Tesseract-OCR")
                .join("tesseract.exe"),
        );
    }
    paths.push(PathBuf::from(r"C:\Program Files\Tesseract-OCR\tesseract.exe"));
    paths.push(PathBuf::from(r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe"));
    paths.push(PathBuf::from("/usr/bin/tesseract"));
    paths.push(PathBuf::from("/usr/local/bin/tesseract"));
    paths.push(PathBuf::from("/opt/homebrew/bin/tesseract"));
    paths
}

/// Runs OCR by invoking `<binary> <image> stdout`.
#[derive(Debug, Clone)]
pub struct OcrEngine {
    command: PathBuf,
    source: BinarySource,
}

impl OcrEngine {
    /// Resolve the binary from the process environment.
    pub fn locate() -> Self {
        Self::locate_with(std::env::var_os(TESSERACT_ENV))
    }

    /// Resolve the binary from an explicit override value.
    pub fn locate_with(env_override: Option<OsString>) -> Self {
        if let Some(cmd) = env_override.filter(|v| !v.is_empty()) {
            return Self {
                command: PathBuf::from(cmd),
                source: BinarySource::Environment,
            };
        }

        match candidate_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self {
                command: path,
                source: BinarySource::KnownLocation,
            },
            None => Self {
                command: PathBuf::from("tesseract"),
                source: BinarySource::SearchPath,
            },
        }
    }

    /// Use a specific binary.
    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            command: path.into(),
            source: BinarySource::Explicit,
        }
    }

    /// The binary this engine will invoke.
    pub fn command(&self) -> &Path {
        &self.command
    }

    /// How the binary was resolved.
    pub fn source(&self) -> &BinarySource {
        &self.source
    }

    /// Extract text from an image.
    ///
    /// Returns a report string: the recognised text under an
    /// `OCR Results from '<path>':` heading, or a "No text found" line when
    /// the binary produced only whitespace.
    pub async fn perform_ocr(&self, image_path: &Path) -> ToolResult<String> {
        if !image_path.exists() {
            return Err(ToolError::ImageNotFound(image_path.to_path_buf()));
        }

        if self.source != BinarySource::SearchPath && !self.command.exists() {
            return Err(ToolError::BinaryMissing(format!(
                "{} does not exist",
                self.command.display()
            )));
        }

        log::debug!(
            "running {} on {}",
            self.command.display(),
            image_path.display()
        );

        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => ToolError::BinaryMissing(
                    format!("cannot launch {}: {e}", self.command.display()),
                ),
                _ => ToolError::Io(e),
            })?;

        if !output.status.success() {
            return Err(ToolError::OcrFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let display = image_path.display();
        if text.trim().is_empty() {
            Ok(format!("No text found in image '{display}'"))
        } else {
            Ok(format!("OCR Results from '{display}':\n\n{text}"))
        }
    }
}
