use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::TabscanError;
use crate::model::OcrConfig;

/// Trait for OCR backends.
pub trait OcrEngine {
    /// Prepare a scanner for the configured language and model location.
    fn configure(&self, config: &OcrConfig) -> Result<Box<dyn Scanner>, TabscanError>;

    /// Name of this OCR backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// A configured OCR scanner.
pub trait Scanner {
    /// Recognize the text in the image at `image`, returned as one string.
    ///
    /// `page` is the 1-based page number, used only for error reporting.
    fn recognize(&self, image: &Path, page: usize) -> Result<String, TabscanError>;
}

/// OCR backend using the tesseract command-line tool.
///
/// Tesseract separates text blocks with blank lines and ends each page with
/// a form feed. Blank lines are removed so every line is one value, and the
/// form feed is kept as the final line, which the page extractor discards.
pub struct TesseractEngine;

impl TesseractEngine {
    pub fn new() -> Self {
        TesseractEngine
    }

    /// Check if tesseract is available on the system.
    pub fn is_available() -> bool {
        Command::new("tesseract")
            .arg("--version")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractEngine {
    fn configure(&self, config: &OcrConfig) -> Result<Box<dyn Scanner>, TabscanError> {
        if !config.model_path.is_dir() {
            return Err(TabscanError::MissingDependencyPath {
                what: "OCR model directory",
                path: config.model_path.clone(),
            });
        }

        Ok(Box::new(TesseractScanner {
            language: config.language.clone(),
            tessdata: config.model_path.clone(),
        }))
    }

    fn backend_name(&self) -> &str {
        "tesseract"
    }
}

struct TesseractScanner {
    language: String,
    tessdata: PathBuf,
}

impl Scanner for TesseractScanner {
    fn recognize(&self, image: &Path, page: usize) -> Result<String, TabscanError> {
        let output = Command::new("tesseract")
            .args(tesseract_args(image, &self.language, &self.tessdata))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TabscanError::OcrNotFound
                } else {
                    TabscanError::OcrInvocation {
                        page,
                        reason: format!("tesseract failed: {e}"),
                    }
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TabscanError::OcrInvocation {
                page,
                reason: format!("tesseract exited with code {code}: {}", stderr.trim()),
            });
        }

        Ok(compact_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

const PAGE_END: &str = "\x0c";

fn compact_output(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.split('\n').filter(|l| !l.trim().is_empty()).collect();
    lines.push(PAGE_END);
    lines.join("\n")
}

fn tesseract_args(image: &Path, language: &str, tessdata: &Path) -> Vec<OsString> {
    vec![
        image.into(),
        "stdout".into(),
        "-l".into(),
        language.into(),
        "--tessdata-dir".into(),
        tessdata.into(),
    ]
}
