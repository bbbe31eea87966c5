use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TabscanError {
    #[error("invalid PDF document {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("{what} could not be found at {path}")]
    MissingDependencyPath { what: &'static str, path: PathBuf },

    #[error("no column header found on page {page} of {path}")]
    NoHeaderFound { page: usize, path: PathBuf },

    #[error("tesseract not found. Install it: brew install tesseract (macOS) or apt install tesseract-ocr (Linux)")]
    OcrNotFound,

    #[error("OCR failed on page {page}: {reason}")]
    OcrInvocation { page: usize, reason: String },

    #[error("pdftoppm not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    RendererNotFound,

    #[error("failed to render page {page}: {reason}")]
    Render { page: usize, reason: String },

    #[error("failed to split {path}: {reason}")]
    Split { path: PathBuf, reason: String },

    #[error("failed to load config from {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to write spreadsheet {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("something prevented the converted data from being saved to {path}: {reason}")]
    OutputVerification { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
