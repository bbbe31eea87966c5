//! Document sources: open a PDF, count its pages, rasterize a page, and
//! copy a page range into a new PDF.
//!
//! A handle is closed when it is dropped, so every exit path releases it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::TabscanError;

/// Trait for document backends.
pub trait DocumentSource {
    /// Open the document at `path`. Fails with `InvalidDocument` for a
    /// missing file, a non-PDF path, or an unreadable PDF.
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>, TabscanError>;

    /// Name of this document backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// An open document. Dropping the handle closes it.
pub trait DocumentHandle {
    fn path(&self) -> &Path;

    fn page_count(&self) -> usize;

    /// Rasterize the zero-based page `index` to an image at `out`.
    fn render_page(&self, index: usize, out: &Path) -> Result<(), TabscanError>;

    /// Write a new document holding exactly the zero-based pages `start..=end`.
    fn extract_range(&self, out: &Path, start: usize, end: usize) -> Result<(), TabscanError>;
}

/// Check that `path` is an existing file with a `.pdf` extension.
pub fn check_pdf_path(path: &Path) -> Result<(), TabscanError> {
    if !path.is_file() {
        return Err(TabscanError::InvalidDocument {
            path: path.to_path_buf(),
            reason: "file does not exist".into(),
        });
    }

    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(TabscanError::InvalidDocument {
            path: path.to_path_buf(),
            reason: "not a .pdf file".into(),
        });
    }

    Ok(())
}

/// Document backend built on lopdf for structure and pdftoppm (from
/// poppler-utils) for rasterization.
pub struct PopplerSource {
    dpi: u32,
}

impl PopplerSource {
    pub const DEFAULT_DPI: u32 = 300;

    pub fn new(dpi: u32) -> Self {
        PopplerSource { dpi }
    }

    /// Check if pdftoppm is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftoppm")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PopplerSource {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DPI)
    }
}

impl DocumentSource for PopplerSource {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>, TabscanError> {
        check_pdf_path(path)?;

        let doc = lopdf::Document::load(path).map_err(|e| TabscanError::InvalidDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(TabscanError::InvalidDocument {
                path: path.to_path_buf(),
                reason: "document has no pages".into(),
            });
        }

        tracing::debug!(path = %path.display(), page_count, "opened document");

        Ok(Box::new(PopplerDocument {
            path: path.to_path_buf(),
            doc,
            page_count,
            dpi: self.dpi,
        }))
    }

    fn backend_name(&self) -> &str {
        "poppler"
    }
}

struct PopplerDocument {
    path: PathBuf,
    doc: lopdf::Document,
    page_count: usize,
    dpi: u32,
}

impl DocumentHandle for PopplerDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&self, index: usize, out: &Path) -> Result<(), TabscanError> {
        let page = index + 1;
        if index >= self.page_count {
            return Err(TabscanError::Render {
                page,
                reason: format!("document has only {} page(s)", self.page_count),
            });
        }

        // Render into a scratch directory next to the target, then move the
        // finished image into place so a failed render leaves nothing behind.
        let scratch = tempfile::Builder::new()
            .prefix(".tabscan-render")
            .tempdir_in(parent_dir(out))?;
        let prefix = scratch.path().join("page");

        let output = Command::new("pdftoppm")
            .args(pdftoppm_args(&self.path, page, self.dpi, &prefix))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TabscanError::RendererNotFound
                } else {
                    TabscanError::Render {
                        page,
                        reason: format!("pdftoppm failed: {e}"),
                    }
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TabscanError::Render {
                page,
                reason: format!("pdftoppm exited with code {code}: {}", stderr.trim()),
            });
        }

        let produced = prefix.with_extension("png");
        if !produced.is_file() {
            return Err(TabscanError::Render {
                page,
                reason: "pdftoppm produced no image".into(),
            });
        }

        std::fs::rename(&produced, out)?;
        Ok(())
    }

    fn extract_range(&self, out: &Path, start: usize, end: usize) -> Result<(), TabscanError> {
        if start > end || end >= self.page_count {
            return Err(TabscanError::Split {
                path: self.path.clone(),
                reason: format!(
                    "page range [{start}, {end}] is outside [0, {}]",
                    self.page_count - 1
                ),
            });
        }

        let mut sub = self.doc.clone();
        let outside: Vec<u32> = sub
            .get_pages()
            .keys()
            .copied()
            .filter(|&number| {
                let index = number as usize - 1;
                index < start || index > end
            })
            .collect();
        sub.delete_pages(&outside);
        sub.prune_objects();
        sub.save(out).map_err(|e| TabscanError::Split {
            path: self.path.clone(),
            reason: format!("could not save {}: {e}", out.display()),
        })?;

        tracing::debug!(
            source = %self.path.display(),
            out = %out.display(),
            start,
            end,
            "extracted page range"
        );
        Ok(())
    }
}

impl Drop for PopplerDocument {
    fn drop(&mut self) {
        tracing::debug!(path = %self.path.display(), "closed document");
    }
}

/// Arguments for rendering one 1-based page to `<prefix>.png`.
fn pdftoppm_args(pdf: &Path, page: usize, dpi: u32, prefix: &Path) -> Vec<OsString> {
    vec![
        "-f".into(),
        page.to_string().into(),
        "-l".into(),
        page.to_string().into(),
        "-r".into(),
        dpi.to_string().into(),
        "-png".into(),
        "-singlefile".into(),
        pdf.into(),
        prefix.into(),
    ]
}

/// Directory containing `path`, `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
