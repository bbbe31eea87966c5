use std::path::Path;

use crate::document::DocumentHandle;
use crate::error::TabscanError;
use crate::files::delete_file;
use crate::matching::find_header_boundary;
use crate::model::{CleanupWarning, ColumnSchema};
use crate::ocr::Scanner;

/// Data lines recovered from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLines {
    pub lines: Vec<String>,
    pub cleanup: Option<CleanupWarning>,
}

/// Render, recognize and clean one page at a time.
pub struct PageExtractor<'a> {
    scanner: &'a dyn Scanner,
    schema: &'a ColumnSchema,
    keep_images: bool,
}

impl<'a> PageExtractor<'a> {
    pub fn new(scanner: &'a dyn Scanner, schema: &'a ColumnSchema, keep_images: bool) -> Self {
        PageExtractor {
            scanner,
            schema,
            keep_images,
        }
    }

    /// Extract the data lines of zero-based page `index` of `document`.
    ///
    /// `page_number` is the 1-based page number in the source document and
    /// is only used to identify the page in errors and logs. The rendered
    /// image is written to `image` and removed afterwards unless images are
    /// kept.
    pub fn extract(
        &self,
        document: &dyn DocumentHandle,
        index: usize,
        page_number: usize,
        image: &Path,
    ) -> Result<PageLines, TabscanError> {
        tracing::debug!(page = page_number, image = %image.display(), "rendering page");
        document.render_page(index, image)?;

        tracing::debug!(page = page_number, "recognizing text");
        let recognized = self.scanner.recognize(image, page_number);

        let cleanup = if self.keep_images {
            None
        } else {
            delete_file(image).err()
        };

        let text = recognized?;
        let lines = split_lines(&text);

        let boundary =
            find_header_boundary(&lines, self.schema).ok_or_else(|| TabscanError::NoHeaderFound {
                page: page_number,
                path: document.path().to_path_buf(),
            })?;

        let data = strip_trailer(strip_header(&lines, boundary)).to_vec();
        tracing::debug!(
            page = page_number,
            recognized = lines.len(),
            header = boundary,
            data = data.len(),
            "page cleaned"
        );

        Ok(PageLines {
            lines: data,
            cleanup,
        })
    }
}

/// Split recognized text on `'\n'` exactly, keeping empty and untrimmed lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Lines strictly after the header boundary.
pub fn strip_header(lines: &[String], boundary: usize) -> &[String] {
    lines.get(boundary + 1..).unwrap_or(&[])
}

/// Drop the final line, which the OCR engine reserves for its trailer
/// (a status message or page terminator), even when it is empty.
pub fn strip_trailer(lines: &[String]) -> &[String] {
    match lines.split_last() {
        Some((_, rest)) => rest,
        None => lines,
    }
}
