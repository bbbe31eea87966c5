#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tabscan_core::document::{DocumentHandle, DocumentSource};
use tabscan_core::error::TabscanError;
use tabscan_core::model::OcrConfig;
use tabscan_core::ocr::{OcrEngine, Scanner};

pub type Events = Arc<Mutex<Vec<String>>>;

/// Document source that fakes a PDF of `page_count` pages.
///
/// Rendered "images" are small files naming the global page number, and
/// split sub-documents are files naming their first page and page count,
/// so a mock OCR engine can recover which page it was given.
pub struct MockSource {
    pub page_count: usize,
    /// Extracting a range starting at this page writes a truncated file
    /// and then fails.
    pub truncate_extract_at: Option<usize>,
    pub events: Events,
}

impl MockSource {
    pub fn new(page_count: usize) -> Self {
        MockSource {
            page_count,
            truncate_extract_at: None,
            events: Events::default(),
        }
    }
}

impl DocumentSource for MockSource {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>, TabscanError> {
        let name = file_name(path);
        let (offset, page_count) = match std::fs::read_to_string(path) {
            Ok(content) if content.starts_with("part ") => {
                let mut fields = content[5..].split_whitespace();
                let offset = fields.next().unwrap().parse().unwrap();
                let count = fields.next().unwrap().parse().unwrap();
                (offset, count)
            }
            Ok(_) => (0, self.page_count),
            Err(e) => {
                return Err(TabscanError::InvalidDocument {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };
        self.events.lock().unwrap().push(format!("open {name}"));
        Ok(Box::new(MockDocument {
            path: path.to_path_buf(),
            name,
            offset,
            page_count,
            truncate_extract_at: self.truncate_extract_at,
            events: self.events.clone(),
        }))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct MockDocument {
    path: PathBuf,
    name: String,
    offset: usize,
    page_count: usize,
    truncate_extract_at: Option<usize>,
    events: Events,
}

impl DocumentHandle for MockDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&self, index: usize, out: &Path) -> Result<(), TabscanError> {
        let global = self.offset + index;
        self.events.lock().unwrap().push(format!("render {global}"));
        std::fs::write(out, global.to_string())?;
        Ok(())
    }

    fn extract_range(&self, out: &Path, start: usize, end: usize) -> Result<(), TabscanError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("extract {start}-{end}"));
        if self.truncate_extract_at == Some(start) {
            std::fs::write(out, "%PDF-1.5 truncated")?;
            return Err(TabscanError::Split {
                path: out.to_path_buf(),
                reason: "disk full".into(),
            });
        }
        std::fs::write(out, format!("part {} {}", self.offset + start, end - start + 1))?;
        Ok(())
    }
}

impl Drop for MockDocument {
    fn drop(&mut self) {
        self.events.lock().unwrap().push(format!("close {}", self.name));
    }
}

/// OCR engine that returns `text(page)` for the zero-based global page
/// written into the rendered image, or fails on `fail_on`.
pub struct MockEngine {
    pub text: Arc<dyn Fn(usize) -> String + Send + Sync>,
    pub fail_on: Option<usize>,
    /// Remove each image after reading it, the way a scanner that consumes
    /// its input would.
    pub remove_images: bool,
    pub events: Events,
}

impl MockEngine {
    pub fn new(text: impl Fn(usize) -> String + Send + Sync + 'static) -> Self {
        MockEngine {
            text: Arc::new(text),
            fail_on: None,
            remove_images: false,
            events: Events::default(),
        }
    }
}

impl OcrEngine for MockEngine {
    fn configure(&self, config: &OcrConfig) -> Result<Box<dyn Scanner>, TabscanError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("configure {}", config.language));
        Ok(Box::new(MockScanner {
            text: self.text.clone(),
            fail_on: self.fail_on,
            remove_images: self.remove_images,
            events: self.events.clone(),
        }))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct MockScanner {
    text: Arc<dyn Fn(usize) -> String + Send + Sync>,
    fail_on: Option<usize>,
    remove_images: bool,
    events: Events,
}

impl Scanner for MockScanner {
    fn recognize(&self, image: &Path, page: usize) -> Result<String, TabscanError> {
        let global: usize = std::fs::read_to_string(image)?.trim().parse().unwrap();
        if self.remove_images {
            std::fs::remove_file(image)?;
        }
        self.events
            .lock()
            .unwrap()
            .push(format!("recognize {global}"));
        if self.fail_on == Some(global) {
            return Err(TabscanError::OcrInvocation {
                page,
                reason: "engine crashed".into(),
            });
        }
        Ok((self.text)(global))
    }
}

/// OCR text for a form page: noise, a header, two data lines, and the
/// trailing form feed line tesseract emits.
pub fn form_page(page: usize) -> String {
    format!("Scanned form\n|NAME|  amount.\n{page}-a\n{page}-b\n\x0c")
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn count(events: &Events, prefix: &str) -> usize {
    events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.starts_with(prefix))
        .count()
}

/// Write a real PDF of `page_count` form pages. Each page carries the
/// `Name  Amount` header followed by one data row naming its page.
pub fn write_form_pdf(path: &Path, page_count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for page in 1..=page_count {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 11.into()]),
        ];
        operations.extend(text_at(72, 720, "Name  Amount"));
        operations.extend(text_at(72, 700, &format!("Item{page}  {page}")));
        operations.push(Operation::new("ET", vec![]));

        let stream = Stream::new(dictionary! {}, Content { operations }.encode()?);
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len())?;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! { "Type" => "Pages", "Kids" => kids, "Count" => count }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;
    Ok(())
}

/// Absolute text positioning: `Tm` resets the matrix so each line is
/// placed independently.
fn text_at(x: i64, y: i64, text: &str) -> [Operation; 2] {
    [
        Operation::new("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
    ]
}
