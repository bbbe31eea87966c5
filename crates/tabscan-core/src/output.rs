//! Spreadsheet export.
//!
//! The workbook is a minimal Office Open XML package with one sheet. Its
//! layout follows a dataframe export: an empty corner cell and the column
//! names on the first row, then one row per record led by its 0-based index.

use std::io::{self, Write};
use std::path::Path;

use calamine::{Reader, Xlsx};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::document::parent_dir;
use crate::error::TabscanError;
use crate::model::ExtractedTable;

pub const SHEET_NAME: &str = "Sheet1";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Trait for spreadsheet serializers.
pub trait SpreadsheetWriter {
    fn write(&self, table: &ExtractedTable, path: &Path) -> Result<(), TabscanError>;

    /// File extension produced by this writer, without the dot.
    fn extension(&self) -> &str;
}

/// Writes `.xlsx` workbooks.
pub struct XlsxWriter;

impl XlsxWriter {
    pub fn new() -> Self {
        XlsxWriter
    }
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SpreadsheetWriter for XlsxWriter {
    fn write(&self, table: &ExtractedTable, path: &Path) -> Result<(), TabscanError> {
        let write_error = |reason: String| TabscanError::Write {
            path: path.to_path_buf(),
            reason,
        };

        let sheet = sheet_xml(table).map_err(|e| write_error(e.to_string()))?;

        // Stage the package next to the target and move it into place only
        // once complete, so a failed write never leaves a partial workbook.
        let staged = tempfile::NamedTempFile::new_in(parent_dir(path))?;

        let mut zip = ZipWriter::new(staged.as_file());
        let parts: [(&str, &[u8]); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", ROOT_RELS.as_bytes()),
            ("xl/workbook.xml", WORKBOOK.as_bytes()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
            ("xl/worksheets/sheet1.xml", sheet.as_slice()),
        ];
        for (name, bytes) in parts {
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            zip.start_file(name, options)
                .map_err(|e| write_error(e.to_string()))?;
            zip.write_all(bytes)?;
        }
        zip.finish().map_err(|e| write_error(e.to_string()))?;

        staged
            .persist(path)
            .map_err(|e| write_error(e.error.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "wrote workbook"
        );
        Ok(())
    }

    fn extension(&self) -> &str {
        "xlsx"
    }
}

fn xml_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

/// Serialize the worksheet part.
fn sheet_xml(table: &ExtractedTable) -> io::Result<Vec<u8>> {
    let mut w = Writer::new(Vec::new());

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_error)?;
    w.write_event(Event::Start(
        BytesStart::new("worksheet").with_attributes([("xmlns", SPREADSHEET_NS)]),
    ))
    .map_err(xml_error)?;
    w.write_event(Event::Start(BytesStart::new("sheetData")))
        .map_err(xml_error)?;

    // Header row: corner cell left empty, names from column B onwards.
    start_row(&mut w, 1)?;
    for (i, name) in table.columns.iter().enumerate() {
        string_cell(&mut w, &cell_ref(i + 1, 1), name)?;
    }
    end(&mut w, "row")?;

    for (i, row) in table.rows.iter().enumerate() {
        let r = i + 2;
        start_row(&mut w, r)?;
        number_cell(&mut w, &cell_ref(0, r), i)?;
        for (c, cell) in row.iter().enumerate() {
            if let Some(text) = cell {
                string_cell(&mut w, &cell_ref(c + 1, r), text)?;
            }
        }
        end(&mut w, "row")?;
    }

    end(&mut w, "sheetData")?;
    end(&mut w, "worksheet")?;
    Ok(w.into_inner())
}

fn start_row(w: &mut Writer<Vec<u8>>, r: usize) -> io::Result<()> {
    let r = r.to_string();
    w.write_event(Event::Start(
        BytesStart::new("row").with_attributes([("r", r.as_str())]),
    ))
    .map_err(xml_error)
}

fn end(w: &mut Writer<Vec<u8>>, name: &str) -> io::Result<()> {
    w.write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)
}

fn string_cell(w: &mut Writer<Vec<u8>>, reference: &str, text: &str) -> io::Result<()> {
    w.write_event(Event::Start(
        BytesStart::new("c").with_attributes([("r", reference), ("t", "inlineStr")]),
    ))
    .map_err(xml_error)?;
    w.write_event(Event::Start(BytesStart::new("is")))
        .map_err(xml_error)?;
    w.write_event(Event::Start(
        BytesStart::new("t").with_attributes([("xml:space", "preserve")]),
    ))
    .map_err(xml_error)?;
    w.write_event(Event::Text(BytesText::new(&sanitize(text))))
        .map_err(xml_error)?;
    end(w, "t")?;
    end(w, "is")?;
    end(w, "c")
}

fn number_cell(w: &mut Writer<Vec<u8>>, reference: &str, value: usize) -> io::Result<()> {
    w.write_event(Event::Start(
        BytesStart::new("c").with_attributes([("r", reference)]),
    ))
    .map_err(xml_error)?;
    w.write_event(Event::Start(BytesStart::new("v")))
        .map_err(xml_error)?;
    w.write_event(Event::Text(BytesText::new(&value.to_string())))
        .map_err(xml_error)?;
    end(w, "v")?;
    end(w, "c")
}

/// Drop control characters XML 1.0 cannot carry (OCR emits form feeds).
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|&c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// A1-style reference for a 0-based column and 1-based row.
fn cell_ref(column: usize, row: usize) -> String {
    let mut letters = Vec::new();
    let mut n = column + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("{}{row}", String::from_utf8_lossy(&letters))
}

/// Confirm the written file exists, has the expected extension and opens as
/// a workbook.
pub fn verify_output(path: &Path, extension: &str) -> Result<(), TabscanError> {
    let verification_error = |reason: String| TabscanError::OutputVerification {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(verification_error("file was not created".into()));
    }

    let has_extension = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false);
    if !has_extension {
        return Err(verification_error(format!("expected a .{extension} file")));
    }

    let mut workbook: Xlsx<_> = calamine::open_workbook(path)
        .map_err(|e| verification_error(format!("not a readable workbook: {e}")))?;
    workbook
        .worksheet_range(SHEET_NAME)
        .map_err(|e| verification_error(format!("sheet '{SHEET_NAME}' unreadable: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    fn sample_table() -> ExtractedTable {
        ExtractedTable {
            columns: vec!["Name".into(), "Qty".into(), "Note".into()],
            rows: vec![
                vec![Some("Pen".into()), Some("3".into()), Some(" a & b ".into())],
                vec![Some("Book".into()), None, None],
            ],
        }
    }

    fn read_back(path: &Path) -> calamine::Range<Data> {
        let mut workbook: Xlsx<_> = calamine::open_workbook(path).unwrap();
        workbook.worksheet_range(SHEET_NAME).unwrap()
    }

    fn text(range: &calamine::Range<Data>, row: u32, col: u32) -> Option<String> {
        match range.get_value((row, col))? {
            Data::String(s) => Some(s.clone()),
            Data::Empty => None,
            other => Some(other.to_string()),
        }
    }

    #[test]
    fn test_cell_ref() {
        assert_eq!(cell_ref(0, 1), "A1");
        assert_eq!(cell_ref(25, 3), "Z3");
        assert_eq!(cell_ref(26, 3), "AA3");
        assert_eq!(cell_ref(701, 9), "ZZ9");
        assert_eq!(cell_ref(702, 9), "AAA9");
    }

    #[test]
    fn test_sanitize_drops_form_feed() {
        assert_eq!(sanitize("a\x0cb\tc"), "ab\tc");
    }

    #[test]
    fn test_written_workbook_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        XlsxWriter::new().write(&sample_table(), &path).unwrap();

        let range = read_back(&path);
        assert_eq!(text(&range, 0, 0), None);
        assert_eq!(text(&range, 0, 1).as_deref(), Some("Name"));
        assert_eq!(text(&range, 0, 3).as_deref(), Some("Note"));
        assert_eq!(text(&range, 1, 1).as_deref(), Some("Pen"));
        assert_eq!(text(&range, 1, 3).as_deref(), Some(" a & b "));
        assert_eq!(text(&range, 2, 0).as_deref(), Some("1"));
        assert_eq!(text(&range, 2, 1).as_deref(), Some("Book"));
        assert_eq!(text(&range, 2, 2), None);
        assert_eq!(text(&range, 2, 3), None);
    }

    #[test]
    fn test_verify_written_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        XlsxWriter::new().write(&sample_table(), &path).unwrap();
        assert!(verify_output(&path, "xlsx").is_ok());
    }

    #[test]
    fn test_verify_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_output(&dir.path().join("none.xlsx"), "xlsx").unwrap_err();
        assert!(matches!(err, TabscanError::OutputVerification { .. }));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xlsx");
        std::fs::write(&path, b"Not a ZIP file").unwrap();
        assert!(verify_output(&path, "xlsx").is_err());
    }
}
