//! Header detection in noisy OCR output.
//!
//! OCR frequently mangles header rows with stray punctuation and odd casing,
//! so both sides are reduced to lowercase ASCII letters and digits before a
//! substring test.

use crate::model::ColumnSchema;

/// Reduce text to its lowercase ASCII alphanumeric characters.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// True if `known_name` appears in `candidate_line` after normalization.
pub fn matches(candidate_line: &str, known_name: &str) -> bool {
    normalize(candidate_line).contains(&normalize(known_name))
}

/// True if the line contains at least one of the schema's column names.
pub fn is_header_line(line: &str, schema: &ColumnSchema) -> bool {
    let normalized = normalize(line);
    schema
        .names()
        .iter()
        .any(|name| normalized.contains(&normalize(name)))
}

/// Index of the last header line, i.e. the line after which data begins.
///
/// Repeated or multi-row headers are common, so the highest matching index
/// wins. Returns `None` when no line mentions any column name.
pub fn find_header_boundary<S: AsRef<str>>(lines: &[S], schema: &ColumnSchema) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_header_line(line.as_ref(), schema))
        .map(|(i, _)| i)
        .max()
}
