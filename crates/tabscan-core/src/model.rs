use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::TabscanError;

/// Ordered, duplicate-free column names that define both the header tokens
/// searched for in OCR output and the shape of the resulting table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    names: Vec<String>,
}

impl ColumnSchema {
    pub fn new<I, S>(names: I) -> Result<Self, TabscanError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err(TabscanError::InvalidConfig(
                "at least one column name is required".into(),
            ));
        }

        for (i, name) in names.iter().enumerate() {
            // A name with nothing left after normalization would match every line.
            if !name.chars().any(|c| c.is_ascii_alphanumeric()) {
                return Err(TabscanError::InvalidConfig(format!(
                    "column name '{name}' must contain at least one ASCII letter or digit"
                )));
            }
            if names[..i].contains(name) {
                return Err(TabscanError::InvalidConfig(format!(
                    "duplicate column name '{name}'"
                )));
            }
        }

        Ok(ColumnSchema { names })
    }

    /// Build a schema from a whitespace-separated list, e.g. `"Name Date Amount"`.
    pub fn from_whitespace(list: &str) -> Result<Self, TabscanError> {
        Self::new(list.split_whitespace())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: a schema cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Display for ColumnSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.join(", "))
    }
}

/// Settings handed to the OCR engine when a scanner is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub language: String,
    pub model_path: PathBuf,
}

/// Inclusive, zero-based page range of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPartition {
    pub start: usize,
    pub end: usize,
}

impl DocumentPartition {
    pub fn new(start: usize, end: usize) -> Self {
        DocumentPartition { start, end }
    }

    pub fn page_count(&self) -> usize {
        self.end - self.start + 1
    }
}

impl fmt::Display for DocumentPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Final column-structured result of a run.
///
/// Every row holds exactly one entry per column. `None` marks a cell that
/// received no value because the line count was not a multiple of the
/// column count; it is written as an absent spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ExtractedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    /// Values of one column, top to bottom, including absent cells.
    pub fn column(&self, column: usize) -> Vec<Option<&str>> {
        self.rows
            .iter()
            .map(|row| row.get(column).and_then(|c| c.as_deref()))
            .collect()
    }
}

/// A transient file that could not be removed. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not delete {}: {}", self.path.display(), self.reason)
    }
}

/// Counters gathered while the pipeline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub pages_processed: usize,
    pub partitions: usize,
    pub split_performed: bool,
    pub rows: usize,
    pub columns: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cleanup_warnings: Vec<CleanupWarning>,
}
