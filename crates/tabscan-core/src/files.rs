//! Names for the files a run produces, and best-effort removal of the
//! transient ones.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::model::CleanupWarning;

/// Paths of every artifact a run writes into its output directory.
///
/// All names share `<pdf stem>_<run timestamp>` so runs never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    dir: PathBuf,
    base: String,
}

impl ArtifactNames {
    pub fn new(output_dir: &Path, pdf_path: &Path, timestamp: &str) -> Self {
        let stem = pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".into());

        ArtifactNames {
            dir: output_dir.to_path_buf(),
            base: format!("{stem}_{timestamp}"),
        }
    }

    /// Image for a 1-based page. Pages of a split sub-document carry the
    /// 1-based partition number as well.
    pub fn page_image(&self, partition: Option<usize>, page: usize) -> PathBuf {
        let name = match partition {
            Some(part) => format!("{}_p{part}_{page}.png", self.base),
            None => format!("{}_{page}.png", self.base),
        };
        self.dir.join(name)
    }

    /// Sub-document for a 1-based partition number.
    pub fn split_document(&self, partition: usize) -> PathBuf {
        self.dir.join(format!("{}_part{partition}.pdf", self.base))
    }

    pub fn workbook(&self) -> PathBuf {
        self.dir.join(format!("{}.xlsx", self.base))
    }
}

/// Delete a transient file. Failures are reported, never fatal.
pub fn delete_file(path: &Path) -> Result<(), CleanupWarning> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "deleted");
            Ok(())
        }
        Err(e) => {
            let reason = match e.kind() {
                ErrorKind::NotFound => "file does not exist".to_string(),
                ErrorKind::PermissionDenied => "permission denied".to_string(),
                _ => e.to_string(),
            };
            let warning = CleanupWarning {
                path: path.to_path_buf(),
                reason,
            };
            tracing::warn!("{warning}");
            Err(warning)
        }
    }
}
