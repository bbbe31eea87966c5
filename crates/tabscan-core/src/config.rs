use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::document::check_pdf_path;
use crate::error::TabscanError;
use crate::model::{ColumnSchema, OcrConfig};

pub const DEFAULT_SPLIT_THRESHOLD: usize = 50;
pub const DEFAULT_DPI: u32 = 300;

/// Run configuration file (TOML).
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub paths: PathsSection,
    pub structure: StructureSection,
    pub other: OtherSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    pub pdf: PathBuf,
    /// Directory holding the OCR model (tessdata).
    pub model: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StructureSection {
    /// Whitespace-separated column names, in table order.
    pub cols: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtherSection {
    pub language: String,
    pub delete_images: bool,
    #[serde(default = "default_true")]
    pub delete_split_docs: bool,
    #[serde(default = "default_split_threshold")]
    pub split_threshold: usize,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

fn default_true() -> bool {
    true
}

fn default_split_threshold() -> usize {
    DEFAULT_SPLIT_THRESHOLD
}

fn default_dpi() -> u32 {
    DEFAULT_DPI
}

/// Configuration after validation, ready to drive a run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub pdf: PathBuf,
    pub output_dir: PathBuf,
    pub schema: ColumnSchema,
    pub ocr: OcrConfig,
    pub split_threshold: NonZeroUsize,
    pub keep_images: bool,
    pub keep_split_docs: bool,
    pub dpi: u32,
}

impl RunConfig {
    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, TabscanError> {
        let content = std::fs::read_to_string(path).map_err(|e| TabscanError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Parse a config from a TOML string; `source` is used in errors.
    pub fn parse(content: &str, source: &Path) -> Result<Self, TabscanError> {
        toml::from_str(content).map_err(|e| TabscanError::Config {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Check every value and every path the run depends on.
    pub fn validate(&self) -> Result<RunSettings, TabscanError> {
        let schema = ColumnSchema::from_whitespace(&self.structure.cols)?;

        let split_threshold = NonZeroUsize::new(self.other.split_threshold).ok_or_else(|| {
            TabscanError::InvalidConfig("split_threshold must be greater than zero".into())
        })?;

        if self.other.language.trim().is_empty() {
            return Err(TabscanError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }

        if self.other.dpi == 0 {
            return Err(TabscanError::InvalidConfig(
                "dpi must be greater than zero".into(),
            ));
        }

        check_pdf_path(&self.paths.pdf)?;

        if !self.paths.model.is_dir() {
            return Err(TabscanError::MissingDependencyPath {
                what: "OCR model directory",
                path: self.paths.model.clone(),
            });
        }

        if !self.paths.output.is_dir() {
            return Err(TabscanError::MissingDependencyPath {
                what: "output directory",
                path: self.paths.output.clone(),
            });
        }

        Ok(RunSettings {
            pdf: self.paths.pdf.clone(),
            output_dir: self.paths.output.clone(),
            schema,
            ocr: OcrConfig {
                language: self.other.language.trim().to_string(),
                model_path: self.paths.model.clone(),
            },
            split_threshold,
            keep_images: !self.other.delete_images,
            keep_split_docs: !self.other.delete_split_docs,
            dpi: self.other.dpi,
        })
    }
}

/// Per-run values that would otherwise be ambient process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub started_at: DateTime<Local>,
    /// Embedded in every artifact name, e.g. `16OCT2026Z101500`.
    pub timestamp: String,
}

impl RunContext {
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    pub fn at(started_at: DateTime<Local>) -> Self {
        let timestamp = started_at.format("%d%b%YZ%H%M%S").to_string().to_uppercase();
        RunContext {
            started_at,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config_toml(pdf: &Path, model: &Path, output: &Path, extra: &str) -> String {
        format!(
            r#"
[paths]
pdf = {pdf:?}
model = {model:?}
output = {output:?}

[structure]
cols = "Name Date Amount"

[other]
language = "eng"
delete_images = true
{extra}
"#,
            pdf = pdf.display().to_string(),
            model = model.display().to_string(),
            output = output.display().to_string(),
        )
    }

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir(dir.path().join("model")).unwrap();
            std::fs::create_dir(dir.path().join("out")).unwrap();
            std::fs::write(dir.path().join("scan.pdf"), b"%PDF-1.5").unwrap();
            Fixture { dir }
        }

        fn toml(&self, extra: &str) -> String {
            config_toml(
                &self.dir.path().join("scan.pdf"),
                &self.dir.path().join("model"),
                &self.dir.path().join("out"),
                extra,
            )
        }
    }

    #[test]
    fn test_parse_and_validate_defaults() {
        let fx = Fixture::new();
        let config = RunConfig::parse(&fx.toml(""), Path::new("run.toml")).unwrap();
        let settings = config.validate().unwrap();

        assert_eq!(settings.schema.names(), &["Name", "Date", "Amount"]);
        assert_eq!(settings.ocr.language, "eng");
        assert_eq!(settings.split_threshold.get(), DEFAULT_SPLIT_THRESHOLD);
        assert_eq!(settings.dpi, DEFAULT_DPI);
        assert!(!settings.keep_images);
        assert!(!settings.keep_split_docs);
    }

    #[test]
    fn test_explicit_options() {
        let fx = Fixture::new();
        let extra = "delete_split_docs = false\nsplit_threshold = 10\ndpi = 200";
        let settings = RunConfig::parse(&fx.toml(extra), Path::new("run.toml"))
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(settings.split_threshold.get(), 10);
        assert_eq!(settings.dpi, 200);
        assert!(settings.keep_split_docs);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let fx = Fixture::new();
        let config = RunConfig::parse(&fx.toml("split_threshold = 0"), Path::new("run.toml")).unwrap();
        assert!(matches!(
            config.validate().unwrap_err(),
            TabscanError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_missing_section_is_config_error() {
        let err = RunConfig::parse("[paths]\npdf = \"a.pdf\"\n", Path::new("run.toml")).unwrap_err();
        assert!(matches!(err, TabscanError::Config { .. }));
    }

    #[test]
    fn test_missing_model_dir() {
        let fx = Fixture::new();
        std::fs::remove_dir(fx.dir.path().join("model")).unwrap();
        let err = RunConfig::parse(&fx.toml(""), Path::new("run.toml"))
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            TabscanError::MissingDependencyPath {
                what: "OCR model directory",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_output_dir() {
        let fx = Fixture::new();
        std::fs::remove_dir(fx.dir.path().join("out")).unwrap();
        let err = RunConfig::parse(&fx.toml(""), Path::new("run.toml"))
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            TabscanError::MissingDependencyPath {
                what: "output directory",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_pdf() {
        let fx = Fixture::new();
        std::fs::remove_file(fx.dir.path().join("scan.pdf")).unwrap();
        let err = RunConfig::parse(&fx.toml(""), Path::new("run.toml"))
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(err, TabscanError::InvalidDocument { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RunConfig::load(Path::new("/no/such/run.toml")).unwrap_err();
        assert!(err.to_string().contains("/no/such/run.toml"));
    }

    #[test]
    fn test_run_context_timestamp() {
        let at = Local.with_ymd_and_hms(2026, 10, 16, 9, 5, 7).unwrap();
        assert_eq!(RunContext::at(at).timestamp, "16OCT2026Z090507");
    }
}
