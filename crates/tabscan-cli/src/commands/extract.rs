use std::path::{Path, PathBuf};

use tabscan_core::config::{RunConfig, RunContext};
use tabscan_core::document::PopplerSource;
use tabscan_core::error::TabscanError;
use tabscan_core::ocr::TesseractEngine;
use tabscan_core::output::XlsxWriter;

use crate::output;

pub fn run(
    config_path: &Path,
    pdf: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    json: Option<PathBuf>,
    preview: Option<usize>,
) -> Result<(), TabscanError> {
    let mut config = RunConfig::load(config_path)?;
    if let Some(pdf) = pdf {
        config.paths.pdf = pdf;
    }
    if let Some(dir) = output_dir {
        config.paths.output = dir;
    }

    let settings = config.validate()?;
    let context = RunContext::now();

    tracing::info!(
        config = %config_path.display(),
        pdf = %settings.pdf.display(),
        model = %settings.ocr.model_path.display(),
        language = %settings.ocr.language,
        output = %settings.output_dir.display(),
        columns = %settings.schema,
        split_threshold = settings.split_threshold.get(),
        keep_images = settings.keep_images,
        keep_split_docs = settings.keep_split_docs,
        started = %context.started_at.format("%Y-%m-%d %H:%M:%S %Z"),
        "configuration loaded"
    );

    let source = PopplerSource::new(settings.dpi);
    let engine = TesseractEngine::new();
    let writer = XlsxWriter::new();

    let result =
        tabscan_core::extract_to_spreadsheet(&settings, &context, &source, &engine, &writer)?;

    if let Some(path) = json {
        output::json::write(&result.outcome.table, &path)?;
        eprintln!("Table written to {}", path.display());
    }

    if let Some(rows) = preview {
        output::table::print_preview(&result.outcome.table, rows);
    }

    output::table::print_summary(&result);
    Ok(())
}
