pub mod config;
pub mod document;
pub mod error;
pub mod files;
pub mod matching;
pub mod model;
pub mod ocr;
pub mod output;
pub mod page;
pub mod pipeline;
pub mod slicing;
pub mod split;

use std::path::PathBuf;

use config::{RunContext, RunSettings};
use document::DocumentSource;
use error::TabscanError;
use files::ArtifactNames;
use model::PipelineReport;
use ocr::OcrEngine;
use output::{verify_output, SpreadsheetWriter};
use pipeline::{ExtractionPipeline, PipelineOptions, PipelineOutcome};

/// Result of a complete run that produced a spreadsheet.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub output: PathBuf,
    pub outcome: PipelineOutcome,
}

impl ExportResult {
    pub fn report(&self) -> &PipelineReport {
        &self.outcome.report
    }
}

/// Main API entry point: OCR every page of the configured PDF, build the
/// table and write it as a spreadsheet in the output directory.
///
/// The spreadsheet is written only after every page succeeded, and is
/// verified after writing.
pub fn extract_to_spreadsheet(
    settings: &RunSettings,
    context: &RunContext,
    source: &dyn DocumentSource,
    engine: &dyn OcrEngine,
    writer: &dyn SpreadsheetWriter,
) -> Result<ExportResult, TabscanError> {
    let options = PipelineOptions {
        work_dir: settings.output_dir.clone(),
        split_threshold: settings.split_threshold,
        keep_images: settings.keep_images,
        keep_split_docs: settings.keep_split_docs,
    };
    let pipeline = ExtractionPipeline::new(
        source,
        engine,
        settings.schema.clone(),
        settings.ocr.clone(),
        options,
        context.clone(),
    );

    let outcome = pipeline.run(&settings.pdf)?;

    let output = ArtifactNames::new(&settings.output_dir, &settings.pdf, &context.timestamp)
        .workbook()
        .with_extension(writer.extension());
    writer.write(&outcome.table, &output)?;
    verify_output(&output, writer.extension())?;

    tracing::info!(output = %output.display(), "saved spreadsheet");

    Ok(ExportResult { output, outcome })
}
