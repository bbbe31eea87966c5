use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::config::RunContext;
use crate::document::{DocumentHandle, DocumentSource};
use crate::error::TabscanError;
use crate::files::{delete_file, ArtifactNames};
use crate::model::{ColumnSchema, ExtractedTable, OcrConfig, PipelineReport};
use crate::ocr::OcrEngine;
use crate::page::PageExtractor;
use crate::slicing::slice_to_table;
use crate::split::{materialize_partition, plan_partitions};

/// Knobs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory receiving rendered page images and split sub-documents.
    pub work_dir: PathBuf,
    pub split_threshold: NonZeroUsize,
    pub keep_images: bool,
    pub keep_split_docs: bool,
}

/// The table produced by a run and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub table: ExtractedTable,
    pub report: PipelineReport,
}

/// Drives splitting, page extraction and slicing over a whole document.
///
/// Pages are processed strictly in order and all data lines are collected
/// before the table is built, so a failure on any page yields no table.
pub struct ExtractionPipeline<'a> {
    source: &'a dyn DocumentSource,
    engine: &'a dyn OcrEngine,
    schema: ColumnSchema,
    ocr: OcrConfig,
    options: PipelineOptions,
    context: RunContext,
}

impl<'a> ExtractionPipeline<'a> {
    pub fn new(
        source: &'a dyn DocumentSource,
        engine: &'a dyn OcrEngine,
        schema: ColumnSchema,
        ocr: OcrConfig,
        options: PipelineOptions,
        context: RunContext,
    ) -> Self {
        ExtractionPipeline {
            source,
            engine,
            schema,
            ocr,
            options,
            context,
        }
    }

    pub fn run(&self, pdf: &Path) -> Result<PipelineOutcome, TabscanError> {
        let document = self.source.open(pdf)?;
        let page_count = document.page_count();
        let plan = plan_partitions(page_count, self.options.split_threshold);
        let names = ArtifactNames::new(&self.options.work_dir, pdf, &self.context.timestamp);

        tracing::info!(
            pdf = %pdf.display(),
            pages = page_count,
            partitions = plan.partitions.len(),
            split = plan.split,
            columns = %self.schema,
            backend = self.source.backend_name(),
            ocr = self.engine.backend_name(),
            "starting extraction"
        );

        let scanner = self.engine.configure(&self.ocr)?;
        let extractor = PageExtractor::new(scanner.as_ref(), &self.schema, self.options.keep_images);

        let mut buffer: Vec<String> = Vec::new();
        let mut report = PipelineReport {
            partitions: plan.partitions.len(),
            split_performed: plan.split,
            ..Default::default()
        };

        if plan.split {
            for (i, partition) in plan.partitions.iter().enumerate() {
                let part = i + 1;
                let sub_path = names.split_document(part);

                // The sub-document handle is dropped (closed) before any
                // attempt to delete its file. A failed extraction may leave a
                // partial file behind, so it goes through the same cleanup.
                let processed = materialize_partition(document.as_ref(), *partition, &sub_path)
                    .and_then(|()| self.source.open(&sub_path))
                    .and_then(|sub| {
                        if sub.page_count() != partition.page_count() {
                            return Err(TabscanError::Split {
                                path: sub_path.clone(),
                                reason: format!(
                                    "expected {} page(s), found {}",
                                    partition.page_count(),
                                    sub.page_count()
                                ),
                            });
                        }
                        self.process_document(
                            sub.as_ref(),
                            Some(part),
                            partition.start,
                            &extractor,
                            &names,
                            &mut buffer,
                            &mut report,
                        )
                    });

                if !self.options.keep_split_docs {
                    if let Err(warning) = delete_file(&sub_path) {
                        report.cleanup_warnings.push(warning);
                    }
                }
                processed?;
            }
        } else {
            self.process_document(
                document.as_ref(),
                None,
                0,
                &extractor,
                &names,
                &mut buffer,
                &mut report,
            )?;
        }

        let table = slice_to_table(&buffer, &self.schema);
        report.rows = table.row_count();
        report.columns = table.column_count();

        tracing::info!(
            pages = report.pages_processed,
            lines = buffer.len(),
            rows = report.rows,
            columns = report.columns,
            "extraction finished"
        );

        Ok(PipelineOutcome { table, report })
    }

    /// Run every page of `document` through the extractor, appending its
    /// data lines to `buffer` in page order.
    #[allow(clippy::too_many_arguments)]
    fn process_document(
        &self,
        document: &dyn DocumentHandle,
        partition: Option<usize>,
        first_page: usize,
        extractor: &PageExtractor<'_>,
        names: &ArtifactNames,
        buffer: &mut Vec<String>,
        report: &mut PipelineReport,
    ) -> Result<(), TabscanError> {
        for index in 0..document.page_count() {
            let page_number = first_page + index + 1;
            let image = names.page_image(partition, index + 1);

            let page = extractor.extract(document, index, page_number, &image)?;
            tracing::info!(page = page_number, lines = page.lines.len(), "page extracted");

            buffer.extend(page.lines);
            report.pages_processed += 1;
            if let Some(warning) = page.cleanup {
                report.cleanup_warnings.push(warning);
            }
        }
        Ok(())
    }
}
