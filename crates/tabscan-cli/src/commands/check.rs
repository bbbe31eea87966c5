use std::path::Path;

use tabscan_core::config::RunConfig;
use tabscan_core::document::PopplerSource;
use tabscan_core::error::TabscanError;
use tabscan_core::ocr::TesseractEngine;

pub fn run(config_path: &Path) -> Result<(), TabscanError> {
    let settings = RunConfig::load(config_path)?.validate()?;

    println!("Config OK: {}", config_path.display());
    println!("  PDF:        {}", settings.pdf.display());
    println!("  OCR model:  {}", settings.ocr.model_path.display());
    println!("  Language:   {}", settings.ocr.language);
    println!("  Output:     {}", settings.output_dir.display());
    println!("  Columns:    {} ({})", settings.schema, settings.schema.len());
    println!("  Split at:   {} pages", settings.split_threshold);
    println!();

    let renderer = PopplerSource::is_available();
    let ocr = TesseractEngine::is_available();
    println!("  pdftoppm:   {}", if renderer { "found" } else { "missing" });
    println!("  tesseract:  {}", if ocr { "found" } else { "missing" });

    if !renderer {
        return Err(TabscanError::RendererNotFound);
    }
    if !ocr {
        return Err(TabscanError::OcrNotFound);
    }
    Ok(())
}
