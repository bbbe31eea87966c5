use std::path::Path;

use tabscan_core::error::TabscanError;
use tabscan_core::model::ExtractedTable;

pub fn write(table: &ExtractedTable, path: &Path) -> Result<(), TabscanError> {
    let json = serde_json::to_string_pretty(table)?;
    std::fs::write(path, json)?;
    Ok(())
}
