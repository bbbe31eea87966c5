use tabscan_core::model::ExtractedTable;
use tabscan_core::ExportResult;

pub fn print_summary(result: &ExportResult) {
    let report = result.report();

    println!("Saved {}", result.output.display());
    println!("  Pages converted:  {}", report.pages_processed);
    if report.split_performed {
        println!("  Partitions:       {}", report.partitions);
    }
    println!("  Columns of data:  {}", report.columns);
    println!("  Rows of data:     {}", report.rows);

    if !report.cleanup_warnings.is_empty() {
        println!();
        for w in &report.cleanup_warnings {
            eprintln!("  warning: {w}");
        }
    }
}

pub fn print_preview(table: &ExtractedTable, max_rows: usize) {
    let shown = table.rows.iter().take(max_rows);

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in table.rows.iter().take(max_rows) {
        for (w, cell) in widths.iter_mut().zip(row) {
            let len = cell.as_deref().map(|c| c.chars().count()).unwrap_or(0);
            *w = (*w).max(len);
        }
    }

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect();
    println!("  {}", header.join("  "));

    for row in shown {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<w$}", cell.as_deref().unwrap_or("")))
            .collect();
        println!("  {}", cells.join("  "));
    }

    if table.row_count() > max_rows {
        println!("  ... {} more row(s)", table.row_count() - max_rows);
    }
    println!();
}
