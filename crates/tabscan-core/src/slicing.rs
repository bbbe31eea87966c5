use crate::model::{ColumnSchema, ExtractedTable};

/// Distribute a flat sequence of values into columns by stride.
///
/// Column `k` receives `lines[k], lines[k + n], lines[k + 2n], ...` where `n`
/// is the column count, so values fill columns round-robin in order of
/// appearance. The row count is the length of the longest column; trailing
/// cells of shorter columns are `None`.
pub fn slice_to_table<S: AsRef<str>>(lines: &[S], schema: &ColumnSchema) -> ExtractedTable {
    let n = schema.len();
    let row_count = lines.len().div_ceil(n);

    let rows = (0..row_count)
        .map(|row| {
            (0..n)
                .map(|column| lines.get(row * n + column).map(|s| s.as_ref().to_string()))
                .collect()
        })
        .collect();

    ExtractedTable {
        columns: schema.names().to_vec(),
        rows,
    }
}
