use crate::error::FileParseError;
use crate::table::Table;

/// Column name given to newline-delimited text uploads.
pub const TEXT_COLUMN: &str = "text";

/// Parse an uploaded file into a table, branching on its extension.
///
/// `.csv` files keep their header row as column names. Anything else is read
/// as UTF-8 text with one row per line.
#[tracing::instrument(skip(bytes), fields(size = bytes.len()))]
pub fn read_upload(file_name: &str, bytes: &[u8]) -> Result<Table, FileParseError> {
    let table = if is_csv(file_name) {
        read_csv(bytes)?
    } else {
        read_lines(bytes)?
    };

    tracing::debug!(
        rows = table.len(),
        columns = table.columns().len(),
        "Upload parsed"
    );
    Ok(table)
}

fn is_csv(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn read_csv(bytes: &[u8]) -> Result<Table, FileParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() {
        return Err(FileParseError::NoColumns);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    Table::from_rows(columns, rows)
}

fn read_lines(bytes: &[u8]) -> Result<Table, FileParseError> {
    let content = std::str::from_utf8(bytes)?;

    let mut lines: Vec<String> = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();

    // A terminating newline does not start another row.
    if lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }

    Ok(Table::single_column(TEXT_COLUMN, lines))
}
