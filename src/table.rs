use crate::error::FileParseError;

/// Rows of string cells under ordered column names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, rejecting rows whose width differs from the header.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, FileParseError> {
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns.len())
        {
            return Err(FileParseError::RaggedRow {
                row: row + 1,
                expected: columns.len(),
                found: cells.len(),
            });
        }

        Ok(Self { columns, rows })
    }

    pub fn single_column(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            columns: vec![name.into()],
            rows: values.into_iter().map(|value| vec![value]).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consume the table, keeping only the cells of one column in row order.
    pub fn into_column(self, index: usize) -> Vec<String> {
        self.rows
            .into_iter()
            .map(|mut cells| cells.swap_remove(index))
            .collect()
    }
}
