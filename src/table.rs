//! In-memory representation of a raw input table.
//!
//! All four extracts are held as string cells until the cleaning pass runs;
//! header normalization and joining operate at this level so that columns
//! missing from a given extract simply stay absent instead of raising.

/// A named table of string cells with a single header row.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn with_headers(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Strips surrounding whitespace from every header. Row values are never
    /// touched here.
    pub fn trim_headers(&mut self) {
        for header in &mut self.headers {
            let trimmed = header.trim();
            if trimmed.len() != header.len() {
                *header = trimmed.to_string();
            }
        }
    }

    /// Renames a column if present. Absent columns are ignored so every
    /// extract can be pushed through the same normalization.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(idx) = self.column_index(from) {
            self.headers[idx] = to.to_string();
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (row, column name). Short rows yield an empty cell rather
    /// than a panic; delimited extracts are not always rectangular.
    pub fn cell<'a>(&'a self, row: &'a [String], name: &str) -> &'a str {
        self.column_index(name)
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn column_values(&self, name: &str) -> Vec<&str> {
        match self.column_index(name) {
            Some(idx) => self
                .rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Appends a new (empty-valued) column and returns its index.
    pub fn add_column(&mut self, name: impl Into<String>) -> usize {
        self.headers.push(name.into());
        let idx = self.headers.len() - 1;
        for row in &mut self.rows {
            row.resize(idx + 1, String::new());
        }
        idx
    }
}

/// Applies the shared header convention to a set of raw extracts: trimmed
/// headers everywhere, and the generic `ID` column unified to the canonical
/// company-identifier name.
pub fn normalize_headers(tables: &mut [&mut RawTable]) {
    for table in tables.iter_mut() {
        table.trim_headers();
        table.rename_column(crate::schema::GENERIC_ID, crate::schema::COL_ID_EMPRESA);
    }
}
