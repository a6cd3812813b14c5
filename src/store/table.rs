/// Results table
///
/// Append-only delimited file, one row per processed project. The header
/// always contains every schema field; missing columns are added on the
/// next write and never removed.

use crate::error::Result;
use crate::schema::{is_field, FIELDS, SENTINEL};
use crate::store::codec::{self, parse_rows, rows_to_string};
use crate::store::models::{Record, Table};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Handle to a results table on disk
#[derive(Debug, Clone)]
pub struct ResultTable {
    path: PathBuf,
}

impl ResultTable {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the table or repair its header
    ///
    /// A missing (or empty) file gets a fresh header. An existing file that
    /// lacks schema columns gets them appended, with every prior row filled
    /// with the sentinel, and is rewritten in full. Returns the header in
    /// effect afterwards. Calling it again with nothing missing touches
    /// nothing.
    pub fn ensure_schema(&self) -> Result<Vec<String>> {
        let existing = self.load()?;

        let Some(mut table) = existing else {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let headers: Vec<String> = FIELDS.iter().map(|f| f.to_string()).collect();
            fs::write(&self.path, rows_to_string(&headers, &[]))?;
            debug!(path = %self.path.display(), "Created results table");
            return Ok(headers);
        };

        let missing: Vec<&str> = FIELDS
            .iter()
            .copied()
            .filter(|f| table.column(f).is_none())
            .collect();

        if missing.is_empty() {
            return Ok(table.headers);
        }

        let width = table.headers.len();
        for row in &mut table.rows {
            if row.len() < width {
                row.resize(width, String::new());
            }
            row.extend(missing.iter().map(|_| SENTINEL.to_string()));
        }
        table.headers.extend(missing.iter().map(|m| m.to_string()));

        self.replace_contents(&rows_to_string(&table.headers, &table.rows))?;
        info!(
            path = %self.path.display(),
            added = ?missing,
            rows = table.rows.len(),
            "Added missing columns to results table"
        );

        Ok(table.headers)
    }

    /// Append one record as a row
    ///
    /// Repairs the header first, then writes the flattened record aligned
    /// to it. Columns outside the schema get an empty cell. Prior rows are
    /// never rewritten here.
    pub fn append(&self, record: &Record) -> Result<()> {
        let headers = self.ensure_schema()?;

        let row: Vec<String> = headers
            .iter()
            .map(|column| {
                if is_field(column) {
                    record.cell(column)
                } else {
                    String::new()
                }
            })
            .collect();

        let file = OpenOptions::new().append(true).open(&self.path)?;
        codec::write_row(file, &row)?;

        debug!(project = record.project_name(), path = %self.path.display(), "Appended row");
        Ok(())
    }

    /// Read the whole table; an absent file reads as empty
    pub fn read(&self) -> Result<Table> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Swap in new file contents via a sibling temp file and a rename,
    /// so a failed write leaves the old table intact
    fn replace_contents(&self, contents: &str) -> Result<()> {
        let tmp_path = self.path.with_extension("csv.tmp");
        if let Err(err) = fs::write(&tmp_path, contents) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<Table>> {
        if !self.path.is_file() {
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path)?;
        let mut rows = parse_rows(&text);
        if rows.is_empty() {
            return Ok(None);
        }

        let headers = rows.remove(0);
        Ok(Some(Table { headers, rows }))
    }
}
