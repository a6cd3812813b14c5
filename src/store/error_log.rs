/// Error log
///
/// Append-only delimited file of (project name, message, timestamp) entries,
/// written whenever a project could not be fully answered.

use crate::error::Result;
use crate::store::codec::{self, parse_rows};
use crate::store::models::ErrorEntry;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ERROR_LOG_HEADERS: [&str; 3] = ["Project Name", "Error Message", "Timestamp"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Handle to an error log on disk
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry stamped with the current local time
    ///
    /// Creates the log with its header if it does not exist yet.
    pub fn append_error(&self, project_name: &str, message: &str) -> Result<ErrorEntry> {
        let entry = ErrorEntry {
            project_name: project_name.to_string(),
            message: message.to_string(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let needs_header = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if needs_header {
            codec::write_row(&mut file, &ERROR_LOG_HEADERS)?;
        }
        codec::write_row(
            &mut file,
            &[&entry.project_name, &entry.message, &entry.timestamp],
        )?;

        debug!(project = project_name, path = %self.path.display(), "Logged error");
        Ok(entry)
    }

    /// Read all entries; an absent log reads as empty
    pub fn read(&self) -> Result<Vec<ErrorEntry>> {
        if !self.path.is_file() {
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&self.path)?;
        let entries = parse_rows(&text)
            .into_iter()
            .skip(1)
            .map(|mut row| {
                row.resize(3, String::new());
                let mut cells = row.into_iter();
                ErrorEntry {
                    project_name: cells.next().unwrap_or_default(),
                    message: cells.next().unwrap_or_default(),
                    timestamp: cells.next().unwrap_or_default(),
                }
            })
            .collect();

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    #[test]
    fn test_append_creates_log_with_header() {
        let temp = TempDir::new().unwrap();
        let log = ErrorLog::new(temp.path().join("output").join("error_log.csv"));

        let entry = log.append_error("Lake Vista", "Transport error: timed out").unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        let rows = parse_rows(&text);
        assert_eq!(rows[0], ERROR_LOG_HEADERS.to_vec());
        assert_eq!(rows.len(), 2);
        assert!(NaiveDateTime::parse_from_str(&entry.timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_append_keeps_single_header() {
        let temp = TempDir::new().unwrap();
        let log = ErrorLog::new(temp.path().join("error_log.csv"));

        log.append_error("A", "first").unwrap();
        log.append_error("B", "second, with comma").unwrap();
        log.append_error("A", "third").unwrap();

        let entries = log.read().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].project_name, "B");
        assert_eq!(entries[1].message, "second, with comma");
        assert_eq!(entries[2].project_name, "A");
    }

    #[test]
    fn test_read_missing_log() {
        let temp = TempDir::new().unwrap();
        let log = ErrorLog::new(temp.path().join("nope.csv"));
        assert!(log.read().unwrap().is_empty());
    }
}
