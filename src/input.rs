/// Name list helpers for the front-end
///
/// Turns typed text and imported files into clean name lists. Dedup lives
/// here, before the orchestrator; the orchestrator itself keeps duplicates.

use crate::error::{Result, ScoutError};
use crate::schema::PROJECT_NAME;
use crate::store::codec::parse_rows;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One name per line; trimmed, blanks dropped
pub fn parse_name_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drop repeats, keeping the first occurrence of each name
pub fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Read the `Project Name` column of a delimited file
///
/// Values are trimmed and blanks dropped. Duplicates are kept; callers
/// decide whether to dedup.
pub fn read_names_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let text = fs::read_to_string(path.as_ref())?;
    names_from_csv_text(&text)
}

pub fn names_from_csv_text(text: &str) -> Result<Vec<String>> {
    let mut rows = parse_rows(text).into_iter();
    let header = rows.next().unwrap_or_default();

    let col = header
        .iter()
        .position(|h| h.trim() == PROJECT_NAME)
        .ok_or_else(|| ScoutError::MissingColumn(PROJECT_NAME.to_string()))?;

    let names = rows
        .filter_map(|row| row.get(col).map(|cell| cell.trim().to_string()))
        .filter(|name| !name.is_empty())
        .collect();

    Ok(names)
}

/// Read a text file with one name per line
pub fn read_name_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let text = fs::read_to_string(path.as_ref())?;
    Ok(parse_name_lines(&text))
}
