/// Delimited text codec
///
/// Quote-aware reader and quoting writer for comma-separated tables.
/// Quoted cells may contain the delimiter, doubled quotes and line breaks.

use std::io::{self, Write};
use std::mem::take;

pub const DELIMITER: char = ',';

/// Parse delimited text into rows of cells
///
/// Blank lines are skipped. An unterminated quote swallows the rest of
/// the input into the last cell rather than failing.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // doubled quote
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == DELIMITER && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                push_row(&mut rows, take(&mut row));
            }
            _ => field.push(ch),
        }
    }

    // Trailing row without a final newline
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, row);
    }

    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    let blank = row.len() == 1 && row[0].is_empty();
    if !blank {
        rows.push(row);
    }
}

fn needs_quotes(cell: &str) -> bool {
    cell.contains(DELIMITER) || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
}

/// Write a single row, quoting cells where needed
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    let mut line = String::new();
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            line.push('"');
            line.push_str(&cell.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(cell);
        }
    }
    line.push('\n');

    // One write per row so an append never leaves half a line behind on success
    w.write_all(line.as_bytes())
}

/// Serialize a header and rows into one string
pub fn rows_to_string<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let mut buf: Vec<u8> = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_row(&mut buf, headers);
    for row in rows {
        let _ = write_row(&mut buf, row);
    }

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
