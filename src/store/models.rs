/// Data models for records, tables and error entries
///
/// A `Record` is the in-memory answer set for one project; a `Table` is the
/// on-disk, string-only projection read back from a delimited file.

use crate::schema::{ERROR_KEY, FIELDS, PROJECT_NAME, SENTINEL, SOURCE_URLS};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Where a record's values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordOrigin {
    /// Parsed from a service answer
    Service,
    /// Built from sentinels after every attempt failed
    Fallback,
}

/// One project's answer set
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
    origin: RecordOrigin,
}

impl Record {
    /// Wrap a normalized service answer
    ///
    /// The caller guarantees every schema field is present.
    pub(crate) fn from_service(fields: Map<String, Value>) -> Self {
        debug_assert!(FIELDS.iter().all(|f| fields.contains_key(*f)));
        Self {
            fields,
            origin: RecordOrigin::Service,
        }
    }

    /// Build a fallback record for a project whose lookup failed outright
    ///
    /// Every field is the sentinel except the project name, an empty URL
    /// list, and the error description.
    pub fn fallback(project_name: &str, error: impl Into<String>) -> Self {
        let mut fields = Map::new();
        for field in FIELDS {
            let value = match field {
                PROJECT_NAME => Value::String(project_name.to_string()),
                SOURCE_URLS => Value::Array(Vec::new()),
                _ => Value::String(SENTINEL.to_string()),
            };
            fields.insert(field.to_string(), value);
        }
        fields.insert(ERROR_KEY.to_string(), Value::String(error.into()));

        Self {
            fields,
            origin: RecordOrigin::Fallback,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == RecordOrigin::Fallback
    }

    pub fn project_name(&self) -> &str {
        self.fields
            .get(PROJECT_NAME)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Error indicator, if the record carries one
    pub fn error(&self) -> Option<String> {
        self.fields.get(ERROR_KEY).map(flatten_value)
    }

    /// Flattened cell text for a column; absent fields read as the sentinel
    pub fn cell(&self, column: &str) -> String {
        self.fields
            .get(column)
            .map(flatten_value)
            .unwrap_or_else(|| SENTINEL.to_string())
    }

    /// Flattened values in schema order
    pub fn to_row(&self) -> Vec<String> {
        FIELDS.iter().map(|field| self.cell(field)).collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Turn a JSON value into scalar cell text
///
/// - Arrays are joined with ", "
/// - Objects become "key: value" pairs joined with ", "
/// - Null becomes an empty cell
pub fn flatten_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(flatten_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, flatten_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Header plus data rows read back from a delimited file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, column name)
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column(column)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One line of the error log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    pub project_name: String,
    pub message: String,
    /// `YYYY-MM-DD HH:MM:SS`, local time
    pub timestamp: String,
}
