// Turns the service's free-form answer into a complete record
//
// Strict parse first, then one regex repair pass for near-JSON, then give up.

use crate::error::{Result, ScoutError};
use crate::schema::{FIELDS, PROJECT_NAME, SENTINEL};
use crate::store::Record;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

// A bare word key right after `{` or `,`; `\w` is Unicode-aware, so `2BHK` qualifies
const BARE_KEY_PATTERN: &str = r"([{,])\s*(\w+)\s*:";

pub struct Normalizer {
    bare_key: Option<Regex>,
}

impl Normalizer {
    pub fn new() -> Self {
        // Compile once; a pattern that fails to build just disables key quoting
        Self {
            bare_key: Regex::new(BARE_KEY_PATTERN).ok(),
        }
    }

    /// Parse `raw` into a record labelled with `original_name`
    ///
    /// Fields the service left out are filled with the sentinel. Extra keys
    /// (an error indicator, say) are kept as they came.
    pub fn normalize(&self, raw: &str, original_name: &str) -> Result<Record> {
        let text = strip_code_fence(raw);
        let mut object = self.parse_object(text)?;

        // Never trust the service with the name; downstream joins rely on the input
        object.insert(
            PROJECT_NAME.to_string(),
            Value::String(original_name.to_string()),
        );

        for field in FIELDS {
            object
                .entry(field)
                .or_insert_with(|| Value::String(SENTINEL.to_string()));
        }

        Ok(Record::from_service(object))
    }

    fn parse_object(&self, text: &str) -> Result<Map<String, Value>> {
        let value = match serde_json::from_str::<Value>(text) {
            Ok(value) => value,
            Err(strict_err) => {
                debug!(error = %strict_err, "Strict parse failed, trying repair");
                let repaired = self.repair(text);
                serde_json::from_str::<Value>(&repaired).map_err(|e| {
                    ScoutError::MalformedResponse(format!("{} (after repair: {})", strict_err, e))
                })?
            }
        };

        match value {
            Value::Object(map) => Ok(map),
            other => Err(ScoutError::MalformedResponse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Best-effort fix for near-JSON: quote bare keys, swap single quotes
    pub fn repair(&self, text: &str) -> String {
        let quoted = match &self.bare_key {
            Some(regex) => regex.replace_all(text, r#"$1"$2":"#).into_owned(),
            None => text.to_string(),
        };
        quoted.replace('\'', "\"")
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove surrounding ``` fences, with or without a language tag
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let inner = inner.trim_end_matches('`');
    // Drop a language tag such as `json` on the opening line
    let inner = match inner.find('\n') {
        Some(pos) if !inner[..pos].trim_start().starts_with(['{', '[']) => &inner[pos + 1..],
        _ => inner,
    };

    inner.trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ERROR_KEY, SOURCE_URLS};
    use serde_json::json;

    fn normalize(raw: &str, name: &str) -> Result<Record> {
        Normalizer::new().normalize(raw, name)
    }

    #[test]
    fn test_partial_answer_is_completed() {
        let record = normalize(
            r#"{"Project Name": "X", "Location": "Hyderabad"}"#,
            "Green Meadows",
        )
        .unwrap();

        assert_eq!(record.project_name(), "Green Meadows");
        assert_eq!(record.get("Location"), Some(&json!("Hyderabad")));
        assert!(record.error().is_none());
        assert!(!record.is_fallback());

        let sentinels = FIELDS
            .iter()
            .filter(|f| record.get(f) == Some(&json!(SENTINEL)))
            .count();
        assert_eq!(sentinels, 13);
        assert_eq!(record.fields().len(), FIELDS.len());
    }

    #[test]
    fn test_extra_keys_are_forwarded() {
        let record = normalize(
            r#"{"Location": "Kokapet", "error": "rate limited upstream"}"#,
            "Sky Towers",
        )
        .unwrap();

        assert_eq!(record.error().as_deref(), Some("rate limited upstream"));
        assert_eq!(record.fields().len(), FIELDS.len() + 1);
        assert!(record.get(ERROR_KEY).is_some());
    }

    #[test]
    fn test_code_fences_are_stripped() {
        let raw = "```json\n{\"Source URLs\": [\"a.com\", \"b.com\"]}\n```";
        let record = normalize(raw, "Fenced").unwrap();
        assert_eq!(record.cell(SOURCE_URLS), "a.com, b.com");

        let raw = "```{\"Why\": \"Good value\"}```";
        let record = normalize(raw, "Inline").unwrap();
        assert_eq!(record.cell("Why"), "Good value");
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```JSON\n{}\n```"), "{}");
    }

    #[test]
    fn test_repair_single_quotes_and_bare_keys() {
        let raw = "{Location: 'Gachibowli', Orientation: 'East facing', 'Why': 'Near IT hub'}";
        let record = normalize(raw, "Repaired").unwrap();

        assert_eq!(record.cell("Location"), "Gachibowli");
        assert_eq!(record.cell("Orientation"), "East facing");
        assert_eq!(record.cell("Why"), "Near IT hub");
    }

    #[test]
    fn test_repair_output_parses() {
        let normalizer = Normalizer::new();
        for raw in [
            "{a: 1, b: 'two'}",
            "{'x': ['p', 'q']}",
            "{ spaced_key : 'v' }",
        ] {
            let repaired = normalizer.repair(raw);
            let parsed: Value = serde_json::from_str(&repaired).unwrap();
            assert!(parsed.is_object(), "{} -> {}", raw, repaired);
        }
    }

    #[test]
    fn test_repair_quotes_digit_leading_keys() {
        let raw = "{Location: 'Kokapet', Configuration: {2BHK: '1200 sqft', 3BHK: '1650 sqft'}}";
        let record = normalize(raw, "Unit Sizes").unwrap();

        assert_eq!(record.cell("Location"), "Kokapet");
        assert_eq!(record.cell("Configuration"), "2BHK: 1200 sqft, 3BHK: 1650 sqft");
        assert!(!record.is_fallback());
    }

    #[test]
    fn test_repair_quotes_unicode_keys() {
        let repaired = Normalizer::new().repair("{Größe: '30 floors'}");
        let parsed: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(parsed["Größe"], "30 floors");
    }

    #[test]
    fn test_unrepairable_text_is_malformed() {
        let result = normalize("Sorry, I could not find that project.", "Nowhere");
        assert!(matches!(result, Err(ScoutError::MalformedResponse(_))));
    }

    #[test]
    fn test_non_object_is_malformed() {
        let result = normalize("[\"a\", \"b\"]", "List");
        assert!(matches!(result, Err(ScoutError::MalformedResponse(_))));
    }
}
