/// Field schema registry
///
/// The ordered list of fields every project record exposes. Table headers,
/// the answer skeleton sent to the service, and record completion all
/// derive from `FIELDS`.

/// Record fields, in column order
pub const FIELDS: [&str; 15] = [
    PROJECT_NAME,
    "Project Price per SFT",
    "total Price",
    "Possession (Year & Month)",
    "Location",
    "Builder Reputation & Legal Compliance",
    "Property Type & Space Utilization",
    "Open Space",
    "Safety & Security",
    "Quality of Construction",
    "Home Loan & Financing Options",
    "Orientation",
    "Configuration (2BHK, 3BHK, etc.)",
    SOURCE_URLS,
    "Why",
];

pub const PROJECT_NAME: &str = "Project Name";

/// The only list-valued field
pub const SOURCE_URLS: &str = "Source URLs";

/// Placeholder for anything unknown
pub const SENTINEL: &str = "Information not available";

/// Extra key carrying an error description; not part of `FIELDS`
pub const ERROR_KEY: &str = "error";

/// Check if a key is one of the schema fields
pub fn is_field(key: &str) -> bool {
    FIELDS.contains(&key)
}

/// Literal JSON skeleton of the schema, used as the requested answer shape
pub fn json_skeleton() -> String {
    let lines: Vec<String> = FIELDS
        .iter()
        .map(|field| {
            if *field == SOURCE_URLS {
                format!("  \"{}\": [\"...\"]", field)
            } else {
                format!("  \"{}\": \"...\"", field)
            }
        })
        .collect();

    format!("{{\n{}\n}}", lines.join(",\n"))
}
