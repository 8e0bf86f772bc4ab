use std::sync::OnceLock;

use regex::Regex;

fn date_prefix() -> &'static Regex {
    static DATE_PREFIX: OnceLock<Regex> = OnceLock::new();
    DATE_PREFIX.get_or_init(|| {
        Regex::new(r"^(?P<date>[0-9]{4}\.[0-9]{2}\.[0-9]{2})\s*-\s*(?P<rest>.+)$")
            .expect("date prefix pattern is valid")
    })
}

const FIELD_SEPARATOR: &str = " - ";

/// A document name split into its date token and descriptive fields.
/// The date is only pattern-checked here; calendar validity is the classifier's call.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    pub date: String,
    pub fields: Vec<String>,
}

/// Parse `"YYYY.MM.DD - field1 - ... - fieldN"` (extension already stripped).
pub fn parse_filename(stem: &str) -> Option<ParsedName> {
    let caps = date_prefix().captures(stem)?;
    let fields: Vec<String> = caps["rest"]
        .split(FIELD_SEPARATOR)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    if fields.is_empty() {
        return None;
    }
    Some(ParsedName {
        date: caps["date"].to_string(),
        fields,
    })
}
