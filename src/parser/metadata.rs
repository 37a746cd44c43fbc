use std::sync::LazyLock;

use regex::Regex;

use crate::document::Metadata;

// EDGAR header pseudo-tags: `<TYPE>EX-10.2`, value runs to end of line or next tag.
static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<type>([^\n<]+)").unwrap());
static SEQUENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<sequence>([^\n<]+)").unwrap());
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<filename>([^\n<]+)").unwrap());
static DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<description>([^\n<]+)").unwrap());

/// Read the filing header from raw markup. Must run before tree building:
/// the pseudo-tags are not HTML and the parser would swallow them.
pub fn read_metadata(raw: &str) -> Metadata {
    Metadata {
        doc_type: first_value(&TYPE_RE, raw),
        sequence: first_value(&SEQUENCE_RE, raw),
        filename: first_value(&FILENAME_RE, raw),
        description: first_value(&DESCRIPTION_RE, raw),
    }
}

fn first_value(re: &Regex, raw: &str) -> String {
    re.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

// ── Tests ──
