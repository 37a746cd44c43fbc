use std::sync::LazyLock;

use regex::Regex;

// EDGAR pagination markers ("Field: Page; Sequence: 1", "Field: /Page") run up to the next 'F'.
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Field:\s*\S+[^F]*").unwrap());
static PAGE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\s+\d{1,2})+\s*$").unwrap());
static HSPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n+").unwrap());

/// Clean extracted contract text: non-breaking spaces, pagination artifacts,
/// a trailing page number, and whitespace runs.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = raw.replace('\u{a0}', " ");
    let text = FIELD_RE.replace_all(&text, "");
    let text = PAGE_NUMBER_RE.replace(&text, "");
    let text = HSPACE_RE.replace_all(&text, " ");
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");

    text.split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n \u{a0} "), "");
    }

    #[test]
    fn non_breaking_spaces() {
        assert_eq!(normalize("Effective\u{a0}Date"), "Effective Date");
    }

    #[test]
    fn field_artifact_to_end() {
        assert_eq!(normalize("Payment terms. Field: Page; Sequence: 1"), "Payment terms.");
    }

    #[test]
    fn field_artifact_mid_text() {
        assert_eq!(
            normalize("Payment terms. Field: /Page Fees apply monthly."),
            "Payment terms. Fees apply monthly."
        );
    }

    #[test]
    fn trailing_page_number() {
        assert_eq!(normalize("the Licensed Software. 7"), "the Licensed Software.");
        assert_eq!(normalize("the Licensed Software.\n12\n"), "the Licensed Software.");
        // three digits is not a page marker
        assert_eq!(normalize("Suite 100"), "Suite 100");
    }

    #[test]
    fn horizontal_whitespace() {
        assert_eq!(normalize("a   b\t\tc"), "a b c");
    }

    #[test]
    fn blank_line_runs() {
        assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n \n\t\n b"), "a\n\nb");
        assert_eq!(normalize("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn trims_each_line() {
        assert_eq!(normalize("  line one  \n  line two  "), "line one\nline two");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "",
            "plain",
            "Section text 1 2",
            "a\u{a0}\u{a0}b\n\n\n\n c \n",
            "Fees. Field: Page; Sequence: 3 Field: /Page Further text 4",
            "  Term\r\n\r\n\r\nRenewal  ",
            "x\n 5 \n",
            "FieField: y ld: z",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }
}
