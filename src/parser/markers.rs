use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::LazyLock;

use ego_tree::NodeId;
use regex::Regex;
use scraper::ElementRef;

use super::tree::DocumentTree;

static NUMERAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.?\d*\.?$").unwrap());
static LEADING_NUMERAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.?\d*\.?\s*").unwrap());
static EXHIBIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^EXHIBIT\s+([A-Z]|\d+)$").unwrap());

const ITALIC: &[&str] = &["i", "em"];
const BOLD: &[&str] = &["strong", "b"];
const UNDERLINE: &[&str] = &["u"];

/// A located section or exhibit header. `node` marks where the header sits in
/// document order; extraction runs from the end of its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub label: String,
    pub title: String,
    pub node: NodeId,
}

/// Numbered section headers from both layout conventions, sorted by dotted
/// numeral and deduplicated on (number, title).
pub fn find_sections(tree: &DocumentTree) -> Vec<Anchor> {
    let mut anchors = table_anchors(tree);
    anchors.extend(paragraph_anchors(tree));
    merge_anchors(anchors)
}

/// Table layout: `<tr><td><i>1.</i></td><td><i>Title</i></td></tr>`. Anchor is the row.
pub fn table_anchors(tree: &DocumentTree) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    for cell in tree.elements("td") {
        let Some(number) = first_run(cell, ITALIC).and_then(|i| section_number(&run_text(i))) else {
            continue;
        };
        let Some(row) = enclosing(cell, "tr") else {
            continue;
        };

        let title = descendants_named(row, &["td"])
            .filter(|td| td.id() != cell.id())
            .filter_map(|td| first_run(td, ITALIC))
            .map(run_text)
            .find(|t| !t.is_empty() && !NUMERAL_RE.is_match(t));

        if let Some(title) = title {
            anchors.push(Anchor {
                label: number,
                title,
                node: row.id(),
            });
        }
    }
    anchors
}

/// Paragraph layout: `<p><strong>1.</strong> <strong>TITLE</strong> ...</p>`.
/// Without a second bold run the title is the paragraph text minus the numeral.
pub fn paragraph_anchors(tree: &DocumentTree) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    for para in tree.elements("p") {
        let bolds: Vec<ElementRef> = descendants_named(para, BOLD).collect();
        let Some(number) = bolds.first().and_then(|b| section_number(&run_text(*b))) else {
            continue;
        };

        let title = bolds[1..]
            .iter()
            .map(|b| run_text(*b))
            .find(|t| !t.is_empty() && !NUMERAL_RE.is_match(t))
            .unwrap_or_else(|| {
                LEADING_NUMERAL_RE
                    .replace(&run_text(para), "")
                    .trim()
                    .to_string()
            });

        if !title.is_empty() {
            anchors.push(Anchor {
                label: number,
                title,
                node: para.id(),
            });
        }
    }
    anchors
}

/// Stable sort by dotted numeral, then drop repeated (number, title) pairs
/// keeping the first.
pub fn merge_anchors(mut anchors: Vec<Anchor>) -> Vec<Anchor> {
    anchors.sort_by(|a, b| compare_numbers(&a.label, &b.label));
    let mut seen = HashSet::new();
    anchors.retain(|a| seen.insert((a.label.clone(), a.title.clone())));
    anchors
}

/// Split a dotted numeral into integer components ("10.2" → [10, 2]).
/// Non-numeric or empty components count as 0.
pub fn sort_key(number: &str) -> Vec<u64> {
    number.split('.').map(|p| p.parse().unwrap_or(0)).collect()
}

/// Component-wise numeric order with missing trailing components as 0:
/// 2 < 2.1 < 2.2 < 3 < 10 < 10.1.
pub fn compare_numbers(a: &str, b: &str) -> Ordering {
    let (ka, kb) = (sort_key(a), sort_key(b));
    let len = ka.len().max(kb.len());
    (0..len)
        .map(|i| {
            let x = ka.get(i).copied().unwrap_or(0);
            let y = kb.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Exhibit headers (`<p><strong><u>EXHIBIT A</u></strong></p>`) in encounter
/// order. The title comes from the next sibling paragraph unless that is
/// itself an exhibit header.
pub fn find_exhibits(tree: &DocumentTree) -> Vec<Anchor> {
    tree.elements("p")
        .filter_map(|para| {
            let label = exhibit_label(para)?;
            let title = next_paragraph(para)
                .and_then(underlined_heading)
                .filter(|t| !EXHIBIT_RE.is_match(t))
                .unwrap_or_default();
            Some(Anchor {
                label,
                title,
                node: para.id(),
            })
        })
        .collect()
}

fn exhibit_label(para: ElementRef) -> Option<String> {
    let heading = underlined_heading(para)?;
    let caps = EXHIBIT_RE.captures(&heading)?;
    Some(format!("Exhibit {}", caps[1].to_uppercase()))
}

fn underlined_heading(para: ElementRef) -> Option<String> {
    let bold = first_run(para, BOLD)?;
    first_run(bold, UNDERLINE).map(run_text)
}

fn next_paragraph(para: ElementRef) -> Option<ElementRef> {
    para.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "p")
}

fn section_number(text: &str) -> Option<String> {
    let text = text.trim();
    if NUMERAL_RE.is_match(text) {
        Some(text.trim_end_matches('.').to_string())
    } else {
        None
    }
}

/// Strict descendants of `el` whose tag is one of `names`, in document order.
fn descendants_named<'a>(
    el: ElementRef<'a>,
    names: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.descendent_elements()
        .skip(1)
        .filter(move |d| names.contains(&d.value().name()))
}

fn first_run<'a>(el: ElementRef<'a>, names: &'a [&'a str]) -> Option<ElementRef<'a>> {
    descendants_named(el, names).next()
}

fn enclosing<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == name)
}

/// Trimmed text of a run, fragments joined by single spaces.
fn run_text(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(anchors: &[Anchor]) -> Vec<(&str, &str)> {
        anchors
            .iter()
            .map(|a| (a.label.as_str(), a.title.as_str()))
            .collect()
    }

    #[test]
    fn numeric_order() {
        let mut numbers = vec!["10.1", "2.2", "10", "3", "2", "2.1"];
        numbers.sort_by(|a, b| compare_numbers(a, b));
        assert_eq!(numbers, ["2", "2.1", "2.2", "3", "10", "10.1"]);
        assert_eq!(compare_numbers("2", "2.0"), Ordering::Equal);
        assert_eq!(compare_numbers("9", "10"), Ordering::Less);
    }

    #[test]
    fn sort_key_components() {
        assert_eq!(sort_key("10.2"), [10, 2]);
        assert_eq!(sort_key("4"), [4]);
        assert_eq!(sort_key("4."), [4, 0]);
    }

    #[test]
    fn table_layout() {
        let tree = DocumentTree::parse(
            "<table><tr><td><i>1.</i></td><td><i>Definitions</i></td></tr>\
             <tr><td><i>2.</i></td><td></td><td><i>Fees</i></td></tr></table>",
        );
        let anchors = table_anchors(&tree);
        assert_eq!(labels(&anchors), [("1", "Definitions"), ("2", "Fees")]);

        let row = tree.node(anchors[0].node).and_then(ElementRef::wrap).unwrap();
        assert_eq!(row.value().name(), "tr");
    }

    #[test]
    fn table_row_without_title() {
        let tree = DocumentTree::parse("<table><tr><td><i>1.</i></td><td>plain</td></tr></table>");
        assert!(table_anchors(&tree).is_empty());
    }

    #[test]
    fn paragraph_layout() {
        let tree = DocumentTree::parse(
            "<p><strong>1.</strong> <strong>SERVICES</strong> Provider shall perform.</p>\
             <p><b>2.1</b> <b>Support</b></p>\
             <p><strong>MASTER AGREEMENT</strong></p>",
        );
        let anchors = paragraph_anchors(&tree);
        assert_eq!(labels(&anchors), [("1", "SERVICES"), ("2.1", "Support")]);
    }

    #[test]
    fn paragraph_title_fallback() {
        let tree = DocumentTree::parse("<p><strong>3.</strong> Confidentiality</p>");
        let anchors = paragraph_anchors(&tree);
        assert_eq!(labels(&anchors), [("3", "Confidentiality")]);
    }

    #[test]
    fn paragraph_numeral_only_dropped() {
        let tree = DocumentTree::parse("<p><strong>4.</strong></p>");
        assert!(paragraph_anchors(&tree).is_empty());
    }

    #[test]
    fn merged_sorted_and_deduplicated() {
        let tree = DocumentTree::parse(
            "<p><strong>10.</strong> <strong>Notices</strong></p>\
             <p><strong>2.</strong> <strong>Term</strong></p>\
             <table><tr><td><i>2.1</i></td><td><i>Renewal</i></td></tr></table>\
             <p><strong>2.</strong> <strong>Term</strong></p>",
        );
        let anchors = find_sections(&tree);
        assert_eq!(
            labels(&anchors),
            [("2", "Term"), ("2.1", "Renewal"), ("10", "Notices")]
        );
    }

    #[test]
    fn dedup_idempotent() {
        let tree = DocumentTree::parse(
            "<p><strong>1.</strong> <strong>Scope</strong></p>\
             <table><tr><td><i>1.</i></td><td><i>Scope</i></td></tr></table>\
             <p><strong>1.1</strong> <strong>Detail</strong></p>",
        );
        let once = find_sections(&tree);
        let mut twice = find_sections(&tree);
        twice.extend(find_sections(&tree));
        assert_eq!(merge_anchors(twice), once);
        assert_eq!(labels(&once), [("1", "Scope"), ("1.1", "Detail")]);
    }

    #[test]
    fn exhibits_in_encounter_order() {
        let tree = DocumentTree::parse(
            "<p><strong><u>EXHIBIT B</u></strong></p>\
             <p><strong><u>Fees</u></strong></p>\
             <p><strong><u>Exhibit 1</u></strong></p>\
             <p><strong><u>EXHIBIT A</u></strong></p>\
             <p>no heading</p>",
        );
        let anchors = find_exhibits(&tree);
        assert_eq!(
            labels(&anchors),
            [("Exhibit B", "Fees"), ("Exhibit 1", ""), ("Exhibit A", "")]
        );
    }

    #[test]
    fn exhibit_needs_bold_underline() {
        let tree = DocumentTree::parse("<p><u>EXHIBIT A</u></p><p><strong>EXHIBIT B</strong></p>");
        assert!(find_exhibits(&tree).is_empty());
    }
}
