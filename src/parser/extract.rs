use std::sync::LazyLock;

use ego_tree::NodeId;
use regex::Regex;

use super::text::normalize;
use super::tree::DocumentTree;

static SIGNATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)IN\s+WITNESS\s+WHEREOF").unwrap());

// How far back into already collected text a straddling signature phrase may start.
const SIGNATURE_LOOKBACK: usize = 64;

/// Per-call collection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Stop at the signature block ("IN WITNESS WHEREOF"), dropping the
    /// fragment that completes the phrase and everything after it.
    pub stop_at_signature: bool,
    /// Drop the first non-empty fragment (an exhibit's repeated title line).
    pub skip_leading_fragment: bool,
}

impl ExtractOptions {
    pub const SECTION: Self = ExtractOptions {
        stop_at_signature: true,
        skip_leading_fragment: false,
    };

    /// Exhibits follow the signature block. The leading fragment is the
    /// repeated title line only when a title paragraph was found.
    pub const fn exhibit(titled: bool) -> Self {
        ExtractOptions {
            stop_at_signature: false,
            skip_leading_fragment: titled,
        }
    }
}

/// Text strictly after the `start` anchor's subtree and strictly before the
/// `end` anchor (or end of document), normalized. An `end` that sits at or
/// before `start` in the document is never reached, so the walk runs on to
/// the end of the document.
pub fn extract_between(
    tree: &DocumentTree,
    start: NodeId,
    end: Option<NodeId>,
    opts: ExtractOptions,
) -> String {
    let Some(span) = tree.span(start) else {
        return String::new();
    };
    let hi = end
        .and_then(|id| tree.span(id))
        .filter(|s| s.start > span.end)
        .map_or(usize::MAX, |s| s.start);
    collect(tree, span.end + 1, hi, opts)
}

/// Text from the body root up to the first section anchor.
pub fn extract_preamble(tree: &DocumentTree, first_section: Option<NodeId>) -> String {
    let Some(root) = tree.span(tree.text_root()) else {
        return String::new();
    };
    let hi = first_section
        .and_then(|id| tree.span(id))
        .map_or(root.end + 1, |s| s.start.min(root.end + 1));
    collect(tree, root.start + 1, hi, ExtractOptions::SECTION)
}

/// Cut `text` at the first signature phrase.
pub fn truncate_at_signature(text: &str) -> String {
    match SIGNATURE_RE.find(text) {
        Some(m) => text[..m.start()].trim().to_string(),
        None => text.to_string(),
    }
}

fn collect(tree: &DocumentTree, lo: usize, hi: usize, opts: ExtractOptions) -> String {
    if lo >= hi {
        return String::new();
    }

    let mut buf = String::new();
    let mut skip = opts.skip_leading_fragment;

    for raw in tree.texts_between(lo, hi) {
        let fragment = raw.trim();
        if fragment.is_empty() {
            continue;
        }
        if skip {
            skip = false;
            continue;
        }

        let fragment_start = buf.len();
        let scan_from = char_floor(&buf, fragment_start.saturating_sub(SIGNATURE_LOOKBACK));
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str(fragment);

        if opts.stop_at_signature {
            if let Some(m) = SIGNATURE_RE.find_at(&buf, scan_from) {
                buf.truncate(m.start().min(fragment_start));
                break;
            }
        }
    }

    normalize(&buf)
}

fn char_floor(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

// ── Tests ──
