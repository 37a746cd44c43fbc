use ego_tree::NodeId;
use tracing::debug;

use super::extract::{extract_between, extract_preamble, truncate_at_signature, ExtractOptions};
use super::markers::{find_exhibits, find_sections, Anchor};
use super::metadata::read_metadata;
use super::tree::DocumentTree;
use crate::document::{ContractDocument, Section};

/// Compose metadata, preamble, sections and exhibits into one document.
pub fn assemble(tree: &DocumentTree, raw: &str) -> ContractDocument {
    let metadata = read_metadata(raw);
    let section_anchors = find_sections(tree);
    let exhibit_anchors = find_exhibits(tree);
    debug!(
        nodes = tree.len(),
        truncated = tree.is_truncated(),
        sections = section_anchors.len(),
        exhibits = exhibit_anchors.len(),
        "anchors found"
    );

    let mut sections = Vec::with_capacity(section_anchors.len() + exhibit_anchors.len() + 1);

    // Earliest in the document, which is not always the lowest number.
    let first_in_document = section_anchors
        .iter()
        .filter_map(|a| tree.span(a.node).map(|s| (s.start, a.node)))
        .min();
    if let Some((_, first)) = first_in_document {
        let preamble = extract_preamble(tree, Some(first));
        if !preamble.is_empty() {
            sections.push(Section::preamble(preamble));
        }
    }

    for (anchor, next) in with_next(&section_anchors) {
        // A section can carry signature language inline with no anchor after it.
        let text = truncate_at_signature(&extract_between(tree, anchor.node, next, ExtractOptions::SECTION));
        push_record(&mut sections, anchor, text);
    }

    for (anchor, next) in with_next(&exhibit_anchors) {
        let opts = ExtractOptions::exhibit(!anchor.title.is_empty());
        let text = extract_between(tree, anchor.node, next, opts);
        push_record(&mut sections, anchor, text);
    }

    ContractDocument { metadata, sections }
}

/// Each anchor paired with the node of the one after it.
fn with_next(anchors: &[Anchor]) -> impl Iterator<Item = (&Anchor, Option<NodeId>)> {
    let nexts = anchors
        .iter()
        .skip(1)
        .map(|a| Some(a.node))
        .chain(std::iter::once(None));
    anchors.iter().zip(nexts)
}

// Title-only records are kept: they mark subsections whose text went to a child.
fn push_record(sections: &mut Vec<Section>, anchor: &Anchor, text: String) {
    if text.is_empty() && anchor.title.is_empty() {
        return;
    }
    sections.push(Section {
        number: anchor.label.clone(),
        title: anchor.title.clone(),
        text,
    });
}

// ── Tests ──
