pub mod assemble;
pub mod extract;
pub mod markers;
pub mod metadata;
pub mod text;
pub mod tree;

use crate::document::ContractDocument;
use tree::DocumentTree;

/// Markup → tree → anchors → interval text → structured document.
pub fn parse_document(raw: &str, max_nodes: usize) -> ContractDocument {
    if raw.trim().is_empty() {
        return ContractDocument::default();
    }
    let tree = DocumentTree::parse_bounded(raw, max_nodes);
    assemble::assemble(&tree, raw)
}

/// Whole-document prose text, for the keyword classifiers.
pub fn document_text(raw: &str, max_nodes: usize) -> String {
    text::normalize(&DocumentTree::parse_bounded(raw, max_nodes).full_text())
}

// ── Tests ──
