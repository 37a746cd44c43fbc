use std::collections::HashMap;

use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node};
use tracing::warn;

pub const DEFAULT_MAX_NODES: usize = 2_000_000;

/// Document-order position of a node: its own ordinal and the ordinal of the
/// last node in its subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Parsed markup plus a one-time depth-first index (node → ordinal), so that
/// interval checks between anchors are O(1) instead of rescanning the tree.
pub struct DocumentTree {
    html: Html,
    order: Vec<NodeId>,
    spans: Vec<Span>,
    ordinals: HashMap<NodeId, usize>,
    /// Ordinals of text nodes outside `script`/`style`, ascending.
    texts: Vec<usize>,
    truncated: bool,
}

impl DocumentTree {
    #[cfg(test)]
    pub fn parse(raw: &str) -> Self {
        Self::parse_bounded(raw, DEFAULT_MAX_NODES)
    }

    /// Parse and index at most `max_nodes` nodes; anything past the bound is
    /// invisible to detection and extraction.
    pub fn parse_bounded(raw: &str, max_nodes: usize) -> Self {
        let html = Html::parse_document(raw);

        let mut order = Vec::new();
        let mut spans: Vec<Span> = Vec::new();
        let mut ordinals = HashMap::new();
        let mut texts = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        let mut truncated = false;

        for edge in html.tree.root().traverse() {
            match edge {
                Edge::Open(node) => {
                    if order.len() >= max_nodes {
                        truncated = true;
                        break;
                    }
                    let ordinal = order.len();
                    order.push(node.id());
                    spans.push(Span { start: ordinal, end: ordinal });
                    ordinals.insert(node.id(), ordinal);
                    if node.value().is_text() && !inside_non_prose(node) {
                        texts.push(ordinal);
                    }
                    open.push(ordinal);
                }
                Edge::Close(_) => {
                    if let Some(ordinal) = open.pop() {
                        spans[ordinal].end = order.len() - 1;
                    }
                }
            }
        }

        // Subtrees cut off by the bound end at the last indexed node.
        if let Some(last) = order.len().checked_sub(1) {
            for ordinal in open {
                spans[ordinal].end = last;
            }
        }
        if truncated {
            warn!(max_nodes, "document tree exceeds node bound; trailing content ignored");
        }

        DocumentTree {
            html,
            order,
            spans,
            ordinals,
            texts,
            truncated,
        }
    }

    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.ordinals.get(&id).map(|&o| self.spans[o])
    }

    #[cfg(test)]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Indexed elements with the given tag name, in document order.
    pub fn elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.order
            .iter()
            .filter_map(move |&id| self.html.tree.get(id))
            .filter_map(ElementRef::wrap)
            .filter(move |el| el.value().name() == name)
    }

    /// Root of the contract body: the EDGAR `<text>` wrapper if present, else
    /// `<body>`, else the document itself.
    pub fn text_root(&self) -> NodeId {
        self.elements("text")
            .next()
            .or_else(|| self.elements("body").next())
            .map(|el| el.id())
            .unwrap_or_else(|| self.html.tree.root().id())
    }

    /// Raw text nodes with ordinal in `lo..hi`, in document order.
    pub fn texts_between(&self, lo: usize, hi: usize) -> impl Iterator<Item = &str> + '_ {
        let first = self.texts.partition_point(|&o| o < lo);
        self.texts[first..]
            .iter()
            .take_while(move |&&o| o < hi)
            .filter_map(move |&o| self.text_at(o))
    }

    /// All prose text in the document, fragments trimmed and space-joined.
    pub fn full_text(&self) -> String {
        self.texts_between(0, usize::MAX)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn text_at(&self, ordinal: usize) -> Option<&str> {
        let id = *self.order.get(ordinal)?;
        self.html.tree.get(id)?.value().as_text().map(|t| &**t)
    }
}

fn inside_non_prose(node: NodeRef<'_, Node>) -> bool {
    node.parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| matches!(parent.value().name(), "script" | "style"))
}

// ── Tests ──
