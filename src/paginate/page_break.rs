//! # Break Point Search
//!
//! Finds where a list of sibling nodes crosses a page boundary. A sibling
//! can mark the boundary in one of two ways: it starts at or below the
//! boundary with everything before it ending above (a clean break), or the
//! boundary runs through it (a straddle). Narrow siblings such as sidebar
//! cells are never chosen; splitting them would cut a row in half.

use crate::model::Node;

/// Where a page boundary falls among a list of siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanMatch {
    /// The sibling at this index starts at or below the boundary and every
    /// earlier sibling ends at or above it. Move it and the rest whole.
    CleanBreak(usize),
    /// The boundary passes through the sibling at this index.
    Straddle(usize),
}

impl SpanMatch {
    pub fn index(self) -> usize {
        match self {
            SpanMatch::CleanBreak(i) | SpanMatch::Straddle(i) => i,
        }
    }
}

/// Page dimensions and threshold the search is judged against.
#[derive(Debug, Clone, Copy)]
pub struct BreakLimits {
    pub content_width: f64,
    pub content_height: f64,
    /// A sibling qualifies only if it is wider than this fraction of the
    /// content width.
    pub width_threshold: f64,
}

impl BreakLimits {
    fn qualifies(&self, node: &Node) -> bool {
        if self.content_width <= 0.0 || node.rect.width / self.content_width <= self.width_threshold {
            return false;
        }
        // A leaf taller than a whole page can't be split and would be pushed
        // onto blank page after blank page.
        !(node.children.is_empty() && node.rect.height > self.content_height)
    }
}

/// Scan `children` in order for the first qualifying sibling that marks the
/// boundary at `y`, in the siblings' own coordinate space.
pub fn find_spanning_node(children: &[Node], y: f64, limits: &BreakLimits) -> Option<SpanMatch> {
    children.iter().enumerate().find_map(|(i, node)| {
        if !limits.qualifies(node) {
            return None;
        }
        let rect = node.rect;
        if rect.y >= y {
            let clear = children[..i].iter().all(|prior| prior.rect.bottom() <= y);
            return clear.then_some(SpanMatch::CleanBreak(i));
        }
        (y < rect.bottom()).then_some(SpanMatch::Straddle(i))
    })
}
