//! # Flow Engine
//!
//! A simplified block-flow box model. Every node is placed inside its
//! parent's content box: vertical blocks stack their children top to bottom,
//! horizontal blocks divide their width among children by weight. A node's
//! height is the larger of its accumulated `min_height` and the height its
//! own text needs, plus vertical padding.
//!
//! Flow is a one-shot, pure computation. Running it twice over the same tree
//! with the same inputs assigns the same rects.
//!
//! ```text
//!   margin.top
//!   ┌─────────────────── rect ───────────────────┐
//!   │ padding.top                                │
//!   │   ┌─ child ─┐                              │
//!   │   └─────────┘  <- cursor advances by the   │
//!   │   ┌─ child ─┐     child's outer height     │
//!   │   └─────────┘                              │
//!   │ padding.bottom                             │
//!   └────────────────────────────────────────────┘
//!   margin.bottom
//! ```

pub mod weights;

use log::trace;

use crate::builder::{BlockOrientation, BuilderNode};
use crate::error::{CrossdocError, Result};
use crate::font::FontContext;
use crate::geom::Rect;

/// Assigns rects to a builder tree using the given font metrics.
pub struct LayoutEngine<'a> {
    fonts: &'a FontContext,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(fonts: &'a FontContext) -> Self {
        Self { fonts }
    }

    /// Place `node` at (`x`, `y`) inside a parent content box `w` wide.
    ///
    /// Returns the vertical space the node consumes, margins included.
    pub fn flow(&self, node: &mut BuilderNode, x: f64, y: f64, w: f64) -> Result<f64> {
        node.rect.x = x + node.margin.left;
        node.rect.y = y + node.margin.top;
        node.rect.width = (w - node.margin.left - node.margin.right).max(0.0);

        self.flow_children(node)?;

        if let (Some(text), Some(font)) = (&node.text, &node.font) {
            let lines = self.fonts.num_lines_in(text, node.content_width(), font);
            let text_height = font.line_height_or_size() * lines as f64;
            node.push_min_height(text_height);
        }

        let padding = node.padding();
        node.rect.height = node.min_height + padding.vertical();
        trace!(
            "flowed <{}> at ({}, {}) {}x{}",
            node.tag,
            node.rect.x,
            node.rect.y,
            node.rect.width,
            node.rect.height
        );

        Ok(node.rect.height + node.margin.vertical())
    }

    /// Lay out the children of an already-sized node according to its
    /// block orientation, growing its `min_height` to fit them.
    pub fn flow_children(&self, node: &mut BuilderNode) -> Result<()> {
        match node.block_orientation {
            BlockOrientation::Vertical => self.flow_children_vertical(node),
            BlockOrientation::Horizontal => self.flow_children_horizontal(node),
        }
    }

    fn flow_children_vertical(&self, node: &mut BuilderNode) -> Result<()> {
        let padding = node.padding();
        let content_width = node.content_width();
        let mut cursor = padding.top;
        for child in node.children.iter_mut() {
            cursor += self.flow(child, padding.left, cursor, content_width)?;
        }
        node.push_min_height(cursor - padding.top);
        Ok(())
    }

    fn flow_children_horizontal(&self, node: &mut BuilderNode) -> Result<()> {
        if node.children.is_empty() {
            return Ok(());
        }
        let padding = node.padding();
        let weights: Vec<f64> = node.children.iter().map(|c| c.weight).collect();
        let widths = weights::apportion(&weights, node.content_width()).ok_or_else(|| {
            CrossdocError::ZeroWeight {
                tag: node.tag.clone(),
            }
        })?;

        let mut cursor_x = padding.left;
        let mut tallest = 0.0_f64;
        for (child, width) in node.children.iter_mut().zip(widths) {
            let dy = self.flow(child, cursor_x, padding.top, width)?;
            cursor_x += width;
            tallest = tallest.max(dy);
        }
        node.push_min_height(tallest);
        Ok(())
    }

    /// Size a header or footer to the page content width. Its height is
    /// the content height alone; padding is not added.
    pub fn flow_header_footer(&self, node: &mut BuilderNode, content_width: f64) -> Result<()> {
        node.rect.width = content_width;
        self.flow_children(node)?;
        node.rect.height = node.min_height;
        Ok(())
    }

    /// Flow a page root. Children always stack vertically from the origin
    /// at the content width; the page has no margin or padding.
    pub fn flow_page(&self, page: &mut BuilderNode, content_width: f64) -> Result<()> {
        let mut cursor = 0.0;
        for child in page.children.iter_mut() {
            cursor += self.flow(child, 0.0, cursor, content_width)?;
        }
        page.rect = Rect::new(0.0, 0.0, content_width, cursor);
        Ok(())
    }
}
