//! # Pagination
//!
//! Splits a flowed single-page document into page-sized trees.
//!
//! Each pass searches for the node that crosses the bottom of the page,
//! descending through nested blocks up to `num_levels` deep. The path of
//! child indices to that node decides the split: everything before the path
//! moves to a new page, the nodes along the path are shallow-copied so both
//! fragments keep their ancestors, and the remainder is shifted back up to
//! the top of the page for the next pass.
//!
//! ```text
//!  page                     before          after
//!  ├─ A                     ├─ A            ├─ C'  (y -> 0)
//!  ├─ B                     ├─ B            │  ├─ c2
//!  └─ C  <- straddles       └─ C (copy)     │  └─ c3
//!     ├─ c1                    └─ c1        └─ ...
//!     ├─ c2 <- straddles
//!     └─ c3
//! ```

pub mod page_break;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{CrossdocError, Result};
use crate::model::{Document, Node, Page};

pub use page_break::{find_spanning_node, BreakLimits, SpanMatch};

/// Pagination policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paginator {
    /// How many levels below the page root a split may descend.
    pub num_levels: usize,
    /// Upper bound on the number of pages produced. Content past the last
    /// boundary stays on the final page.
    pub max_pages: usize,
    /// Minimum width, as a fraction of the content width, for a node to be
    /// considered a break point.
    pub width_threshold: f64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            num_levels: 3,
            max_pages: 10,
            width_threshold: 0.75,
        }
    }
}

impl Paginator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_levels(mut self, num_levels: usize) -> Self {
        self.num_levels = num_levels;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_width_threshold(mut self, width_threshold: f64) -> Self {
        self.width_threshold = width_threshold;
        self
    }

    /// Replace the document's single page with a sequence of pages that
    /// each fit the page's content height.
    ///
    /// On error the document is left as it was.
    pub fn run(&self, doc: &mut Document) -> Result<()> {
        if doc.pages.len() != 1 {
            return Err(CrossdocError::PageCount(doc.pages.len()));
        }
        if doc.page_height.is_nan() || doc.page_height <= 0.0 {
            return Err(CrossdocError::PageHeight(doc.page_height));
        }
        if self.max_pages == 0 {
            return Err(CrossdocError::InvalidPolicy(
                "max_pages must be at least 1".to_string(),
            ));
        }

        let has_content = doc.pages[0]
            .children
            .first()
            .is_some_and(|first| first.rect.height > 0.0);
        if !has_content {
            return Ok(());
        }

        let limits = BreakLimits {
            content_width: doc.content_width(),
            content_height: doc.content_height(),
            width_threshold: self.width_threshold,
        };
        let Some(mut remainder) = doc.pages.pop() else {
            return Ok(());
        };

        let mut pages = Vec::new();
        while pages.len() + 1 < self.max_pages {
            let Some(path) = self.find_split_path(&remainder, &limits) else {
                break;
            };
            if path.iter().all(|&i| i == 0) {
                warn!(
                    "page {}: split at {:?} would leave it empty, keeping the rest on one page",
                    pages.len() + 1,
                    path
                );
                break;
            }
            let before = break_page(&mut remainder, &path);
            debug!(
                "page {}: split at {:?}, {} high with {} nodes",
                pages.len() + 1,
                path,
                before.rect.height,
                before.count_nodes()
            );
            pages.push(before);
        }
        pages.push(remainder);

        debug!("paginated into {} pages", pages.len());
        doc.pages = pages;
        Ok(())
    }

    /// Index path from the page root to the node the page should split at,
    /// or `None` when the page already fits.
    fn find_split_path(&self, page: &Page, limits: &BreakLimits) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut children = page.children.as_slice();
        let mut y = limits.content_height;

        for level in 0..=self.num_levels {
            match find_spanning_node(children, y, limits) {
                Some(SpanMatch::Straddle(i)) if level < self.num_levels => {
                    path.push(i);
                    y -= children[i].rect.y;
                    children = &children[i].children;
                }
                Some(found) => {
                    path.push(found.index());
                    break;
                }
                None => break,
            }
        }

        (!path.is_empty()).then_some(path)
    }
}

/// Split `page` along `path`, returning the content before the split as a
/// new page. `page` keeps the rest, shifted to start at the top.
///
/// Nodes on the path other than the last are shallow-copied into the
/// returned page so both halves keep their ancestors; the last one moves
/// to the remainder whole.
///
/// Each before-fragment is sized to its last child's bottom as the walk
/// reaches it. A shallow copy still has its full box at that point, so only
/// the deepest fragment is tight.
///
/// # Panics
///
/// Panics if an index in `path` is past the end of its parent's children.
/// Paths from [`Paginator::run`] always point at existing nodes.
pub fn break_page(page: &mut Page, path: &[usize]) -> Page {
    let mut before = page.shallow_copy();
    let (children, height) = split_children(&mut page.children, path);
    before.children = children;
    before.rect.height = height;
    shift_up(&mut page.children, path.len());
    before
}

/// Bottom edge of the last child, the tightest height for a fragment.
fn bottom_of(children: &[Node]) -> f64 {
    children.last().map_or(0.0, |c| c.rect.bottom())
}

/// Move the children before `path[0]` out of `after`, copying the boundary
/// node when the path goes deeper. Returns the moved children and the height
/// of the fragment that holds them.
fn split_children(after: &mut Vec<Node>, path: &[usize]) -> (Vec<Node>, f64) {
    let Some((&i, rest)) = path.split_first() else {
        return (Vec::new(), 0.0);
    };
    let mut before: Vec<Node> = after.drain(..i).collect();

    if rest.is_empty() {
        let height = bottom_of(&before);
        return (before, height);
    }
    let Some(boundary) = after.first_mut() else {
        let height = bottom_of(&before);
        return (before, height);
    };

    let mut copy = boundary.shallow_copy();
    let height = copy.rect.bottom();
    let (children, copy_height) = split_children(&mut boundary.children, rest);
    copy.children = children;
    copy.rect.height = copy_height;

    // The continued list picks up its numbering from the items that
    // stayed behind, counting the copied boundary item as one of them.
    if boundary.is_ordered_list() && copy.is_ordered_list() {
        boundary.start = Some(copy.children.len() as i64 + copy.list_start() - 1);
    }
    before.push(copy);
    (before, height)
}

/// Move the remainder's boundary node to the top and pull its following
/// siblings up by however much the boundary shrank, deepest level first.
fn shift_up(children: &mut [Node], levels: usize) {
    let Some(boundary) = children.first_mut() else {
        return;
    };

    let mut height_diff = 0.0;
    if levels > 1 {
        shift_up(&mut boundary.children, levels - 1);
        let new_height = bottom_of(&boundary.children);
        height_diff = boundary.rect.height - new_height;
        boundary.rect.height = new_height;
    }

    let dy = boundary.rect.y;
    for (j, child) in children.iter_mut().enumerate() {
        child.rect.y -= dy;
        if j > 0 {
            child.rect.y -= height_diff;
        }
        child.rect.y = child.rect.y.max(0.0);
    }
}
