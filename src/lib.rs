//! # Crossdoc
//!
//! Block-flow layout and page splitting for styled document trees.
//!
//! Content arrives as a tree of tagged blocks with already-resolved styles.
//! The flow engine gives every block an absolute rect inside one tall page,
//! sizing text blocks from real font metrics. The paginator then cuts that
//! page into page-sized trees, copying the ancestors of each cut so both
//! halves keep their structure, and renumbering ordered lists that continue
//! on the next page. Drawing the result is left to a backend.
//!
//! ## Architecture
//!
//! ```text
//! Input (DSL / JSON)
//!       ↓
//!   [style]     — Per-tag default fonts, margins, borders
//!       ↓
//!   [builder]   — Pre-layout tree: tags, text, weights, orientation
//!       ↓
//!   [layout]    — Flow engine, text height from [font] metrics
//!       ↓
//!   [model]     — Positioned tree: one page, absolute rects
//!       ↓
//!   [paginate]  — Split into page-sized trees
//! ```

pub mod builder;
pub mod error;
pub mod font;
pub mod geom;
pub mod layout;
pub mod model;
pub mod paginate;
pub mod style;

use builder::DocBuilder;
use error::Result;
use model::Document;
use paginate::Paginator;

/// Flow a document described as builder JSON into a single positioned page
/// per source page.
pub fn layout_json(json: &str) -> Result<Document> {
    DocBuilder::from_json(json)?.to_doc()
}

/// Flow a single-page builder JSON document and split it into pages.
pub fn paginate_json(json: &str, paginator: &Paginator) -> Result<Document> {
    let mut doc = layout_json(json)?;
    paginator.run(&mut doc)?;
    Ok(doc)
}
