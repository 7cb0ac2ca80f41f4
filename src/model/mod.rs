//! # Document Model
//!
//! The finalized, positioned representation produced by the flow engine and
//! consumed by the paginator and by drawing backends. Every node carries its
//! rect in its parent's content coordinate space; a backend must never
//! recompute geometry.
//!
//! The JSON shape uses snake_case keys, and a node's rect is written under
//! `box`.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CrossdocError, Result};
use crate::geom::{Background, Border, Font, Margin, Rect};

/// A reference to an image used in a document, keyed by the hash of its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    pub hash: String,
}

/// A single positioned node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "box", default)]
    pub rect: Rect,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Margin>,

    #[serde(default)]
    pub children: Vec<Node>,

    // ── List metadata ──────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_level: Option<u32>,
    /// First number of an ordered list. Unset means 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,

    // ── Form inputs ────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_possible: Option<Vec<String>>,

    // ── Images ─────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Node {
    /// An empty node with a tag and a rect.
    pub fn new(tag: &str, rect: Rect) -> Self {
        Self {
            tag: tag.to_string(),
            text: None,
            rect,
            font: None,
            border: None,
            background: None,
            padding: None,
            children: vec![],
            list_style: None,
            list_level: None,
            start: None,
            input_type: None,
            input_value: None,
            input_possible: None,
            src: None,
            hash: None,
        }
    }

    /// A copy of this node's attributes and rect with no children.
    pub fn shallow_copy(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            text: self.text.clone(),
            rect: self.rect,
            font: self.font.clone(),
            border: self.border.clone(),
            background: self.background.clone(),
            padding: self.padding,
            children: vec![],
            list_style: self.list_style.clone(),
            list_level: self.list_level,
            start: self.start,
            input_type: self.input_type.clone(),
            input_value: self.input_value.clone(),
            input_possible: self.input_possible.clone(),
            src: self.src.clone(),
            hash: self.hash.clone(),
        }
    }

    pub fn is_ordered_list(&self) -> bool {
        self.tag.eq_ignore_ascii_case("ol")
    }

    /// The number of the first list item.
    pub fn list_start(&self) -> i64 {
        self.start.unwrap_or(1)
    }

    pub fn padding(&self) -> Margin {
        self.padding.unwrap_or_default()
    }

    /// This node plus all of its descendants.
    pub fn count_nodes(&self) -> usize {
        1 + self.children.iter().map(Node::count_nodes).sum::<usize>()
    }

    /// Text of every node in document order.
    pub fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(text) = &self.text {
            out.push(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// The root of one page's content. Children are laid out at the document's
/// content width; the page itself has no margin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "box", default)]
    pub rect: Rect,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Margin>,

    #[serde(default)]
    pub children: Vec<Node>,
}

impl Page {
    pub fn new(rect: Rect, children: Vec<Node>) -> Self {
        Self {
            rect,
            padding: None,
            children,
        }
    }

    /// A copy of this page's rect and padding with no children.
    pub fn shallow_copy(&self) -> Self {
        Self {
            rect: self.rect,
            padding: self.padding,
            children: vec![],
        }
    }

    /// All nodes on the page, not counting the page root.
    pub fn count_nodes(&self) -> usize {
        self.children.iter().map(Node::count_nodes).sum()
    }

    /// Text of every node on the page in document order.
    pub fn texts(&self) -> Vec<&str> {
        let mut out = vec![];
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

/// A complete, flowed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_width: f64,
    pub page_height: f64,
    #[serde(default)]
    pub page_margin: Margin,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<Node>,
    #[serde(default)]
    pub images: BTreeMap<String, ImageRef>,
}

impl Document {
    /// Parse a flowed document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn content_width(&self) -> f64 {
        self.page_width - self.page_margin.horizontal()
    }

    /// Page height left for body content once margins, header and footer
    /// are taken out.
    pub fn content_height(&self) -> f64 {
        let mut height = self.page_height - self.page_margin.vertical();
        if let Some(header) = &self.header {
            height -= header.rect.height;
        }
        if let Some(footer) = &self.footer {
            height -= footer.rect.height;
        }
        height
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageSize {
    #[default]
    #[serde(alias = "us-letter")]
    Letter,
    Legal,
    Tabloid,
    A3,
    A4,
    A5,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points, portrait.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl PageSize {
    /// Returns (width, height) in points for the given orientation.
    pub fn oriented(&self, orientation: Orientation) -> (f64, f64) {
        let (w, h) = self.dimensions();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

impl FromStr for PageSize {
    type Err = CrossdocError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letter" | "us-letter" => Ok(PageSize::Letter),
            "legal" | "us-legal" => Ok(PageSize::Legal),
            "tabloid" => Ok(PageSize::Tabloid),
            "a3" => Ok(PageSize::A3),
            "a4" => Ok(PageSize::A4),
            "a5" => Ok(PageSize::A5),
            _ => Err(CrossdocError::InvalidPageSize(s.to_string())),
        }
    }
}

/// Parse a length such as `0.75in`, `54pt`, `2cm`, `20mm` or `12px` into
/// points. Bare numbers are points; a pixel is a point.
pub fn parse_length(s: &str) -> Result<f64> {
    let s = s.trim();
    let split = s
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| CrossdocError::InvalidLength(s.to_string()))?;
    let factor = match unit.to_ascii_lowercase().as_str() {
        "" | "pt" | "px" => 1.0,
        "in" => 72.0,
        "cm" => 72.0 / 2.54,
        "mm" => 72.0 / 25.4,
        _ => return Err(CrossdocError::InvalidLength(s.to_string())),
    };
    Ok(value * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths() {
        assert!((parse_length("0.75in").unwrap() - 54.0).abs() < 1e-9);
        assert!((parse_length("0.5in").unwrap() - 36.0).abs() < 1e-9);
        assert!((parse_length("54pt").unwrap() - 54.0).abs() < 1e-9);
        assert!((parse_length("12").unwrap() - 12.0).abs() < 1e-9);
        assert!((parse_length("2.54cm").unwrap() - 72.0).abs() < 1e-9);
        assert!((parse_length("25.4mm").unwrap() - 72.0).abs() < 1e-9);
        assert!((parse_length("0.2px").unwrap() - 0.2).abs() < 1e-9);
        assert!(parse_length("wide").is_err());
        assert!(parse_length("3furlongs").is_err());
    }

    #[test]
    fn page_sizes() {
        assert_eq!("us-letter".parse::<PageSize>().unwrap().dimensions(), (612.0, 792.0));
        assert_eq!(PageSize::Letter.oriented(Orientation::Landscape), (792.0, 612.0));
        assert!("b7".parse::<PageSize>().is_err());
        let custom: PageSize = serde_json::from_str(r#"{ "custom": { "width": 100, "height": 200 } }"#).unwrap();
        assert_eq!(custom.dimensions(), (100.0, 200.0));
    }

    #[test]
    fn shallow_copy_drops_children_only() {
        let mut ol = Node::new("OL", Rect::new(0.0, 10.0, 100.0, 50.0));
        ol.start = Some(3);
        ol.list_style = Some("decimal".to_string());
        ol.children.push(Node::new("LI", Rect::new(0.0, 0.0, 100.0, 10.0)));

        let copy = ol.shallow_copy();
        assert!(copy.children.is_empty());
        assert_eq!(copy.rect, ol.rect);
        assert_eq!(copy.start, Some(3));
        assert_eq!(copy.list_style.as_deref(), Some("decimal"));
        assert!(copy.is_ordered_list());
        assert_eq!(ol.children.len(), 1);
    }

    #[test]
    fn node_json_uses_box_key() {
        let node = Node::new("P", Rect::new(1.0, 2.0, 3.0, 4.0));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["box"]["height"], 4.0);
        assert_eq!(json["tag"], "P");
        assert!(json.get("text").is_none());
    }

    #[test]
    fn document_from_json() {
        let doc = Document::from_json(
            r#"{
                "page_width": 612, "page_height": 792,
                "page_margin": { "top": 36, "right": 36, "bottom": 36, "left": 36 },
                "pages": [ { "box": { "x": 0, "y": 0, "width": 540, "height": 20 },
                             "children": [ { "tag": "P", "text": "hi",
                                             "box": { "x": 0, "y": 0, "width": 540, "height": 20 } } ] } ],
                "footer": { "tag": "FOOTER", "box": { "x": 0, "y": 0, "width": 540, "height": 20 } }
            }"#,
        )
        .unwrap();
        assert_eq!(doc.pages[0].texts(), vec!["hi"]);
        assert_eq!(doc.content_width(), 540.0);
        assert_eq!(doc.content_height(), 792.0 - 72.0 - 20.0);
    }

    #[test]
    fn document_json_error_has_hint() {
        let err = Document::from_json(r#"{ "page_width": "wide" }"#).unwrap_err();
        assert!(matches!(err, CrossdocError::Parse { .. }));
    }
}
