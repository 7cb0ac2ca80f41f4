//! # Builder Tree
//!
//! The pre-layout representation. External producers (the closure DSL below,
//! a JSON source, or an importer) assemble a tree of [`BuilderNode`]s with
//! tags, text, resolved style values and weights. [`DocBuilder::to_doc`]
//! flows every tree and finalizes it into the immutable [`Node`] model.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::Deserialize;

use crate::error::Result;
use crate::font::FontContext;
use crate::geom::{Background, Border, BorderSide, Font, Margin, Rect};
use crate::layout::LayoutEngine;
use crate::model::{parse_length, Document, ImageRef, Node, Orientation, Page, PageSize};
use crate::style::Styler;

/// Whether a node's children stack vertically or sit side by side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockOrientation {
    #[default]
    Vertical,
    Horizontal,
}

fn default_weight() -> f64 {
    1.0
}

/// A node under construction. Owns its children exclusively.
#[derive(Debug, Clone, Deserialize)]
pub struct BuilderNode {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub font: Option<Font>,
    #[serde(default)]
    pub border: Option<Border>,
    #[serde(default)]
    pub background: Option<Background>,
    #[serde(default)]
    pub padding: Option<Margin>,

    /// Share of the parent's width among horizontal siblings.
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub block_orientation: BlockOrientation,
    #[serde(default)]
    pub margin: Margin,
    #[serde(default)]
    pub children: Vec<BuilderNode>,

    /// Smallest content height; grows during flow, never shrinks.
    #[serde(default)]
    pub min_height: f64,
    /// Assigned by the flow engine.
    #[serde(skip)]
    pub rect: Rect,

    #[serde(default)]
    pub list_style: Option<String>,
    #[serde(default)]
    pub list_level: Option<u32>,
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub input_value: Option<String>,
    #[serde(default)]
    pub input_possible: Option<Vec<String>>,
    /// Image source; its hash keys the document's image map.
    #[serde(default)]
    pub src: Option<String>,
}

impl Default for BuilderNode {
    fn default() -> Self {
        Self {
            tag: String::new(),
            text: None,
            font: None,
            border: None,
            background: None,
            padding: None,
            weight: default_weight(),
            block_orientation: BlockOrientation::Vertical,
            margin: Margin::default(),
            children: vec![],
            min_height: 0.0,
            rect: Rect::default(),
            list_style: None,
            list_level: None,
            start: None,
            input_type: None,
            input_value: None,
            input_possible: None,
            src: None,
        }
    }
}

/// Key for an image source within one document.
///
/// Keys come from the standard library's default hasher, so they only match
/// between documents built by the same build of this crate. Compare image
/// sources, not keys, across builds.
pub fn image_hash(src: &str) -> String {
    let mut hasher = DefaultHasher::new();
    src.hash(&mut hasher);
    hasher.finish().to_string()
}

impl BuilderNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_uppercase(),
            ..Self::default()
        }
    }

    pub fn horizontal(tag: &str) -> Self {
        Self {
            block_orientation: BlockOrientation::Horizontal,
            ..Self::new(tag)
        }
    }

    /// Append a child with the given tag, configured by `f`.
    pub fn node(&mut self, tag: &str, f: impl FnOnce(&mut BuilderNode)) -> &mut Self {
        self.push_child(BuilderNode::new(tag), f)
    }

    /// Append a vertical `DIV`.
    pub fn div(&mut self, f: impl FnOnce(&mut BuilderNode)) -> &mut Self {
        self.push_child(BuilderNode::new("div"), f)
    }

    /// Append a horizontal `DIV`.
    pub fn horizontal_div(&mut self, f: impl FnOnce(&mut BuilderNode)) -> &mut Self {
        self.push_child(BuilderNode::horizontal("div"), f)
    }

    fn push_child(&mut self, mut child: BuilderNode, f: impl FnOnce(&mut BuilderNode)) -> &mut Self {
        f(&mut child);
        self.children.push(child);
        self
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    pub fn weight(&mut self, weight: f64) -> &mut Self {
        self.weight = weight;
        self
    }

    pub fn push_min_height(&mut self, h: f64) {
        if h > self.min_height {
            self.min_height = h;
        }
    }

    pub fn default_font(&mut self, font: Font) -> &mut Self {
        self.font = Some(font);
        self
    }

    pub fn padding(&self) -> Margin {
        self.padding.unwrap_or_default()
    }

    pub fn padding_mut(&mut self) -> &mut Margin {
        self.padding.get_or_insert_with(Margin::default)
    }

    pub fn border_all(&mut self, side: BorderSide) -> &mut Self {
        self.border = Some(Border::all(side));
        self
    }

    pub fn border_top(&mut self, side: BorderSide) -> &mut Self {
        self.border.get_or_insert_with(Border::default).top = Some(side);
        self
    }

    pub fn border_bottom(&mut self, side: BorderSide) -> &mut Self {
        self.border.get_or_insert_with(Border::default).bottom = Some(side);
        self
    }

    pub fn border_left(&mut self, side: BorderSide) -> &mut Self {
        self.border.get_or_insert_with(Border::default).left = Some(side);
        self
    }

    pub fn border_right(&mut self, side: BorderSide) -> &mut Self {
        self.border.get_or_insert_with(Border::default).right = Some(side);
        self
    }

    pub fn background_color(&mut self, color: &str) -> &mut Self {
        self.background.get_or_insert_with(Background::default).color = Some(color.to_string());
        self
    }

    pub fn image_src(&mut self, src: &str) -> &mut Self {
        self.src = Some(src.to_string());
        self
    }

    /// Width available to children once padding is removed.
    pub fn content_width(&self) -> f64 {
        let padding = self.padding();
        (self.rect.width - padding.horizontal()).max(0.0)
    }

    /// Add an [`ImageRef`] for this node and every descendant with a source.
    pub fn collect_images(&self, images: &mut BTreeMap<String, ImageRef>) {
        if let Some(src) = &self.src {
            let hash = image_hash(src);
            images.entry(hash.clone()).or_insert_with(|| ImageRef {
                src: src.clone(),
                hash,
            });
        }
        for child in &self.children {
            child.collect_images(images);
        }
    }

    /// Finalize into an immutable node, keeping the flowed rect.
    pub fn into_node(self) -> Node {
        let hash = self.src.as_deref().map(image_hash);
        Node {
            tag: self.tag,
            text: self.text,
            rect: self.rect,
            font: self.font,
            border: self.border,
            background: self.background,
            padding: self.padding,
            children: self.children.into_iter().map(BuilderNode::into_node).collect(),
            list_style: self.list_style,
            list_level: self.list_level,
            start: self.start,
            input_type: self.input_type,
            input_value: self.input_value,
            input_possible: self.input_possible,
            src: self.src,
            hash,
        }
    }
}

/// Page geometry for a [`DocBuilder`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocOptions {
    pub page_size: PageSize,
    pub page_orientation: Orientation,
    /// Uniform page margin as a length string, e.g. `0.75in`.
    pub page_margin: String,
}

impl Default for DocOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            page_orientation: Orientation::Portrait,
            page_margin: "0.75in".to_string(),
        }
    }
}

/// A whole document described as JSON: page options plus builder trees.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocSource {
    #[serde(flatten)]
    pub options: DocOptions,
    pub header: Option<BuilderNode>,
    pub footer: Option<BuilderNode>,
    pub pages: Vec<BuilderNode>,
}

/// Assembles pages, header and footer, then flows them into a [`Document`].
pub struct DocBuilder {
    pub page_width: f64,
    pub page_height: f64,
    pub page_margin: Margin,
    pages: Vec<BuilderNode>,
    header: Option<BuilderNode>,
    footer: Option<BuilderNode>,
    fonts: FontContext,
}

impl DocBuilder {
    pub fn new(options: DocOptions) -> Result<Self> {
        let (page_width, page_height) = options.page_size.oriented(options.page_orientation);
        let page_margin = Margin::uniform(parse_length(&options.page_margin)?);
        Ok(Self {
            page_width,
            page_height,
            page_margin,
            pages: vec![],
            header: None,
            footer: None,
            fonts: FontContext::new(),
        })
    }

    /// Build from a parsed [`DocSource`]. Header and footer lay their
    /// children out horizontally, as with [`DocBuilder::header`].
    pub fn from_source(source: DocSource) -> Result<Self> {
        let mut builder = Self::new(source.options)?;
        builder.header = source.header.map(into_horizontal);
        builder.footer = source.footer.map(into_horizontal);
        builder.pages = source.pages;
        Ok(builder)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let source: DocSource = serde_json::from_str(json)?;
        Self::from_source(source)
    }

    pub fn page_content_width(&self) -> f64 {
        self.page_width - self.page_margin.horizontal()
    }

    /// A rect at the origin the size of the whole page.
    pub fn page_box(&self) -> Rect {
        Rect::new(0.0, 0.0, self.page_width, self.page_height)
    }

    pub fn page(&mut self, f: impl FnOnce(&mut BuilderNode)) -> &mut Self {
        let mut page = BuilderNode::new("page");
        f(&mut page);
        self.pages.push(page);
        self
    }

    pub fn header(&mut self, f: impl FnOnce(&mut BuilderNode)) -> &mut Self {
        let mut header = BuilderNode::horizontal("header");
        f(&mut header);
        self.header = Some(header);
        self
    }

    pub fn footer(&mut self, f: impl FnOnce(&mut BuilderNode)) -> &mut Self {
        let mut footer = BuilderNode::horizontal("footer");
        f(&mut footer);
        self.footer = Some(footer);
        self
    }

    /// Drop pages, header and footer so the builder can be reused.
    pub fn clear_content(&mut self) {
        self.pages.clear();
        self.header = None;
        self.footer = None;
    }

    pub fn fonts(&self) -> &FontContext {
        &self.fonts
    }

    /// Register custom fonts here before calling [`DocBuilder::to_doc`].
    pub fn fonts_mut(&mut self) -> &mut FontContext {
        &mut self.fonts
    }

    /// Style every node below the page roots, the header and the footer by
    /// its tag. Replaces their fonts, margins and padding.
    pub fn apply_styles(&mut self, styler: &Styler) {
        let roots = self
            .pages
            .iter_mut()
            .chain(self.header.iter_mut())
            .chain(self.footer.iter_mut());
        for root in roots {
            for child in root.children.iter_mut() {
                styler.style_tree(child);
            }
        }
    }

    /// Flow every page, the header and the footer, and finalize the document.
    pub fn to_doc(&self) -> Result<Document> {
        let engine = LayoutEngine::new(&self.fonts);
        let content_width = self.page_content_width();

        let mut images = BTreeMap::new();
        let mut pages = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let mut page = page.clone();
            engine.flow_page(&mut page, content_width)?;
            page.collect_images(&mut images);
            let rect = page.rect;
            let children = page.children.into_iter().map(BuilderNode::into_node).collect();
            pages.push(Page::new(rect, children));
        }

        let mut finish = |node: &Option<BuilderNode>| -> Result<Option<Node>> {
            let Some(node) = node else {
                return Ok(None);
            };
            let mut node = node.clone();
            engine.flow_header_footer(&mut node, content_width)?;
            node.collect_images(&mut images);
            Ok(Some(node.into_node()))
        };
        let header = finish(&self.header)?;
        let footer = finish(&self.footer)?;

        Ok(Document {
            page_width: self.page_width,
            page_height: self.page_height,
            page_margin: self.page_margin,
            pages,
            header,
            footer,
            images,
        })
    }
}

fn into_horizontal(mut node: BuilderNode) -> BuilderNode {
    node.block_orientation = BlockOrientation::Horizontal;
    node
}
