//! # Tag Styles
//!
//! Default font, margin, padding, border and minimum height for the tags
//! produced by content importers (`H1`, `P`, `LI`, `TD`, ...). Overrides are
//! merged field by field over the defaults, so a stylesheet only has to name
//! what it changes.
//!
//! ```json
//! {
//!   "FONTS": { "Lato": { "default": true } },
//!   "P": { "font": { "size": 11 }, "margin": { "bottom": 6 } },
//!   "TABLE": { "border": "0.5px solid #888888" }
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::builder::BuilderNode;
use crate::error::Result;
use crate::geom::{Border, BorderSide, Font, Margin, TextAlign, TextTransform};

/// Font fields a style sets. Unset fields keep the default body font's value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontStyle {
    pub family: Option<String>,
    pub size: Option<f64>,
    pub weight: Option<String>,
    pub style: Option<String>,
    pub color: Option<String>,
    pub line_height: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub align: Option<TextAlign>,
    pub transform: Option<TextTransform>,
    pub decoration: Option<String>,
}

impl FontStyle {
    fn merge(&mut self, other: &FontStyle) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if src.is_some() {
                dst.clone_from(src);
            }
        }
        take(&mut self.family, &other.family);
        take(&mut self.size, &other.size);
        take(&mut self.weight, &other.weight);
        take(&mut self.style, &other.style);
        take(&mut self.color, &other.color);
        take(&mut self.line_height, &other.line_height);
        take(&mut self.letter_spacing, &other.letter_spacing);
        take(&mut self.align, &other.align);
        take(&mut self.transform, &other.transform);
        take(&mut self.decoration, &other.decoration);
    }

    /// The default body font with these fields applied. A size without a
    /// line height leaves the line height unset, so lines are `size` high.
    pub fn to_font(&self) -> Font {
        let mut font = Font::default();
        if let Some(size) = self.size {
            font.size = size;
            font.line_height = None;
        }
        if let Some(line_height) = self.line_height {
            font.line_height = Some(line_height);
        }
        if let Some(family) = &self.family {
            font.family = family.clone();
        }
        if let Some(weight) = &self.weight {
            font.weight = Some(weight.clone());
        }
        if let Some(color) = &self.color {
            font.color = Some(color.clone());
        }
        font.style = self.style.clone().or(font.style);
        font.letter_spacing = self.letter_spacing.or(font.letter_spacing);
        font.align = self.align.unwrap_or(font.align);
        font.transform = self.transform.unwrap_or(font.transform);
        font.decoration = self.decoration.clone().or(font.decoration);
        font
    }
}

/// Edge values a style sets. Unset edges are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EdgeStyle {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

impl EdgeStyle {
    fn merge(&mut self, other: &EdgeStyle) {
        self.top = other.top.or(self.top);
        self.right = other.right.or(self.right);
        self.bottom = other.bottom.or(self.bottom);
        self.left = other.left.or(self.left);
    }

    pub fn to_margin(&self) -> Margin {
        Margin {
            top: self.top.unwrap_or(0.0),
            right: self.right.unwrap_or(0.0),
            bottom: self.bottom.unwrap_or(0.0),
            left: self.left.unwrap_or(0.0),
        }
    }
}

/// A border as written in a stylesheet: one shorthand for all four sides,
/// or a shorthand per side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BorderShorthand {
    All(String),
    Sides {
        #[serde(default)]
        top: Option<String>,
        #[serde(default)]
        right: Option<String>,
        #[serde(default)]
        bottom: Option<String>,
        #[serde(default)]
        left: Option<String>,
    },
}

impl BorderShorthand {
    fn all(shorthand: &str) -> Self {
        BorderShorthand::All(shorthand.to_string())
    }

    fn bottom(shorthand: &str) -> Self {
        BorderShorthand::Sides {
            top: None,
            right: None,
            bottom: Some(shorthand.to_string()),
            left: None,
        }
    }

    /// Parse the shorthands. Sides left out of a per-side shorthand are not drawn.
    pub fn to_border(&self) -> Result<Border> {
        let side = |s: &Option<String>| -> Result<Option<BorderSide>> {
            s.as_deref().map(str::parse).transpose()
        };
        match self {
            BorderShorthand::All(s) => Ok(Border::all(s.parse()?)),
            BorderShorthand::Sides {
                top,
                right,
                bottom,
                left,
            } => Ok(Border {
                top: side(top)?,
                right: side(right)?,
                bottom: side(bottom)?,
                left: side(left)?,
            }),
        }
    }
}

/// Everything a stylesheet can say about one tag.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TagStyle {
    pub font: Option<FontStyle>,
    pub margin: Option<EdgeStyle>,
    pub padding: Option<EdgeStyle>,
    pub border: Option<BorderShorthand>,
    pub min_height: Option<f64>,
}

impl TagStyle {
    fn font(font: FontStyle) -> Self {
        Self {
            font: Some(font),
            ..Self::default()
        }
    }

    fn with_margin(mut self, margin: EdgeStyle) -> Self {
        self.margin = Some(margin);
        self
    }

    fn merge(&mut self, other: &TagStyle) {
        match (&mut self.font, &other.font) {
            (Some(dst), Some(src)) => dst.merge(src),
            (dst, src) => {
                if src.is_some() {
                    dst.clone_from(src);
                }
            }
        }
        match (&mut self.margin, &other.margin) {
            (Some(dst), Some(src)) => dst.merge(src),
            (dst, src) => *dst = src.or(*dst),
        }
        match (&mut self.padding, &other.padding) {
            (Some(dst), Some(src)) => dst.merge(src),
            (dst, src) => *dst = src.or(*dst),
        }
        if other.border.is_some() {
            self.border.clone_from(&other.border);
        }
        self.min_height = other.min_height.or(self.min_height);
    }
}

/// A font family declared by a stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontFace {
    /// Use this family wherever a style names none.
    pub default: bool,
}

/// A stylesheet: per-tag overrides plus declared font families.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StyleSheet {
    #[serde(rename = "FONTS", default)]
    pub fonts: BTreeMap<String, FontFace>,
    #[serde(flatten)]
    pub tags: BTreeMap<String, TagStyle>,
}

/// A tag style with its values parsed, ready to apply.
#[derive(Debug, Clone, PartialEq)]
struct ResolvedStyle {
    font: Font,
    margin: Margin,
    padding: Margin,
    border: Option<Border>,
    min_height: f64,
}

impl ResolvedStyle {
    fn resolve(style: &TagStyle, default_family: Option<&str>) -> Result<Self> {
        let mut font = style.font.clone().unwrap_or_default();
        if font.family.is_none() {
            font.family = default_family.map(str::to_string);
        }
        Ok(Self {
            font: font.to_font(),
            margin: style.margin.unwrap_or_default().to_margin(),
            padding: style.padding.unwrap_or_default().to_margin(),
            border: style.border.as_ref().map(BorderShorthand::to_border).transpose()?,
            min_height: style.min_height.unwrap_or(0.0),
        })
    }
}

fn default_styles() -> BTreeMap<String, TagStyle> {
    let sized = |size: f64| FontStyle {
        size: Some(size),
        ..FontStyle::default()
    };
    let centered = |size: f64| FontStyle {
        align: Some(TextAlign::Center),
        ..sized(size)
    };
    let bottom = |bottom: f64| EdgeStyle {
        bottom: Some(bottom),
        ..EdgeStyle::default()
    };
    let list_margin = EdgeStyle {
        bottom: Some(12.0),
        left: Some(20.0),
        ..EdgeStyle::default()
    };

    let styles = [
        ("FOOTER_LEFT", TagStyle::font(sized(10.0))),
        ("FOOTER_CENTER", TagStyle::font(centered(10.0))),
        (
            "FOOTER_RIGHT",
            TagStyle::font(FontStyle {
                align: Some(TextAlign::Right),
                ..sized(10.0)
            }),
        ),
        ("H1", TagStyle::font(sized(32.0)).with_margin(bottom(8.0))),
        ("H2", TagStyle::font(sized(26.0)).with_margin(bottom(8.0))),
        ("H3", TagStyle::font(sized(20.0)).with_margin(bottom(8.0))),
        ("P", TagStyle::font(sized(12.0)).with_margin(bottom(12.0))),
        ("UL", TagStyle::default().with_margin(list_margin)),
        ("OL", TagStyle::default().with_margin(list_margin)),
        (
            "LI",
            TagStyle::font(FontStyle {
                line_height: Some(24.0),
                ..sized(12.0)
            }),
        ),
        (
            "TABLE",
            TagStyle {
                border: Some(BorderShorthand::all("1px solid")),
                ..TagStyle::default()
            }
            .with_margin(bottom(7.2)),
        ),
        ("TH", TagStyle::font(centered(13.0))),
        (
            "THEAD",
            TagStyle {
                border: Some(BorderShorthand::bottom("0.2px solid")),
                ..TagStyle::default()
            },
        ),
        (
            "TR",
            TagStyle {
                border: Some(BorderShorthand::bottom("0.2px solid")),
                ..TagStyle::default()
            },
        ),
        (
            "TD",
            TagStyle::font(centered(9.0)).with_margin(EdgeStyle {
                top: Some(1.0),
                right: Some(8.0),
                bottom: Some(1.0),
                left: Some(8.0),
            }),
        ),
    ];
    styles
        .into_iter()
        .map(|(tag, style)| (tag.to_string(), style))
        .collect()
}

/// Applies per-tag styles to builder nodes.
#[derive(Debug, Clone)]
pub struct Styler {
    styles: BTreeMap<String, ResolvedStyle>,
    fallback: ResolvedStyle,
}

impl Styler {
    /// A styler with only the default tag styles.
    pub fn new() -> Result<Self> {
        Self::with_sheet(StyleSheet::default())
    }

    /// Merge `sheet` over the default tag styles. Tag names are matched
    /// case-insensitively.
    pub fn with_sheet(sheet: StyleSheet) -> Result<Self> {
        let mut merged = default_styles();
        for (tag, style) in &sheet.tags {
            merged
                .entry(tag.to_ascii_uppercase())
                .or_default()
                .merge(style);
        }

        let default_family = sheet
            .fonts
            .iter()
            .find(|(_, face)| face.default)
            .map(|(name, _)| name.as_str());

        let styles = merged
            .iter()
            .map(|(tag, style)| Ok((tag.clone(), ResolvedStyle::resolve(style, default_family)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        let fallback = ResolvedStyle::resolve(&TagStyle::default(), default_family)?;
        Ok(Self { styles, fallback })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let sheet: StyleSheet = serde_json::from_str(json)?;
        Self::with_sheet(sheet)
    }

    /// Style `node` by its own tag.
    pub fn style_node(&self, node: &mut BuilderNode) {
        let tag = node.tag.clone();
        self.style_node_as(node, &tag);
    }

    /// Style `node` as if it had `tag`. Sets the font, border, margin and
    /// padding, and raises the minimum height.
    pub fn style_node_as(&self, node: &mut BuilderNode, tag: &str) {
        let style = self
            .styles
            .get(&tag.to_ascii_uppercase())
            .unwrap_or(&self.fallback);
        node.default_font(style.font.clone());
        if let Some(border) = &style.border {
            node.border = Some(border.clone());
        }
        node.push_min_height(style.min_height);
        node.margin = style.margin;
        node.padding = Some(style.padding);
    }

    /// Style `node` and every descendant by their own tags.
    pub fn style_tree(&self, node: &mut BuilderNode) {
        self.style_node(node);
        for child in node.children.iter_mut() {
            self.style_tree(child);
        }
    }
}
