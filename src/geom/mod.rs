//! # Geometry and Style Primitives
//!
//! Plain value types shared by the builder, the flow engine, the paginator
//! and whatever backend paints the result. None of them carry behavior
//! beyond derived accessors and small parsing helpers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CrossdocError;
use crate::model::parse_length;

/// An axis-aligned rectangle in the parent's content coordinate space
/// (y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Edge values (top, right, bottom, left) used for margin and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

/// The face of a family a font resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontVariant {
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

const DEFAULT_FAMILY: &str = "helvetica,sans-serif";
const DEFAULT_COLOR: &str = "#000000";
const DEFAULT_SIZE: f64 = 12.0;
const DEFAULT_LINE_HEIGHT: f64 = 16.0;

fn default_family() -> String {
    DEFAULT_FAMILY.to_string()
}

fn default_color() -> Option<String> {
    Some(DEFAULT_COLOR.to_string())
}

fn default_size() -> f64 {
    DEFAULT_SIZE
}

fn default_weight() -> Option<String> {
    Some("normal".to_string())
}

/// Text styling for a node.
///
/// Missing fields in JSON take the default body font's values, except
/// `line_height`, which stays unset so height math falls back to `size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(default = "default_family")]
    pub family: String,
    #[serde(default = "default_size")]
    pub size: f64,
    #[serde(default = "default_weight", skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default = "default_color", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub transform: TextTransform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoration: Option<String>,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: default_family(),
            size: DEFAULT_SIZE,
            weight: default_weight(),
            style: None,
            color: default_color(),
            line_height: Some(DEFAULT_LINE_HEIGHT),
            letter_spacing: None,
            align: TextAlign::Left,
            transform: TextTransform::None,
            decoration: None,
        }
    }
}

impl Font {
    /// The default body font at a different size, keeping the default leading ratio.
    pub fn sized(size: f64) -> Self {
        Self {
            size,
            line_height: Some(size * DEFAULT_LINE_HEIGHT / DEFAULT_SIZE),
            ..Self::default()
        }
    }

    /// Height of one line of text.
    pub fn line_height_or_size(&self) -> f64 {
        self.line_height.unwrap_or(self.size)
    }

    /// The first family of a CSS-style family list.
    pub fn primary_family(&self) -> &str {
        self.family.split(',').next().unwrap_or("").trim()
    }

    pub fn variant(&self) -> FontVariant {
        let bold = match self.weight.as_deref() {
            Some(w) if w.eq_ignore_ascii_case("bold") => true,
            Some(w) => w.trim().parse::<u32>().map(|n| n >= 700).unwrap_or(false),
            None => false,
        };
        let italic = matches!(
            self.style.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("italic") | Some("oblique")
        );
        match (bold, italic) {
            (true, true) => FontVariant::BoldItalic,
            (true, false) => FontVariant::Bold,
            (false, true) => FontVariant::Italic,
            (false, false) => FontVariant::Normal,
        }
    }

    pub fn transform_text(&self, text: &str) -> String {
        match self.transform {
            TextTransform::None => text.to_string(),
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::Lowercase => text.to_lowercase(),
            TextTransform::Capitalize => {
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl FromStr for BorderStyle {
    type Err = CrossdocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "solid" => Ok(BorderStyle::Solid),
            "dashed" => Ok(BorderStyle::Dashed),
            "dotted" => Ok(BorderStyle::Dotted),
            _ => Err(CrossdocError::InvalidBorder(s.to_string())),
        }
    }
}

/// One side of a border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderSide {
    pub width: f64,
    #[serde(default)]
    pub style: BorderStyle,
    #[serde(default = "default_border_color")]
    pub color: String,
}

fn default_border_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl BorderSide {
    pub fn new(width: f64, style: BorderStyle, color: &str) -> Self {
        Self {
            width,
            style,
            color: color.to_string(),
        }
    }
}

impl FromStr for BorderSide {
    type Err = CrossdocError;

    /// Parses shorthands like `2px`, `1px solid` or `0.2px dashed #008888`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let width = parts
            .next()
            .ok_or_else(|| CrossdocError::InvalidBorder(s.to_string()))
            .and_then(|w| parse_length(w).map_err(|_| CrossdocError::InvalidBorder(s.to_string())))?;
        let style = match parts.next() {
            Some(style) => style.parse()?,
            None => BorderStyle::Solid,
        };
        let color = parts.next().unwrap_or(DEFAULT_COLOR).to_string();
        if parts.next().is_some() {
            return Err(CrossdocError::InvalidBorder(s.to_string()));
        }
        Ok(Self {
            width,
            style,
            color,
        })
    }
}

/// Per-side border. Missing sides are not drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Border {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderSide>,
}

impl Border {
    pub fn all(side: BorderSide) -> Self {
        Self {
            top: Some(side.clone()),
            right: Some(side.clone()),
            bottom: Some(side.clone()),
            left: Some(side),
        }
    }

    /// True when all four sides match, so a backend can stroke the bounds once.
    pub fn is_equal(&self) -> bool {
        self.top == self.right && self.bottom == self.left && self.top == self.bottom
    }
}

/// Background decoration. Opaque to layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Background {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}
