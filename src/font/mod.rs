//! # Font Metrics
//!
//! Advance-width lookup for text measurement, and the line-count estimator
//! the flow engine uses to reserve vertical space for text blocks.
//!
//! The standard PDF fonts (Helvetica, Times, Courier) are always available
//! from built-in AFM tables. TrueType/OpenType faces can be registered from
//! raw bytes; their widths are read with ttf-parser.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use std::collections::HashMap;
use std::sync::OnceLock;

use log::debug;

use crate::error::{CrossdocError, Result};
use crate::geom::{Font, FontVariant};

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| CrossdocError::Font(format!("could not parse font data: {e}")))?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Ok(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
        })
    }
}

/// The standard fonts with built-in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// Oblique and italic faces reuse the upright widths.
    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => metrics::HELVETICA_BOLD,
            Self::TimesRoman | Self::TimesItalic => metrics::TIMES_ROMAN,
            Self::TimesBold | Self::TimesBoldItalic => metrics::TIMES_BOLD,
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique => {
                metrics::COURIER
            }
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    /// Lowercased family name.
    pub family: String,
    pub variant: FontVariant,
}

impl FontKey {
    pub fn new(family: &str, variant: FontVariant) -> Self {
        Self {
            family: family.trim().to_ascii_lowercase(),
            variant,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the standard PDF fonts.
    Standard(StandardFont),
    /// A TrueType/OpenType font registered from bytes.
    Custom(CustomFontMetrics),
}

impl FontData {
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        match self {
            FontData::Standard(font) => font.metrics().char_width(ch, font_size),
            FontData::Custom(m) => m.char_width(ch, font_size),
        }
    }

    pub fn measure_string(&self, text: &str, font_size: f64, letter_spacing: f64) -> f64 {
        match self {
            FontData::Standard(font) => {
                font.metrics()
                    .measure_string(text, font_size, letter_spacing)
            }
            FontData::Custom(m) => text
                .chars()
                .map(|ch| m.char_width(ch, font_size) + letter_spacing)
                .sum(),
        }
    }
}

static FALLBACK: FontData = FontData::Standard(StandardFont::Helvetica);

/// A font registry that maps family + variant to font data.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        let standard_mappings = [
            (("helvetica", FontVariant::Normal), StandardFont::Helvetica),
            (("helvetica", FontVariant::Bold), StandardFont::HelveticaBold),
            (("helvetica", FontVariant::Italic), StandardFont::HelveticaOblique),
            (("helvetica", FontVariant::BoldItalic), StandardFont::HelveticaBoldOblique),
            (("times", FontVariant::Normal), StandardFont::TimesRoman),
            (("times", FontVariant::Bold), StandardFont::TimesBold),
            (("times", FontVariant::Italic), StandardFont::TimesItalic),
            (("times", FontVariant::BoldItalic), StandardFont::TimesBoldItalic),
            (("courier", FontVariant::Normal), StandardFont::Courier),
            (("courier", FontVariant::Bold), StandardFont::CourierBold),
            (("courier", FontVariant::Italic), StandardFont::CourierOblique),
            (("courier", FontVariant::BoldItalic), StandardFont::CourierBoldOblique),
        ];

        for ((family, variant), font) in standard_mappings {
            fonts.insert(FontKey::new(family, variant), FontData::Standard(font));
        }

        Self { fonts }
    }

    /// Look up a font by its family (the first entry of a CSS-style list),
    /// falling back to the family's normal face and then to Helvetica.
    pub fn resolve(&self, family: &str, variant: FontVariant) -> &FontData {
        let family = family.split(',').next().unwrap_or("");
        let candidates = [
            FontKey::new(family, variant),
            FontKey::new(family, FontVariant::Normal),
            FontKey::new("helvetica", variant),
        ];
        candidates
            .iter()
            .find_map(|key| self.fonts.get(key))
            .unwrap_or(&FALLBACK)
    }

    /// Register a custom font from TrueType/OpenType bytes.
    pub fn register(&mut self, family: &str, variant: FontVariant, data: &[u8]) -> Result<()> {
        let metrics = CustomFontMetrics::from_font_data(data)?;
        debug!(
            "registered font '{}' ({:?}) with {} glyph widths",
            family,
            variant,
            metrics.advance_widths.len()
        );
        self.fonts
            .insert(FontKey::new(family, variant), FontData::Custom(metrics));
        Ok(())
    }

    pub fn contains(&self, family: &str, variant: FontVariant) -> bool {
        self.fonts.contains_key(&FontKey::new(family, variant))
    }

}

/// Shared font context used by layout.
/// Provides text measurement with real glyph metrics.
#[derive(Default)]
pub struct FontContext {
    registry: FontRegistry,
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, family: &str, variant: FontVariant, font_size: f64) -> f64 {
        self.registry.resolve(family, variant).char_width(ch, font_size)
    }

    /// Measure the width of a string in points.
    pub fn measure_string(
        &self,
        text: &str,
        family: &str,
        variant: FontVariant,
        font_size: f64,
        letter_spacing: f64,
    ) -> f64 {
        self.registry
            .resolve(family, variant)
            .measure_string(text, font_size, letter_spacing)
    }

    /// Estimate how many lines `text` wraps to inside `width`.
    ///
    /// Words are packed greedily at whitespace; the result reserves vertical
    /// space and is not a rendering cursor. Always at least 1.
    pub fn num_lines(&self, text: &str, width: f64, font_size: f64, font_name: &str) -> usize {
        let font = self.registry.resolve(font_name, FontVariant::Normal);
        count_lines(font, text, width, font_size)
    }

    /// [`num_lines`](Self::num_lines) for text set in `font`: measured with
    /// the face its weight and style select, after its case transform.
    pub fn num_lines_in(&self, text: &str, width: f64, font: &Font) -> usize {
        let data = self.registry.resolve(&font.family, font.variant());
        count_lines(data, &font.transform_text(text), width, font.size)
    }

    /// Resolve a family and variant to its font data.
    pub fn resolve(&self, family: &str, variant: FontVariant) -> &FontData {
        self.registry.resolve(family, variant)
    }

    /// Access the underlying font registry.
    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    /// Access the underlying font registry mutably.
    pub fn registry_mut(&mut self) -> &mut FontRegistry {
        &mut self.registry
    }
}

fn count_lines(font: &FontData, text: &str, width: f64, font_size: f64) -> usize {
    let word_widths: Vec<f64> = text
        .split_whitespace()
        .map(|word| font.measure_string(word, font_size, 0.0))
        .collect();
    if word_widths.is_empty() {
        return 1;
    }
    let space_width = font.char_width(' ', font_size);

    let total_width: f64 =
        word_widths.iter().sum::<f64>() + space_width * (word_widths.len() - 1) as f64;
    if total_width <= width {
        return 1;
    }

    // An over-wide first word opens a second line immediately.
    let mut lines = 1;
    let mut line_width = 0.0;
    for w in word_widths {
        if line_width + w > width {
            line_width = w + space_width;
            lines += 1;
        } else {
            line_width += w + space_width;
        }
    }
    lines
}

/// The process-wide context holding only the standard fonts.
pub fn default_context() -> &'static FontContext {
    static CONTEXT: OnceLock<FontContext> = OnceLock::new();
    CONTEXT.get_or_init(FontContext::new)
}

/// [`FontContext::num_lines`] against the standard fonts.
pub fn num_lines(text: &str, width: f64, font_size: f64, font_name: &str) -> usize {
    default_context().num_lines(text, width, font_size, font_name)
}
