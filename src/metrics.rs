//! Text width measurement.
//!
//! The layout engine never looks at glyph tables itself; it asks a
//! [`TextMeasure`] how wide a run of text is under a given style. The
//! builtin PDF fonts carry no metrics we can query cheaply, so the default
//! measurer works from an average glyph width per family. Hosts with real
//! font metrics plug in their own implementation.

use crate::style::{FontFamily, FontWeight, TextStyle};

/// Measures the rendered width of text, in millimetres.
pub trait TextMeasure {
    fn text_width(&self, text: &str, style: &TextStyle) -> f32;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn text_width(&self, text: &str, style: &TextStyle) -> f32 {
        (**self).text_width(text, style)
    }
}

/// Average-glyph-width estimate: every character is `em` wide for its family.
#[derive(Debug, Clone, Copy)]
pub struct AverageCharWidth {
    pub helvetica_em: f32,
    pub times_em: f32,
    pub courier_em: f32,
    /// Multiplier applied to bold text.
    pub bold_factor: f32,
}

impl Default for AverageCharWidth {
    fn default() -> Self {
        Self {
            helvetica_em: 0.50,
            times_em: 0.45,
            courier_em: 0.60,
            bold_factor: 1.05,
        }
    }
}

impl AverageCharWidth {
    fn em_for(&self, family: FontFamily) -> f32 {
        match family {
            FontFamily::Helvetica => self.helvetica_em,
            FontFamily::Times => self.times_em,
            FontFamily::Courier => self.courier_em,
        }
    }
}

impl TextMeasure for AverageCharWidth {
    fn text_width(&self, text: &str, style: &TextStyle) -> f32 {
        let mut char_width = self.em_for(style.font_family) * style.font_size_mm();
        if style.font_weight == FontWeight::Bold {
            char_width *= self.bold_factor;
        }
        text.chars().count() as f32 * char_width
    }
}

/// Fixed width per character, independent of style.
#[derive(Debug, Clone, Copy)]
pub struct Monospace {
    pub char_width: f32,
}

impl Monospace {
    pub fn new(char_width: f32) -> Self {
        Self { char_width }
    }
}

impl TextMeasure for Monospace {
    fn text_width(&self, text: &str, _style: &TextStyle) -> f32 {
        text.chars().count() as f32 * self.char_width
    }
}
