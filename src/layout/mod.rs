//! Line layout derived from paragraphs and wrap results.
//!
//! Everything in this module is a rebuildable cache: a pure function of the
//! text, the paragraph store and the wrap engine output. Nothing here is
//! persisted.
//!
//! Key types:
//!
//! - [`LineWrapper`]: Wrap engine seam producing [`VisualLine`]s
//! - [`MonospaceWrapper`]: Column-based char/word wrapping
//! - [`LineMeta`]: Owning paragraph and role flags of one visual line
//! - [`LineHeights`]: Resolved height of every visual line
//! - [`LayoutView`]: Cached layout over a [`TextBuffer`](crate::TextBuffer)
//!
//! # Examples
//!
//! ```
//! use paraflow::TextBuffer;
//! use paraflow::layout::{LayoutView, WrapMode};
//!
//! let buffer = TextBuffer::with_text("hello world\nbye");
//! let view = LayoutView::new(&buffer).wrap_mode(WrapMode::Word).wrap_width(6);
//!
//! let layout = view.layout().unwrap();
//! assert_eq!(layout.lines.len(), 3);
//! assert!(!layout.lines.is_last_line(0).unwrap());
//! assert!(layout.lines.is_last_line(1).unwrap());
//! ```

mod justify;
mod line_meta;
mod view;
mod wrap;

pub use justify::{LineAlignment, effective_align, line_alignment, line_offset, should_stretch, space_stretch};
pub use line_meta::{LineFlags, LineMeta, LineMetaTable, build_line_meta};
pub use view::{Layout, LayoutView};
pub use wrap::{LineWrapper, MonospaceWrapper, VisualLine, WidthMethod, WrapMode};

use crate::error::Result;
use crate::paragraph::ParagraphStore;
use crate::style::{TextAlign, validate_line_height};

/// Buffer-wide layout defaults.
///
/// # Default Values
///
/// - `font_size`: 40.0
/// - `default_line_height`: 1.16
/// - `font_size_mult`: 1.13
/// - `default_align`: [`TextAlign::Left`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutOptions {
    pub font_size: f64,
    pub default_line_height: f64,
    pub font_size_mult: f64,
    pub default_align: TextAlign,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            font_size: 40.0,
            default_line_height: 1.16,
            font_size_mult: 1.13,
            default_align: TextAlign::Left,
        }
    }
}

impl LayoutOptions {
    /// Set the font size.
    #[must_use]
    pub fn font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Set the line height used by paragraphs without an override.
    pub fn default_line_height(mut self, line_height: f64) -> Result<Self> {
        self.default_line_height = validate_line_height(line_height)?;
        Ok(self)
    }

    /// Set the font-size multiplier applied to every line height.
    #[must_use]
    pub fn font_size_mult(mut self, mult: f64) -> Self {
        self.font_size_mult = mult;
        self
    }

    /// Set the alignment used by paragraphs without an override.
    #[must_use]
    pub fn default_align(mut self, align: TextAlign) -> Self {
        self.default_align = align;
        self
    }

    /// Height of one line with the given line-height multiplier.
    #[must_use]
    pub fn line_height_px(&self, line_height: f64) -> f64 {
        self.font_size * line_height * self.font_size_mult
    }
}

/// Resolved height of every visual line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineHeights(Vec<f64>);

impl LineHeights {
    /// Resolve heights from each line's paragraph override or the default.
    #[must_use]
    pub fn resolve(lines: &LineMetaTable, store: &ParagraphStore, options: &LayoutOptions) -> Self {
        Self(
            lines
                .iter()
                .map(|line| {
                    let multiplier = store
                        .style(line.paragraph_index)
                        .and_then(|style| style.line_height)
                        .unwrap_or(options.default_line_height);
                    options.line_height_px(multiplier)
                })
                .collect(),
        )
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Height of one line.
    #[must_use]
    pub fn get(&self, line: usize) -> Option<f64> {
        self.0.get(line).copied()
    }

    /// All heights in line order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Sum of all line heights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Top edge of a line, measured from the top of the first line.
    #[must_use]
    pub fn top_of(&self, line: usize) -> Option<f64> {
        (line < self.0.len()).then(|| self.0[..line].iter().sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextBuffer;
    use crate::style::ParagraphStyle;

    #[test]
    fn test_default_options() {
        let options = LayoutOptions::default();
        assert_eq!(options.default_align, TextAlign::Left);
        assert!((options.line_height_px(1.0) - 45.2).abs() < 1e-9);
        assert!(LayoutOptions::default().default_line_height(0.0).is_err());
    }

    #[test]
    fn test_line_heights_use_overrides() {
        let mut buffer = TextBuffer::with_text("a\nb");
        buffer
            .set_paragraph_style(1, Some(ParagraphStyle::line_height(2.0).unwrap()))
            .unwrap();
        let options = LayoutOptions::default()
            .font_size(10.0)
            .font_size_mult(1.0)
            .default_line_height(1.0)
            .unwrap();

        let view = LayoutView::new(&buffer).options(options);
        let layout = view.layout().unwrap();
        assert_eq!(layout.heights.as_slice(), &[10.0, 20.0]);
        assert_eq!(layout.heights.total(), 30.0);
        assert_eq!(layout.heights.top_of(1), Some(10.0));
        assert_eq!(layout.heights.top_of(2), None);
    }
}
