//! Space stretching and alignment decisions for justified text.

use super::line_meta::LineMeta;
use crate::style::TextAlign;

/// How a renderer should place one visual line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineAlignment {
    /// Alignment to render with.
    pub align: TextAlign,
    /// Whether inter-word spaces are stretched to fill the box.
    pub stretch: bool,
}

/// Check if a line's spaces should be stretched.
///
/// The last line of a paragraph is never stretched, whatever ends it.
#[must_use]
pub fn should_stretch(align: TextAlign, line: &LineMeta) -> bool {
    align.is_justify() && !line.is_last_line_of_paragraph()
}

/// Alignment the renderer should use for a line.
#[must_use]
pub fn effective_align(align: TextAlign, line: &LineMeta) -> TextAlign {
    if should_stretch(align, line) {
        align
    } else {
        align.unstretched()
    }
}

/// Resolve both placement decisions for a line.
#[must_use]
pub fn line_alignment(align: TextAlign, line: &LineMeta) -> LineAlignment {
    LineAlignment {
        align: effective_align(align, line),
        stretch: should_stretch(align, line),
    }
}

/// Horizontal start offset of a line inside its box.
#[must_use]
pub fn line_offset(align: TextAlign, box_width: f64, line_width: f64) -> f64 {
    let slack = (box_width - line_width).max(0.0);
    match align {
        TextAlign::Center => slack / 2.0,
        TextAlign::Right => slack,
        _ => 0.0,
    }
}

/// Extra width added to each inter-word gap of a stretched line.
#[must_use]
pub fn space_stretch(box_width: f64, line_width: f64, gaps: usize) -> f64 {
    if gaps == 0 || line_width >= box_width {
        return 0.0;
    }
    (box_width - line_width) / gaps as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LineFlags;

    fn line(flags: LineFlags) -> LineMeta {
        LineMeta {
            paragraph_index: 0,
            start: 0,
            end: 4,
            flags,
        }
    }

    #[test]
    fn test_last_line_never_stretches() {
        let last = line(LineFlags::LAST_LINE_OF_PARAGRAPH);
        let hard_last = line(LineFlags::LAST_LINE_OF_PARAGRAPH | LineFlags::HARD_BREAK_END);
        for align in TextAlign::ALL {
            assert!(!should_stretch(align, &last), "{align}");
            assert!(!should_stretch(align, &hard_last), "{align}");
        }
    }

    #[test]
    fn test_soft_wrapped_justify_stretches() {
        let soft = line(LineFlags::empty());
        assert!(should_stretch(TextAlign::Justify, &soft));
        assert!(should_stretch(TextAlign::JustifyCenter, &soft));
        assert!(!should_stretch(TextAlign::Center, &soft));
        assert_eq!(effective_align(TextAlign::JustifyRight, &soft), TextAlign::JustifyRight);
    }

    #[test]
    fn test_last_line_fallback() {
        let last = line(LineFlags::LAST_LINE_OF_PARAGRAPH);
        assert_eq!(effective_align(TextAlign::Justify, &last), TextAlign::Left);
        assert_eq!(effective_align(TextAlign::JustifyLeft, &last), TextAlign::Left);
        assert_eq!(effective_align(TextAlign::JustifyCenter, &last), TextAlign::Center);
        assert_eq!(effective_align(TextAlign::JustifyRight, &last), TextAlign::Right);
        assert_eq!(effective_align(TextAlign::Right, &last), TextAlign::Right);

        let placement = line_alignment(TextAlign::JustifyCenter, &last);
        assert_eq!(placement.align, TextAlign::Center);
        assert!(!placement.stretch);
    }

    #[test]
    fn test_line_offset() {
        assert_eq!(line_offset(TextAlign::Left, 100.0, 60.0), 0.0);
        assert_eq!(line_offset(TextAlign::Center, 100.0, 60.0), 20.0);
        assert_eq!(line_offset(TextAlign::Right, 100.0, 60.0), 40.0);
        assert_eq!(line_offset(TextAlign::Justify, 100.0, 60.0), 0.0);
        assert_eq!(line_offset(TextAlign::Right, 50.0, 60.0), 0.0);
    }

    #[test]
    fn test_space_stretch() {
        assert_eq!(space_stretch(100.0, 80.0, 4), 5.0);
        assert_eq!(space_stretch(100.0, 80.0, 0), 0.0);
        assert_eq!(space_stretch(100.0, 120.0, 3), 0.0);
    }
}
