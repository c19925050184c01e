//! Paragraph styling: alignment and line height.
//!
//! This module provides the style values carried by each paragraph record:
//!
//! - [`TextAlign`]: Horizontal alignment, including the justify family
//! - [`ParagraphStyle`]: Optional alignment and line-height overrides
//!
//! Absent fields mean "inherit the buffer default". Styles are plain values:
//! copying a style onto a new paragraph never shares state with the source.
//!
//! # Examples
//!
//! ```
//! use paraflow::{ParagraphStyle, TextAlign};
//!
//! let style = ParagraphStyle::align(TextAlign::Center)
//!     .with_line_height(1.5)
//!     .unwrap();
//! assert_eq!(style.align, Some(TextAlign::Center));
//!
//! // Overlay keeps fields the patch leaves unset
//! let patched = style.merge(ParagraphStyle::align(TextAlign::Justify));
//! assert_eq!(patched.align, Some(TextAlign::Justify));
//! assert_eq!(patched.line_height, Some(1.5));
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizontal paragraph alignment.
///
/// The `Justify*` variants stretch inter-word space on every visual line
/// except the last line of the paragraph, which is laid out with the
/// alignment named by the suffix (`Justify` falls back to left).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
}

impl TextAlign {
    /// All alignments in declaration order.
    pub const ALL: [TextAlign; 7] = [
        Self::Left,
        Self::Center,
        Self::Right,
        Self::Justify,
        Self::JustifyLeft,
        Self::JustifyCenter,
        Self::JustifyRight,
    ];

    /// Check if this alignment belongs to the justify family.
    #[must_use]
    pub const fn is_justify(self) -> bool {
        matches!(
            self,
            Self::Justify | Self::JustifyLeft | Self::JustifyCenter | Self::JustifyRight
        )
    }

    /// Alignment used for lines that are not stretched.
    #[must_use]
    pub const fn unstretched(self) -> Self {
        match self {
            Self::Justify | Self::JustifyLeft => Self::Left,
            Self::JustifyCenter => Self::Center,
            Self::JustifyRight => Self::Right,
            other => other,
        }
    }

    /// Persisted name of the alignment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
            Self::JustifyLeft => "justify-left",
            Self::JustifyCenter => "justify-center",
            Self::JustifyRight => "justify-right",
        }
    }

    /// Parse a persisted alignment name.
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|align| align.as_str() == s)
    }
}

impl fmt::Display for TextAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-paragraph style overrides.
///
/// # Default Values
///
/// The default style has no overrides: the paragraph uses the alignment and
/// line height configured in [`LayoutOptions`](crate::layout::LayoutOptions).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StyleRepr")]
pub struct ParagraphStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
}

impl ParagraphStyle {
    /// Style with no overrides.
    pub const NONE: Self = Self {
        align: None,
        line_height: None,
    };

    /// Style with only an alignment override.
    #[must_use]
    pub const fn align(align: TextAlign) -> Self {
        Self {
            align: Some(align),
            line_height: None,
        }
    }

    /// Style with only a line-height override.
    pub fn line_height(line_height: f64) -> Result<Self> {
        Self::NONE.with_line_height(line_height)
    }

    /// Return a copy with the alignment set.
    #[must_use]
    pub const fn with_align(mut self, align: TextAlign) -> Self {
        self.align = Some(align);
        self
    }

    /// Return a copy with the line height set.
    ///
    /// Fails unless `line_height` is positive and finite.
    pub fn with_line_height(mut self, line_height: f64) -> Result<Self> {
        self.line_height = Some(validate_line_height(line_height)?);
        Ok(self)
    }

    /// Check if no field is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.align.is_none() && self.line_height.is_none()
    }

    /// Overlay `other` on top of this style. Fields set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            align: other.align.or(self.align),
            line_height: other.line_height.or(self.line_height),
        }
    }
}

pub(crate) fn validate_line_height(line_height: f64) -> Result<f64> {
    if line_height.is_finite() && line_height > 0.0 {
        Ok(line_height)
    } else {
        Err(Error::InvalidLineHeight(line_height))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StyleRepr {
    #[serde(default)]
    align: Option<TextAlign>,
    #[serde(default)]
    line_height: Option<f64>,
}

impl TryFrom<StyleRepr> for ParagraphStyle {
    type Error = Error;

    fn try_from(repr: StyleRepr) -> Result<Self> {
        let line_height = repr.line_height.map(validate_line_height).transpose()?;
        Ok(Self {
            align: repr.align,
            line_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_justify_family() {
        assert!(!TextAlign::Left.is_justify());
        assert!(!TextAlign::Center.is_justify());
        assert!(!TextAlign::Right.is_justify());
        assert!(TextAlign::Justify.is_justify());
        assert!(TextAlign::JustifyLeft.is_justify());
        assert!(TextAlign::JustifyCenter.is_justify());
        assert!(TextAlign::JustifyRight.is_justify());
    }

    #[test]
    fn test_unstretched_fallback() {
        assert_eq!(TextAlign::Justify.unstretched(), TextAlign::Left);
        assert_eq!(TextAlign::JustifyLeft.unstretched(), TextAlign::Left);
        assert_eq!(TextAlign::JustifyCenter.unstretched(), TextAlign::Center);
        assert_eq!(TextAlign::JustifyRight.unstretched(), TextAlign::Right);
        assert_eq!(TextAlign::Right.unstretched(), TextAlign::Right);
    }

    #[test]
    fn test_align_names() {
        for align in TextAlign::ALL {
            assert_eq!(TextAlign::from_str(align.as_str()), Some(align));
            let json = serde_json::to_string(&align).unwrap();
            assert_eq!(json, format!("\"{align}\""));
        }
        assert_eq!(TextAlign::from_str("middle"), None);
    }

    #[test]
    fn test_line_height_validation() {
        assert!(ParagraphStyle::line_height(1.2).is_ok());
        assert!(matches!(
            ParagraphStyle::line_height(0.0),
            Err(Error::InvalidLineHeight(_))
        ));
        assert!(ParagraphStyle::line_height(-2.0).is_err());
        assert!(ParagraphStyle::line_height(f64::NAN).is_err());
        assert!(ParagraphStyle::line_height(f64::INFINITY).is_err());
    }

    #[test]
    fn test_merge_overlay() {
        let base = ParagraphStyle::align(TextAlign::Right)
            .with_line_height(2.0)
            .unwrap();
        assert_eq!(base.merge(ParagraphStyle::NONE), base);

        let patched = base.merge(ParagraphStyle::line_height(1.0).unwrap());
        assert_eq!(patched.align, Some(TextAlign::Right));
        assert_eq!(patched.line_height, Some(1.0));
    }

    #[test]
    fn test_serde_shape() {
        let style = ParagraphStyle::align(TextAlign::JustifyCenter)
            .with_line_height(1.5)
            .unwrap();
        let json = serde_json::to_string(&style).unwrap();
        assert_eq!(json, r#"{"align":"justify-center","lineHeight":1.5}"#);

        let empty = serde_json::to_string(&ParagraphStyle::NONE).unwrap();
        assert_eq!(empty, "{}");

        let back: ParagraphStyle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, style);
    }

    #[test]
    fn test_serde_rejects_bad_line_height() {
        assert!(serde_json::from_str::<ParagraphStyle>(r#"{"lineHeight":0}"#).is_err());
        assert!(serde_json::from_str::<ParagraphStyle>(r#"{"align":"middle"}"#).is_err());
    }
}
