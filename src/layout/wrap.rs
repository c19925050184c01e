//! Wrap engine seam and a column-based reference wrapper.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::paragraph::SEPARATOR;

/// Text wrapping mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// No wrapping - one visual line per paragraph.
    #[default]
    None,
    /// Wrap at character boundaries.
    Char,
    /// Wrap at word boundaries.
    Word,
}

/// Width calculation method for ambiguous-width characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WidthMethod {
    /// POSIX-like wcwidth: ambiguous width = 1.
    #[default]
    WcWidth,
    /// Unicode East Asian Width: ambiguous width = 2.
    Unicode,
}

impl WidthMethod {
    fn width(self, s: &str) -> usize {
        match self {
            Self::WcWidth => UnicodeWidthStr::width(s),
            Self::Unicode => UnicodeWidthStr::width_cjk(s),
        }
    }
}

/// A wrapped line as a char span of the text.
///
/// The span never includes the paragraph separator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VisualLine {
    pub start: usize,
    pub end: usize,
}

impl VisualLine {
    /// Create a visual line.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in chars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the line is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Wrap engine: splits text into ordered visual lines.
pub trait LineWrapper {
    fn wrap(&self, text: &str) -> Vec<VisualLine>;
}

impl<F> LineWrapper for F
where
    F: Fn(&str) -> Vec<VisualLine>,
{
    fn wrap(&self, text: &str) -> Vec<VisualLine> {
        self(text)
    }
}

/// Wraps each paragraph to a fixed number of display columns.
///
/// Widths come from grapheme clusters and Unicode display width, so wide
/// (CJK) characters take two columns. Every paragraph yields at least one
/// visual line; an empty paragraph yields one zero-length line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MonospaceWrapper {
    mode: WrapMode,
    width: usize,
    tab_width: usize,
    width_method: WidthMethod,
}

impl Default for MonospaceWrapper {
    fn default() -> Self {
        Self::new(WrapMode::None, 0)
    }
}

impl MonospaceWrapper {
    /// Create a wrapper. A `width` of 0 disables wrapping.
    #[must_use]
    pub fn new(mode: WrapMode, width: usize) -> Self {
        Self {
            mode,
            width,
            tab_width: 4,
            width_method: WidthMethod::default(),
        }
    }

    /// Set tab width.
    #[must_use]
    pub fn tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    /// Set width calculation method.
    #[must_use]
    pub fn width_method(mut self, method: WidthMethod) -> Self {
        self.width_method = method;
        self
    }

    /// Return a copy with a different wrap mode.
    #[must_use]
    pub fn with_mode(mut self, mode: WrapMode) -> Self {
        self.mode = mode;
        self
    }

    /// Return a copy with a different wrap width.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Wrap mode.
    #[must_use]
    pub fn mode(&self) -> WrapMode {
        self.mode
    }

    /// Wrap width in columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    fn wrap_paragraph(&self, line: &str, base: usize, lines: &mut Vec<VisualLine>) {
        let len = line.chars().count();
        if len == 0 || self.mode == WrapMode::None || self.width == 0 {
            lines.push(VisualLine::new(base, base + len));
            return;
        }

        let wrap_width = self.width;
        let tab_width = self.tab_width.max(1);

        // (char offset within paragraph, grapheme)
        let mut graphemes: Vec<(usize, &str)> = Vec::new();
        let mut offset = 0usize;
        for grapheme in line.graphemes(true) {
            graphemes.push((offset, grapheme));
            offset += grapheme.chars().count();
        }

        let first = lines.len();
        let mut start = 0usize;
        let mut current_width = 0usize;
        let mut last_break: Option<(usize, usize)> = None; // (break char, index)
        let mut i = 0usize;

        while i < graphemes.len() {
            let (char_idx, grapheme) = graphemes[i];
            let g_width = if grapheme == "\t" {
                tab_width - current_width % tab_width
            } else {
                self.width_method.width(grapheme)
            };

            let is_ws = grapheme.chars().all(char::is_whitespace);
            if current_width + g_width > wrap_width && current_width > 0 {
                let (break_char, break_index) = match (self.mode, last_break) {
                    (WrapMode::Word, Some(found)) => found,
                    _ => (char_idx, i),
                };

                lines.push(VisualLine::new(base + start, base + break_char));

                start = break_char;
                current_width = 0;
                last_break = None;
                i = break_index;

                if self.mode == WrapMode::Word {
                    while let Some(&(c, g)) = graphemes.get(i) {
                        if !g.chars().all(char::is_whitespace) {
                            break;
                        }
                        start = c + g.chars().count();
                        i += 1;
                    }
                }
                continue;
            }

            current_width += g_width;
            i += 1;
            if self.mode == WrapMode::Word && is_ws {
                last_break = Some((char_idx + grapheme.chars().count(), i));
            }
        }

        if start < len || lines.len() == first {
            lines.push(VisualLine::new(base + start, base + len));
        } else if let Some(last) = lines.last_mut() {
            // Trailing whitespace hangs off the final line
            last.end = base + len;
        }
    }
}

impl LineWrapper for MonospaceWrapper {
    fn wrap(&self, text: &str) -> Vec<VisualLine> {
        let mut lines = Vec::new();
        let mut base = 0usize;
        for paragraph in text.split(SEPARATOR) {
            self.wrap_paragraph(paragraph, base, &mut lines);
            base += paragraph.chars().count() + 1;
        }
        lines
    }
}
