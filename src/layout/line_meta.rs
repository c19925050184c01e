//! Mapping of visual lines onto paragraphs.

use std::ops::Range;

use bitflags::bitflags;

use super::wrap::VisualLine;
use crate::error::{Error, Result};
use crate::paragraph::ParagraphRange;

bitflags! {
    /// Role of a visual line within its paragraph.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct LineFlags: u8 {
        /// The line ends at an explicit `'\n'`.
        const HARD_BREAK_END         = 0x01;
        /// No later visual line belongs to the same paragraph.
        const LAST_LINE_OF_PARAGRAPH = 0x02;
    }
}

/// Derived metadata for one visual line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineMeta {
    pub paragraph_index: usize,
    pub start: usize,
    pub end: usize,
    pub flags: LineFlags,
}

impl LineMeta {
    /// Check if the line ends at an explicit separator.
    #[must_use]
    pub fn is_hard_break_end(&self) -> bool {
        self.flags.contains(LineFlags::HARD_BREAK_END)
    }

    /// Check if the line is the final visual line of its paragraph.
    #[must_use]
    pub fn is_last_line_of_paragraph(&self) -> bool {
        self.flags.contains(LineFlags::LAST_LINE_OF_PARAGRAPH)
    }

    /// Char span of the line.
    #[must_use]
    pub fn chars(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Build line metadata from ordered visual lines and paragraph ranges.
///
/// A paragraph without any visual line gets a zero-length line at its start,
/// so every paragraph has exactly one last line.
pub fn build_line_meta(lines: &[VisualLine], paragraphs: &[ParagraphRange]) -> Result<Vec<LineMeta>> {
    let mut out: Vec<LineMeta> = Vec::with_capacity(lines.len().max(paragraphs.len()));
    let mut p = 0usize;
    let mut covered = false;
    let mut prev_end = 0usize;

    for (index, line) in lines.iter().enumerate() {
        if line.start > line.end {
            return Err(Error::InvalidLineRange {
                index,
                reason: "line starts after it ends",
            });
        }
        if line.start < prev_end {
            return Err(Error::InvalidLineRange {
                index,
                reason: "lines are out of order or overlap",
            });
        }

        while p < paragraphs.len() && line.start > paragraphs[p].end {
            if !covered {
                out.push(synthesized(p, &paragraphs[p]));
            }
            p += 1;
            covered = false;
        }

        let Some(range) = paragraphs.get(p) else {
            return Err(Error::InvalidLineRange {
                index,
                reason: "line starts past the end of the text",
            });
        };
        if line.end > range.end {
            return Err(Error::InvalidLineRange {
                index,
                reason: "line spans a paragraph separator",
            });
        }

        let mut flags = LineFlags::empty();
        if range.hard_break && line.end == range.end {
            flags |= LineFlags::HARD_BREAK_END;
        }
        out.push(LineMeta {
            paragraph_index: p,
            start: line.start,
            end: line.end,
            flags,
        });
        covered = true;
        prev_end = line.end;
    }

    while p < paragraphs.len() {
        if !covered {
            out.push(synthesized(p, &paragraphs[p]));
        }
        p += 1;
        covered = false;
    }

    for i in 0..out.len() {
        let last = out
            .get(i + 1)
            .is_none_or(|next| next.paragraph_index != out[i].paragraph_index);
        if last {
            out[i].flags |= LineFlags::LAST_LINE_OF_PARAGRAPH;
        }
    }

    Ok(out)
}

fn synthesized(paragraph_index: usize, range: &ParagraphRange) -> LineMeta {
    let mut flags = LineFlags::empty();
    if range.hard_break && range.is_empty() {
        flags |= LineFlags::HARD_BREAK_END;
    }
    LineMeta {
        paragraph_index,
        start: range.start,
        end: range.start,
        flags,
    }
}

/// Line metadata with renderer-facing queries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineMetaTable {
    lines: Vec<LineMeta>,
}

impl LineMetaTable {
    /// Build a table from visual lines and paragraph ranges.
    pub fn build(lines: &[VisualLine], paragraphs: &[ParagraphRange]) -> Result<Self> {
        build_line_meta(lines, paragraphs).map(|lines| Self { lines })
    }

    /// Number of visual lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Metadata of one line.
    #[must_use]
    pub fn get(&self, line: usize) -> Option<&LineMeta> {
        self.lines.get(line)
    }

    /// Iterate over line metadata in order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineMeta> {
        self.lines.iter()
    }

    /// All line metadata in order.
    #[must_use]
    pub fn as_slice(&self) -> &[LineMeta] {
        &self.lines
    }

    /// Paragraph index owning a line.
    #[must_use]
    pub fn paragraph_of_line(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(|meta| meta.paragraph_index)
    }

    /// Check if a line is the last line of its paragraph.
    #[must_use]
    pub fn is_last_line(&self, line: usize) -> Option<bool> {
        self.lines.get(line).map(LineMeta::is_last_line_of_paragraph)
    }

    /// Range of line indices belonging to a paragraph.
    #[must_use]
    pub fn lines_of_paragraph(&self, paragraph: usize) -> Range<usize> {
        let start = self
            .lines
            .partition_point(|meta| meta.paragraph_index < paragraph);
        let end = self
            .lines
            .partition_point(|meta| meta.paragraph_index <= paragraph);
        start..end
    }

    /// Index of the visual line containing a char offset.
    ///
    /// An offset on a soft wrap boundary belongs to the following line.
    #[must_use]
    pub fn line_at(&self, offset: usize) -> Option<usize> {
        let idx = self.lines.partition_point(|meta| meta.end < offset);
        let mut line = idx;
        while let Some(next) = self.lines.get(line + 1) {
            if next.start <= offset && next.start == self.lines[line].end {
                line += 1;
            } else {
                break;
            }
        }
        self.lines
            .get(line)
            .filter(|meta| meta.start <= offset && offset <= meta.end)
            .map(|_| line)
    }
}

impl<'a> IntoIterator for &'a LineMetaTable {
    type Item = &'a LineMeta;
    type IntoIter = std::slice::Iter<'a, LineMeta>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
