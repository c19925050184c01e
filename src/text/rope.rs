//! Rope wrapper using the ropey crate.
//!
//! ropey's own line API breaks on every Unicode line terminator. Paragraphs
//! are separated by `'\n'` only, so separator queries here scan chars.

use ropey::{Rope, RopeSlice};
use std::ops::Range;

use crate::error::{Error, Result};
use crate::paragraph::SEPARATOR;

/// Wrapper around ropey::Rope with checked edits and separator queries.
#[derive(Clone, Debug, Default)]
pub struct RopeWrapper {
    rope: Rope,
}

impl RopeWrapper {
    /// Create an empty rope.
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Create a rope from a string.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
        }
    }

    /// Get the number of characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Get a slice of the rope, or `None` if the range is invalid.
    #[must_use]
    pub fn get_slice(&self, range: Range<usize>) -> Option<RopeSlice<'_>> {
        self.rope.get_slice(range)
    }

    /// Get a slice of the rope, empty if the range is invalid.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> RopeSlice<'_> {
        self.rope
            .get_slice(range)
            .unwrap_or_else(|| self.rope.slice(..0))
    }

    /// Insert text at a character position.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Result<()> {
        self.check_offset(char_idx)?;
        self.rope.insert(char_idx, text);
        Ok(())
    }

    /// Remove a range of characters, returning the removed text.
    pub fn remove(&mut self, range: Range<usize>) -> Result<String> {
        self.check_range(&range)?;
        let removed = self.rope.slice(range.clone()).to_string();
        self.rope.remove(range);
        Ok(removed)
    }

    /// Replace the entire contents.
    pub fn replace(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Convert to string.
    #[must_use]
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    /// Char offsets of every paragraph separator.
    #[must_use]
    pub fn separator_offsets(&self) -> Vec<usize> {
        self.rope
            .chars()
            .enumerate()
            .filter_map(|(i, ch)| (ch == SEPARATOR).then_some(i))
            .collect()
    }

    /// Total number of paragraph separators.
    #[must_use]
    pub fn count_separators(&self) -> usize {
        self.rope.chars().filter(|&ch| ch == SEPARATOR).count()
    }

    /// Number of separators strictly before `char_idx`.
    #[must_use]
    pub fn separators_before(&self, char_idx: usize) -> usize {
        self.slice(0..char_idx.min(self.len_chars()))
            .chars()
            .filter(|&ch| ch == SEPARATOR)
            .count()
    }

    /// Fail unless `char_idx` is a valid insertion point.
    pub fn check_offset(&self, char_idx: usize) -> Result<()> {
        let len = self.len_chars();
        if char_idx > len {
            return Err(Error::OffsetOutOfBounds {
                offset: char_idx,
                len,
            });
        }
        Ok(())
    }

    /// Fail unless `range` is an ordered span within the text.
    pub fn check_range(&self, range: &Range<usize>) -> Result<()> {
        let len = self.len_chars();
        if range.start > range.end || range.end > len {
            return Err(Error::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }
        Ok(())
    }

    /// Get access to the underlying rope.
    #[must_use]
    pub fn inner(&self) -> &Rope {
        &self.rope
    }
}
