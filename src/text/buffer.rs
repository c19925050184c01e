//! Text buffer with synchronized paragraph records.
//!
//! This module provides [`TextBuffer`], a rope-backed text storage that owns
//! the paragraph store for its text. Every mutation runs the paragraph
//! synchronizer before returning, so the store always has one record per
//! paragraph. For editing with a cursor and undo, see
//! [`EditBuffer`](super::EditBuffer).

use std::cell::{Ref, RefCell};
use std::ops::Range;

use smol_str::SmolStr;
use tracing::trace;

use crate::error::{Error, Result};
use crate::paragraph::{
    IdGenerator, ParagraphId, ParagraphRange, ParagraphRecord, ParagraphStore, SyncChange,
    Synchronizer, build_ranges, range_index_at,
};
use crate::style::ParagraphStyle;
use crate::text::rope::RopeWrapper;

#[derive(Clone, Debug, Default)]
struct RangeCache {
    revision: Option<u64>,
    ranges: Vec<ParagraphRange>,
}

/// Text buffer with paragraph-level style records.
///
/// `TextBuffer` uses a rope internally for O(log n) insertions and deletions
/// and keeps a [`ParagraphStore`] in step with the text:
///
/// - Inserting a `'\n'` splits the paragraph it lands in; both halves keep
///   the paragraph's style and the leading half keeps its id
/// - Removing a `'\n'` merges two paragraphs; the earlier one wins
/// - Paragraphs away from the edit keep their id and style
///
/// Derived paragraph ranges are cached by revision and rebuilt on demand.
#[derive(Clone, Debug)]
pub struct TextBuffer {
    rope: RopeWrapper,
    paragraphs: ParagraphStore,
    ids: IdGenerator,
    revision: u64,
    range_cache: RefCell<RangeCache>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// Create an empty text buffer with a single empty paragraph.
    #[must_use]
    pub fn new() -> Self {
        Self::with_text("")
    }

    /// Create a buffer with initial text and default paragraph records.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self::from_parts(text, ParagraphStore::new(), IdGenerator::new())
    }

    /// Create a buffer from text and existing paragraph records.
    ///
    /// The id generator is advanced past every record id. If the record count
    /// disagrees with the text, records are added or dropped at the end.
    #[must_use]
    pub fn from_parts(text: &str, paragraphs: ParagraphStore, mut ids: IdGenerator) -> Self {
        for record in &paragraphs {
            ids.observe(&record.id);
        }
        let mut buffer = Self {
            rope: RopeWrapper::from_str(text),
            paragraphs,
            ids,
            revision: 0,
            range_cache: RefCell::new(RangeCache::default()),
        };
        buffer.sync(None);
        buffer
    }

    /// Use a custom prefix for ids generated from now on.
    ///
    /// The id counter carries over, so ids dropped by earlier merges stay
    /// retired.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<SmolStr>) -> Self {
        self.ids.set_prefix(prefix);
        for record in &self.paragraphs {
            self.ids.observe(&record.id);
        }
        self
    }

    /// Replace the text. Paragraph records are kept from the start and
    /// added or dropped at the end.
    pub fn set_text(&mut self, text: &str) {
        self.rope.replace(text);
        self.bump_revision();
        self.sync(None);
    }

    /// Insert text at a char offset.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<SyncChange> {
        self.rope.insert(offset, text)?;
        self.bump_revision();
        Ok(self.sync(Some(offset)))
    }

    /// Delete a char range, returning the removed text.
    pub fn delete(&mut self, range: Range<usize>) -> Result<String> {
        let start = range.start;
        let removed = self.rope.remove(range)?;
        if !removed.is_empty() {
            self.bump_revision();
            self.sync(Some(start));
        }
        Ok(removed)
    }

    /// Replace a char range with text, returning the removed text.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<String> {
        let start = range.start;
        let removed = self.delete(range)?;
        self.insert(start, text)?;
        Ok(removed)
    }

    fn sync(&mut self, offset: Option<usize>) -> SyncChange {
        let target = self.rope.count_separators() + 1;
        let anchor = offset.map(|offset| self.rope.separators_before(offset));
        let change =
            Synchronizer::new(&mut self.paragraphs, &mut self.ids).resize(target, anchor);
        if !change.is_unchanged() {
            self.bump_revision();
        }
        change
    }

    /// Get the number of characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    /// Get the underlying rope.
    #[must_use]
    pub fn rope(&self) -> &RopeWrapper {
        &self.rope
    }

    /// Get the buffer revision (increments on text or paragraph changes).
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Get the paragraph records.
    #[must_use]
    pub fn paragraphs(&self) -> &ParagraphStore {
        &self.paragraphs
    }

    /// Number of paragraphs.
    #[must_use]
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Get the id generator.
    #[must_use]
    pub fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }

    /// Check the paragraph count invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.paragraphs.len() == self.rope.count_separators() + 1
    }

    /// Char ranges of every paragraph, in order.
    pub fn paragraph_ranges(&self) -> Ref<'_, [ParagraphRange]> {
        let stale = self.range_cache.borrow().revision != Some(self.revision);
        if stale {
            let separators = self.rope.separator_offsets();
            let ranges = build_ranges(&separators, self.rope.len_chars(), &self.paragraphs);
            trace!(
                revision = self.revision,
                count = ranges.len(),
                "rebuilt paragraph ranges"
            );
            *self.range_cache.borrow_mut() = RangeCache {
                revision: Some(self.revision),
                ranges,
            };
        }
        Ref::map(self.range_cache.borrow(), |cache| cache.ranges.as_slice())
    }

    /// Index of the paragraph owning a char offset.
    ///
    /// The offset of a `'\n'` belongs to the paragraph it terminates.
    pub fn paragraph_index_at(&self, offset: usize) -> Result<usize> {
        self.rope.check_offset(offset)?;
        Ok(self.rope.separators_before(offset))
    }

    /// Record of the paragraph owning a char offset.
    pub fn paragraph_at(&self, offset: usize) -> Result<&ParagraphRecord> {
        let index = self.paragraph_index_at(offset)?;
        self.paragraph(index)
    }

    /// Record of the paragraph at `index`.
    pub fn paragraph(&self, index: usize) -> Result<&ParagraphRecord> {
        self.paragraphs
            .get(index)
            .ok_or(Error::ParagraphOutOfBounds {
                index,
                count: self.paragraphs.len(),
            })
    }

    /// Indices of every paragraph touched by a char span.
    ///
    /// An empty span touches the paragraph under it. Otherwise the span end is
    /// exclusive, so a span ending right after a separator stops at the
    /// paragraph that separator terminates.
    pub fn paragraph_indices_in(&self, range: Range<usize>) -> Result<Range<usize>> {
        self.rope.check_range(&range)?;
        let ranges = self.paragraph_ranges();
        let first = range_index_at(&ranges, range.start).unwrap_or(0);
        let last_char = if range.is_empty() {
            range.end
        } else {
            range.end - 1
        };
        let last = range_index_at(&ranges, last_char).unwrap_or(first);
        Ok(first..last + 1)
    }

    /// Current index of a paragraph by stable id.
    #[must_use]
    pub fn position_of(&self, id: &ParagraphId) -> Option<usize> {
        self.paragraphs.position_of(id)
    }

    /// Replace the style of one paragraph.
    pub fn set_paragraph_style(
        &mut self,
        index: usize,
        style: Option<ParagraphStyle>,
    ) -> Result<()> {
        self.paragraphs.set_style(index, style)?;
        self.bump_revision();
        Ok(())
    }

    /// Overlay `patch` on the style of one paragraph.
    pub fn update_paragraph_style(&mut self, index: usize, patch: ParagraphStyle) -> Result<()> {
        self.paragraphs.update_style(index, patch)?;
        self.bump_revision();
        Ok(())
    }

    /// Remove every style override from one paragraph.
    pub fn clear_paragraph_style(&mut self, index: usize) -> Result<()> {
        self.set_paragraph_style(index, None)
    }

    /// Overlay `patch` on every paragraph touched by a char span.
    ///
    /// Returns the indices that were updated.
    pub fn apply_style_to_range(
        &mut self,
        range: Range<usize>,
        patch: ParagraphStyle,
    ) -> Result<Range<usize>> {
        let indices = self.paragraph_indices_in(range)?;
        for index in indices.clone() {
            self.paragraphs.update_style(index, patch)?;
        }
        self.bump_revision();
        Ok(indices)
    }

    /// Restore a paragraph store snapshot taken at the current text.
    pub(crate) fn restore_paragraphs(&mut self, snapshot: ParagraphStore) {
        for record in &snapshot {
            self.ids.observe(&record.id);
        }
        self.paragraphs = snapshot;
        self.bump_revision();
        self.sync(None);
    }

    /// Convert to plain string.
    #[must_use]
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::TextAlign;

    fn aligned(text: &str, aligns: &[TextAlign]) -> TextBuffer {
        let mut buffer = TextBuffer::with_text(text);
        for (i, &align) in aligns.iter().enumerate() {
            buffer
                .set_paragraph_style(i, Some(ParagraphStyle::align(align)))
                .unwrap();
        }
        buffer
    }

    fn aligns(buffer: &TextBuffer) -> Vec<Option<TextAlign>> {
        buffer
            .paragraphs()
            .iter()
            .map(|record| record.style.and_then(|style| style.align))
            .collect()
    }

    #[test]
    fn test_buffer_basic() {
        let buffer = TextBuffer::new();
        assert_eq!(buffer.paragraph_count(), 1);
        assert!(buffer.is_empty());

        let buffer = TextBuffer::with_text("a\nb\nc");
        assert_eq!(buffer.len_chars(), 5);
        assert_eq!(buffer.paragraph_count(), 3);
        assert!(buffer.is_consistent());
    }

    #[test]
    fn test_insert_splits_with_style() {
        use TextAlign::*;
        let mut buffer = aligned("aaa\nbbb\nccc", &[Left, Center, Right]);
        let change = buffer.insert(1, "\n").unwrap();
        assert_eq!(change, SyncChange::Split { index: 0, created: 1 });
        assert_eq!(buffer.to_string(), "a\naa\nbbb\nccc");
        assert_eq!(aligns(&buffer), vec![Some(Left), Some(Left), Some(Center), Some(Right)]);
    }

    #[test]
    fn test_insert_plain_text_is_unchanged() {
        let mut buffer = TextBuffer::with_text("abc\ndef");
        let ids: Vec<_> = buffer.paragraphs().iter().map(|r| r.id.clone()).collect();
        let change = buffer.insert(5, "xyz").unwrap();
        assert!(change.is_unchanged());
        let after: Vec<_> = buffer.paragraphs().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, after);
    }

    #[test]
    fn test_delete_merges_earlier_wins() {
        use TextAlign::*;
        let mut buffer = aligned("aaa\nbbb\nccc", &[Left, Center, Right]);
        let removed = buffer.delete(7..8).unwrap();
        assert_eq!(removed, "\n");
        assert_eq!(buffer.to_string(), "aaa\nbbbccc");
        assert_eq!(aligns(&buffer), vec![Some(Left), Some(Center)]);
    }

    #[test]
    fn test_delete_whole_first_paragraph() {
        use TextAlign::*;
        let mut buffer = aligned("aaa\nbbb", &[Left, Center]);
        buffer.delete(0..4).unwrap();
        assert_eq!(buffer.to_string(), "bbb");
        assert_eq!(aligns(&buffer), vec![Some(Left)]);
    }

    #[test]
    fn test_replace_across_paragraphs() {
        use TextAlign::*;
        let mut buffer = aligned("aa\nbb\ncc", &[Left, Center, Right]);
        buffer.replace(1..7, "X\nY").unwrap();
        assert_eq!(buffer.to_string(), "aX\nYc");
        assert_eq!(aligns(&buffer), vec![Some(Left), Some(Left)]);
    }

    #[test]
    fn test_out_of_range_edits() {
        let mut buffer = TextBuffer::with_text("abc");
        assert!(matches!(
            buffer.insert(4, "x"),
            Err(Error::OffsetOutOfBounds { offset: 4, len: 3 })
        ));
        assert!(matches!(
            buffer.delete(2..9),
            Err(Error::InvalidRange { .. })
        ));
        assert_eq!(buffer.to_string(), "abc");
    }

    #[test]
    fn test_paragraph_ranges_cached_by_revision() {
        let mut buffer = TextBuffer::with_text("ab\ncd");
        {
            let ranges = buffer.paragraph_ranges();
            assert_eq!(ranges.len(), 2);
            assert_eq!(ranges[1].chars(), 3..5);
        }
        buffer.insert(0, "\n").unwrap();
        let ranges = buffer.paragraph_ranges();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].chars(), 0..0);
        assert_eq!(ranges[2].chars(), 4..6);
    }

    #[test]
    fn test_paragraph_lookup() {
        let buffer = TextBuffer::with_text("ab\n\ncd");
        assert_eq!(buffer.paragraph_index_at(0).unwrap(), 0);
        assert_eq!(buffer.paragraph_index_at(2).unwrap(), 0);
        assert_eq!(buffer.paragraph_index_at(3).unwrap(), 1);
        assert_eq!(buffer.paragraph_index_at(6).unwrap(), 2);
        assert!(buffer.paragraph_index_at(7).is_err());

        assert_eq!(buffer.paragraph_indices_in(0..0).unwrap(), 0..1);
        assert_eq!(buffer.paragraph_indices_in(1..5).unwrap(), 0..3);
        assert_eq!(buffer.paragraph_indices_in(3..4).unwrap(), 1..2);
        assert_eq!(buffer.paragraph_indices_in(0..3).unwrap(), 0..1);
        assert_eq!(buffer.paragraph_indices_in(4..4).unwrap(), 2..3);

        let id = buffer.paragraph(2).unwrap().id.clone();
        assert_eq!(buffer.position_of(&id), Some(2));
        assert_eq!(buffer.paragraph_at(5).unwrap().id, id);
    }

    #[test]
    fn test_apply_style_to_range() {
        let mut buffer = TextBuffer::with_text("one\ntwo\nthree");
        let touched = buffer
            .apply_style_to_range(2..5, ParagraphStyle::align(TextAlign::Justify))
            .unwrap();
        assert_eq!(touched, 0..2);
        assert_eq!(
            aligns(&buffer),
            vec![Some(TextAlign::Justify), Some(TextAlign::Justify), None]
        );

        buffer
            .apply_style_to_range(0..13, ParagraphStyle::line_height(2.0).unwrap())
            .unwrap();
        let first = buffer.paragraph(0).unwrap().style.unwrap();
        assert_eq!(first.align, Some(TextAlign::Justify));
        assert_eq!(first.line_height, Some(2.0));
        assert_eq!(buffer.paragraph(2).unwrap().style.unwrap().align, None);
    }

    #[test]
    fn test_style_changes_bump_revision() {
        let mut buffer = TextBuffer::with_text("a");
        let rev = buffer.revision();
        buffer
            .set_paragraph_style(0, Some(ParagraphStyle::align(TextAlign::Center)))
            .unwrap();
        assert!(buffer.revision() > rev);
        buffer.clear_paragraph_style(0).unwrap();
        assert_eq!(buffer.paragraph(0).unwrap().style, None);
    }

    #[test]
    fn test_set_text_keeps_leading_records() {
        use TextAlign::*;
        let mut buffer = aligned("a\nb\nc", &[Left, Center, Right]);
        let first = buffer.paragraph(0).unwrap().id.clone();
        buffer.set_text("x\ny");
        assert_eq!(aligns(&buffer), vec![Some(Left), Some(Center)]);
        assert_eq!(buffer.paragraph(0).unwrap().id, first);
    }

    #[test]
    fn test_from_parts_skips_loaded_ids() {
        let store = ParagraphStore::from_records(vec![ParagraphRecord::new(ParagraphId::from(
            "p-9",
        ))]);
        let mut buffer = TextBuffer::from_parts("a", store, IdGenerator::new());
        buffer.insert(1, "\n").unwrap();
        assert_eq!(buffer.paragraph(1).unwrap().id.as_str(), "p-10");
    }

    #[test]
    fn test_custom_id_prefix() {
        let mut buffer = TextBuffer::with_text("a").with_id_prefix("para");
        buffer.insert(1, "\n").unwrap();
        assert_eq!(buffer.paragraph(1).unwrap().id.as_str(), "para-1");
        assert_eq!(buffer.id_generator().prefix(), "para");
    }

    #[test]
    fn test_id_prefix_change_keeps_retired_ids() {
        let mut buffer = TextBuffer::with_text("a").with_id_prefix("para");
        buffer.insert(1, "\n").unwrap();
        let merged = buffer.paragraph(1).unwrap().id.clone();
        buffer.delete(1..2).unwrap();
        assert_eq!(buffer.paragraph_count(), 1);

        let mut buffer = buffer.with_id_prefix("para");
        buffer.insert(1, "\n").unwrap();
        assert_ne!(buffer.paragraph(1).unwrap().id, merged);
        assert_eq!(buffer.paragraph(1).unwrap().id.as_str(), "para-2");
    }
}
