//! Editable text buffer with cursor, selection, paragraph style commands and
//! undo/redo.
//!
//! This module provides [`EditBuffer`], which wraps a [`TextBuffer`] with
//! editing capabilities: cursor movement, text insertion/deletion, style
//! commands for the paragraph under the cursor or the paragraphs touched by a
//! selection, and grouped undo/redo history.
//!
//! # Examples
//!
//! ```
//! use paraflow::{EditBuffer, TextAlign};
//!
//! let mut buf = EditBuffer::with_text("Hello World");
//! buf.set_align(TextAlign::Center).unwrap();
//! buf.commit(); // Create undo checkpoint
//!
//! // Split the paragraph: both halves stay centered
//! buf.set_cursor_by_offset(5);
//! buf.insert("\n").unwrap();
//! buf.commit();
//! assert_eq!(buf.text(), "Hello\n World");
//! assert_eq!(buf.current_style().align, Some(TextAlign::Center));
//!
//! // Undo restores the single paragraph
//! buf.undo().unwrap();
//! assert_eq!(buf.buffer().paragraph_count(), 1);
//! ```

use std::ops::Range;

use crate::error::Result;
use crate::paragraph::ParagraphStore;
use crate::style::{ParagraphStyle, TextAlign};
use crate::text::TextBuffer;

/// Cursor position in the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Character offset in the buffer.
    pub offset: usize,
    /// Paragraph index (0-indexed).
    pub row: usize,
    /// Character offset within the paragraph (0-indexed).
    pub col: usize,
}

impl Cursor {
    /// Create a new cursor at position.
    #[must_use]
    pub fn new(offset: usize, row: usize, col: usize) -> Self {
        Self { offset, row, col }
    }

    /// Create a cursor at the beginning.
    #[must_use]
    pub fn start() -> Self {
        Self::default()
    }
}

/// A text edit operation for undo/redo.
#[derive(Clone, Debug)]
enum EditOp {
    Insert { offset: usize, text: String },
    Delete { offset: usize, text: String },
}

impl EditOp {
    fn invert(&self) -> Self {
        match self {
            Self::Insert { offset, text } => Self::Delete {
                offset: *offset,
                text: text.clone(),
            },
            Self::Delete { offset, text } => Self::Insert {
                offset: *offset,
                text: text.clone(),
            },
        }
    }
}

/// One undo step: text operations plus paragraph snapshots around them.
///
/// Replaying text operations alone would give recreated paragraphs fresh
/// ids; restoring the snapshots brings back the exact records.
#[derive(Clone, Debug)]
struct UndoGroup {
    ops: Vec<EditOp>,
    before: ParagraphStore,
    after: ParagraphStore,
}

#[derive(Clone, Debug)]
struct PendingGroup {
    ops: Vec<EditOp>,
    before: ParagraphStore,
    restyled: bool,
}

/// Default maximum number of undo groups to retain.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 1000;

/// Edit history for undo/redo with bounded memory usage.
#[derive(Clone, Debug)]
struct History {
    undo_stack: Vec<UndoGroup>,
    redo_stack: Vec<UndoGroup>,
    current_group: Option<PendingGroup>,
    /// Maximum number of undo groups to retain. Oldest entries are dropped when exceeded.
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current_group: None,
            max_depth: DEFAULT_MAX_HISTORY_DEPTH,
        }
    }
}

impl History {
    fn new() -> Self {
        Self::default()
    }

    /// Create a history with a custom maximum depth.
    fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Open a group if none is pending, snapshotting the paragraphs.
    fn begin(&mut self, snapshot: &ParagraphStore) -> &mut PendingGroup {
        self.redo_stack.clear();
        self.current_group.get_or_insert_with(|| PendingGroup {
            ops: Vec::new(),
            before: snapshot.clone(),
            restyled: false,
        })
    }

    fn push(&mut self, op: EditOp) {
        if let Some(group) = self.current_group.as_mut() {
            group.ops.push(op);
        }
    }

    fn mark_restyled(&mut self, snapshot: &ParagraphStore) {
        self.begin(snapshot).restyled = true;
    }

    fn commit(&mut self, after: &ParagraphStore) {
        let Some(group) = self.current_group.take() else {
            return;
        };
        if group.ops.is_empty() && !group.restyled {
            return;
        }
        self.undo_stack.push(UndoGroup {
            ops: group.ops,
            before: group.before,
            after: after.clone(),
        });
        // Enforce depth limit by dropping oldest entries
        if self.undo_stack.len() > self.max_depth {
            let excess = self.undo_stack.len() - self.max_depth;
            self.undo_stack.drain(..excess);
        }
    }

    fn pop_undo(&mut self, after: &ParagraphStore) -> Option<UndoGroup> {
        self.commit(after);
        self.undo_stack.pop()
    }

    fn push_redo(&mut self, group: UndoGroup) {
        self.redo_stack.push(group);
    }

    fn pop_redo(&mut self) -> Option<UndoGroup> {
        self.redo_stack.pop()
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
            || self
                .current_group
                .as_ref()
                .is_some_and(|group| !group.ops.is_empty() || group.restyled)
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_group = None;
    }
}

/// Text buffer with editing operations, cursor, selection and undo/redo.
///
/// `EditBuffer` is the UI-facing editing type. It provides:
///
/// - **Cursor movement**: Characters, paragraphs, document bounds
/// - **Text editing**: Insert, delete, backspace; a selection is replaced
/// - **Paragraph styling**: Alignment and line height for the paragraph under
///   the cursor, or every paragraph touched by the selection
/// - **History**: Grouped undo/redo with configurable depth limit
///
/// # History Management
///
/// Edit operations are grouped automatically. Call [`commit`](Self::commit)
/// to force a group boundary. Each group restores paragraph ids and styles
/// exactly on undo and redo. The history depth is bounded (default 1000
/// groups).
#[derive(Clone, Debug, Default)]
pub struct EditBuffer {
    buffer: TextBuffer,
    cursor: Cursor,
    anchor: Option<usize>,
    history: History,
}

impl EditBuffer {
    /// Create a new empty edit buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an edit buffer with initial text.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self::with_buffer(TextBuffer::with_text(text))
    }

    /// Create an edit buffer over an existing text buffer.
    #[must_use]
    pub fn with_buffer(buffer: TextBuffer) -> Self {
        Self {
            buffer,
            cursor: Cursor::start(),
            anchor: None,
            history: History::new(),
        }
    }

    /// Create an edit buffer with a custom maximum undo history depth.
    #[must_use]
    pub fn with_max_history_depth(max_depth: usize) -> Self {
        Self {
            history: History::with_max_depth(max_depth),
            ..Self::default()
        }
    }

    /// Set the maximum undo history depth.
    ///
    /// If the current history exceeds the new depth, oldest entries will be
    /// pruned on the next commit.
    pub fn set_max_history_depth(&mut self, max_depth: usize) {
        self.history.max_depth = max_depth;
    }

    /// Get the current maximum undo history depth.
    #[must_use]
    pub fn max_history_depth(&self) -> usize {
        self.history.max_depth
    }

    /// Get the underlying text buffer.
    #[must_use]
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Consume the editor into its text buffer.
    #[must_use]
    pub fn into_buffer(self) -> TextBuffer {
        self.buffer
    }

    /// Get the full text content.
    #[must_use]
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Replace the entire text, resetting cursor, selection and history.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.cursor = Cursor::start();
        self.anchor = None;
        self.history.clear();
        self.update_cursor_position();
    }

    /// Get the current cursor position.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Set the cursor by character offset, clearing the selection.
    pub fn set_cursor_by_offset(&mut self, offset: usize) {
        self.anchor = None;
        self.move_cursor(offset);
    }

    /// Select a char span. The cursor moves to `range.end`.
    pub fn select(&mut self, range: Range<usize>) {
        let len = self.buffer.len_chars();
        self.anchor = Some(range.start.min(len));
        self.move_cursor(range.end);
    }

    /// Clear the selection, keeping the cursor.
    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Normalized selection span, if a non-empty selection is active.
    #[must_use]
    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        let (start, end) = if anchor <= self.cursor.offset {
            (anchor, self.cursor.offset)
        } else {
            (self.cursor.offset, anchor)
        };
        (start < end).then_some(start..end)
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        if self.cursor.offset > 0 {
            self.set_cursor_by_offset(self.cursor.offset - 1);
        }
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor.offset < self.buffer.len_chars() {
            self.set_cursor_by_offset(self.cursor.offset + 1);
        }
    }

    /// Move cursor to the previous paragraph, keeping the column when possible.
    pub fn move_up(&mut self) {
        if self.cursor.row > 0 {
            self.move_to(self.cursor.row - 1, self.cursor.col);
        }
    }

    /// Move cursor to the next paragraph, keeping the column when possible.
    pub fn move_down(&mut self) {
        if self.cursor.row + 1 < self.buffer.paragraph_count() {
            self.move_to(self.cursor.row + 1, self.cursor.col);
        }
    }

    /// Move cursor to start of the current paragraph.
    pub fn move_to_paragraph_start(&mut self) {
        self.move_to(self.cursor.row, 0);
    }

    /// Move cursor to end of the current paragraph.
    pub fn move_to_paragraph_end(&mut self) {
        self.move_to(self.cursor.row, usize::MAX);
    }

    /// Move to a paragraph and column, clamping both.
    pub fn move_to(&mut self, row: usize, col: usize) {
        let offset = {
            let ranges = self.buffer.paragraph_ranges();
            let row = row.min(ranges.len().saturating_sub(1));
            ranges
                .get(row)
                .map_or(0, |range| range.start + col.min(range.len()))
        };
        self.set_cursor_by_offset(offset);
    }

    /// Insert text at the cursor, replacing the selection if any.
    pub fn insert(&mut self, text: &str) -> Result<()> {
        self.delete_selection()?;
        if text.is_empty() {
            return Ok(());
        }
        let offset = self.cursor.offset;
        self.history.begin(self.buffer.paragraphs());
        self.buffer.insert(offset, text)?;
        self.history.push(EditOp::Insert {
            offset,
            text: text.to_string(),
        });
        self.move_cursor(offset + text.chars().count());
        Ok(())
    }

    /// Delete the selection, or the character before the cursor.
    pub fn delete_backward(&mut self) -> Result<()> {
        if self.delete_selection()? || self.cursor.offset == 0 {
            return Ok(());
        }
        let start = self.cursor.offset - 1;
        self.delete_range_offsets(start, self.cursor.offset)
    }

    /// Delete the selection, or the character after the cursor.
    pub fn delete_forward(&mut self) -> Result<()> {
        if self.delete_selection()? || self.cursor.offset >= self.buffer.len_chars() {
            return Ok(());
        }
        self.delete_range_offsets(self.cursor.offset, self.cursor.offset + 1)
    }

    /// Delete the selected text. Returns whether anything was deleted.
    pub fn delete_selection(&mut self) -> Result<bool> {
        let Some(range) = self.selection() else {
            self.anchor = None;
            return Ok(false);
        };
        self.anchor = None;
        self.delete_range_offsets(range.start, range.end)?;
        Ok(true)
    }

    /// Delete a range between character offsets.
    pub fn delete_range_offsets(&mut self, start: usize, end: usize) -> Result<()> {
        self.history.begin(self.buffer.paragraphs());
        let deleted = self.buffer.delete(start..end)?;
        if !deleted.is_empty() {
            self.history.push(EditOp::Delete {
                offset: start,
                text: deleted,
            });
        }
        self.move_cursor(start);
        Ok(())
    }

    /// Index of the paragraph under the cursor.
    #[must_use]
    pub fn current_paragraph_index(&self) -> usize {
        self.cursor.row
    }

    /// Style of the paragraph under the cursor (empty when unset).
    #[must_use]
    pub fn current_style(&self) -> ParagraphStyle {
        self.buffer
            .paragraphs()
            .style(self.cursor.row)
            .unwrap_or_default()
    }

    /// Paragraphs a style command applies to: those touched by the selection,
    /// or the one under the cursor.
    #[must_use]
    pub fn target_paragraphs(&self) -> Range<usize> {
        match self.selection() {
            Some(range) => self
                .buffer
                .paragraph_indices_in(range)
                .unwrap_or(self.cursor.row..self.cursor.row + 1),
            None => self.cursor.row..self.cursor.row + 1,
        }
    }

    /// Set the alignment of the target paragraphs.
    pub fn set_align(&mut self, align: TextAlign) -> Result<Range<usize>> {
        self.apply_style(ParagraphStyle::align(align))
    }

    /// Set the line height of the target paragraphs.
    pub fn set_line_height(&mut self, line_height: f64) -> Result<Range<usize>> {
        self.apply_style(ParagraphStyle::line_height(line_height)?)
    }

    /// Overlay a style patch on the target paragraphs.
    pub fn apply_style(&mut self, patch: ParagraphStyle) -> Result<Range<usize>> {
        let targets = self.target_paragraphs();
        self.history.mark_restyled(self.buffer.paragraphs());
        for index in targets.clone() {
            self.buffer.update_paragraph_style(index, patch)?;
        }
        Ok(targets)
    }

    /// Remove style overrides from the target paragraphs.
    pub fn clear_style(&mut self) -> Result<Range<usize>> {
        let targets = self.target_paragraphs();
        self.history.mark_restyled(self.buffer.paragraphs());
        for index in targets.clone() {
            self.buffer.clear_paragraph_style(index)?;
        }
        Ok(targets)
    }

    /// Undo the last edit group. Returns whether anything was undone.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(group) = self.history.pop_undo(self.buffer.paragraphs()) else {
            return Ok(false);
        };

        for op in group.ops.iter().rev() {
            self.apply_op(&op.invert())?;
        }
        self.buffer.restore_paragraphs(group.before.clone());
        self.clamp_cursor();
        self.history.push_redo(group);

        Ok(true)
    }

    /// Redo the last undone edit group. Returns whether anything was redone.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(group) = self.history.pop_redo() else {
            return Ok(false);
        };

        for op in &group.ops {
            self.apply_op(op)?;
        }
        self.buffer.restore_paragraphs(group.after.clone());
        self.clamp_cursor();
        self.history.undo_stack.push(group);

        Ok(true)
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Commit current edits as an undo group.
    pub fn commit(&mut self) {
        self.history.commit(self.buffer.paragraphs());
    }

    /// Clear the undo/redo history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn apply_op(&mut self, op: &EditOp) -> Result<()> {
        match op {
            EditOp::Insert { offset, text } => {
                self.buffer.insert(*offset, text)?;
                self.move_cursor(offset + text.chars().count());
            }
            EditOp::Delete { offset, text } => {
                let end = offset + text.chars().count();
                self.buffer.delete(*offset..end)?;
                self.move_cursor(*offset);
            }
        }
        Ok(())
    }

    fn move_cursor(&mut self, offset: usize) {
        self.cursor.offset = offset.min(self.buffer.len_chars());
        self.update_cursor_position();
    }

    fn update_cursor_position(&mut self) {
        let ranges = self.buffer.paragraph_ranges();
        let row = crate::paragraph::range_index_at(&ranges, self.cursor.offset).unwrap_or(0);
        let start = ranges.get(row).map_or(0, |range| range.start);
        self.cursor.row = row;
        self.cursor.col = self.cursor.offset.saturating_sub(start);
    }

    fn clamp_cursor(&mut self) {
        if let Some(anchor) = self.anchor {
            self.anchor = Some(anchor.min(self.buffer.len_chars()));
        }
        self.move_cursor(self.cursor.offset);
    }
}
