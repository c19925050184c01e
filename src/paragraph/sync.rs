//! Paragraph synchronization against the text.
//!
//! The synchronizer compares the number of separators in the text with the
//! number of records in the store and repairs the difference at the edited
//! paragraph:
//!
//! - Growth splits the anchor paragraph. The anchor keeps its id; each new
//!   trailing record gets a fresh id and a copy of the anchor's style.
//! - Shrink merges the records following the anchor into it. The anchor's id
//!   and style win.
//!
//! Records outside the edited paragraph are never rebuilt, only shifted.

use tracing::{debug, warn};

use super::{IdGenerator, ParagraphRecord, ParagraphStore, SEPARATOR};
use crate::error::{Error, Result};

/// What a synchronization pass did to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncChange {
    /// The store already matched the text.
    Unchanged,
    /// The store was empty and filled with default records.
    Initialized { count: usize },
    /// The paragraph at `index` was split, creating `created` records after it.
    Split { index: usize, created: usize },
    /// `removed` records after `index` were merged into it.
    Merged { index: usize, removed: usize },
}

impl SyncChange {
    /// Check if the store was left untouched.
    #[must_use]
    pub fn is_unchanged(self) -> bool {
        self == Self::Unchanged
    }
}

/// Reconciles a [`ParagraphStore`] with text.
///
/// Borrowing the id generator alongside the store keeps id issuance with the
/// buffer that owns both, so restoring a store snapshot never rewinds it.
pub struct Synchronizer<'a> {
    store: &'a mut ParagraphStore,
    ids: &'a mut IdGenerator,
}

impl<'a> Synchronizer<'a> {
    /// Create a synchronizer over a store and its id source.
    pub fn new(store: &'a mut ParagraphStore, ids: &'a mut IdGenerator) -> Self {
        Self { store, ids }
    }

    /// Synchronize the store with `text`.
    ///
    /// `edit_offset` is the char offset in `text` where the last edit began.
    /// Without it, records are added or dropped at the end.
    pub fn synchronize(&mut self, text: &str, edit_offset: Option<usize>) -> Result<SyncChange> {
        let mut separators = 0usize;
        let mut anchor = None;
        let mut len = 0usize;
        for (i, ch) in text.chars().enumerate() {
            if edit_offset == Some(i) {
                anchor = Some(separators);
            }
            if ch == SEPARATOR {
                separators += 1;
            }
            len = i + 1;
        }
        if let Some(offset) = edit_offset {
            if offset > len {
                return Err(Error::OffsetOutOfBounds { offset, len });
            }
            if offset == len {
                anchor = Some(separators);
            }
        }
        Ok(self.resize(separators + 1, anchor))
    }

    /// Resize the store to `target` records, editing at paragraph `anchor`.
    ///
    /// `anchor` is the index of the paragraph in which the edit began, counted
    /// in the current text. `target` is clamped to at least one record.
    pub fn resize(&mut self, target: usize, anchor: Option<usize>) -> SyncChange {
        let target = target.max(1);
        let current = self.store.len();

        let change = if current == 0 {
            self.initialize(target)
        } else if target > current {
            let index = anchor.unwrap_or(current - 1).min(current - 1);
            self.split(index, target - current)
        } else if target < current {
            let removed = current - target;
            // The anchor cannot be past the last surviving record
            let index = anchor.unwrap_or(target - 1).min(target - 1);
            self.merge(index, removed)
        } else {
            SyncChange::Unchanged
        };

        self.ensure_len(target);
        change
    }

    fn initialize(&mut self, count: usize) -> SyncChange {
        let records = self.store.records_mut();
        records.reserve(count);
        for _ in 0..count {
            records.push(ParagraphRecord::new(self.ids.next_id()));
        }
        debug!(count, "initialized paragraph records");
        SyncChange::Initialized { count }
    }

    fn split(&mut self, index: usize, created: usize) -> SyncChange {
        let style = self.store.records()[index].style;
        let ids = &mut *self.ids;
        let fresh = (0..created).map(|_| ParagraphRecord {
            id: ids.next_id(),
            style,
        });
        let at = index + 1;
        self.store.records_mut().splice(at..at, fresh);
        debug!(index, created, "split paragraph");
        SyncChange::Split { index, created }
    }

    fn merge(&mut self, index: usize, removed: usize) -> SyncChange {
        let start = index + 1;
        self.store.records_mut().drain(start..start + removed);
        debug!(index, removed, "merged paragraphs");
        SyncChange::Merged { index, removed }
    }

    fn ensure_len(&mut self, target: usize) {
        let len = self.store.len();
        debug_assert_eq!(len, target, "paragraph count diverged from text");
        if len != target {
            warn!(len, target, "paragraph count diverged from text, rebuilding tail");
            let records = self.store.records_mut();
            if len > target {
                records.truncate(target);
            } else {
                let style = records.last().and_then(|record| record.style);
                for _ in len..target {
                    records.push(ParagraphRecord {
                        id: self.ids.next_id(),
                        style,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{ParagraphStyle, TextAlign};

    fn styled(aligns: &[TextAlign]) -> (ParagraphStore, IdGenerator) {
        let mut ids = IdGenerator::new();
        let records = aligns
            .iter()
            .map(|&align| ParagraphRecord::with_style(ids.next_id(), ParagraphStyle::align(align)))
            .collect();
        (ParagraphStore::from_records(records), ids)
    }

    fn aligns(store: &ParagraphStore) -> Vec<Option<TextAlign>> {
        store
            .iter()
            .map(|record| record.style.and_then(|style| style.align))
            .collect()
    }

    #[test]
    fn test_initialize_empty_store() {
        let mut store = ParagraphStore::new();
        let mut ids = IdGenerator::new();
        let change = Synchronizer::new(&mut store, &mut ids)
            .synchronize("x\ny\nz", None)
            .unwrap();
        assert_eq!(change, SyncChange::Initialized { count: 3 });
        assert_eq!(store.len(), 3);
        assert!(store.iter().all(|record| record.style.is_none()));
    }

    #[test]
    fn test_empty_text_has_one_paragraph() {
        let mut store = ParagraphStore::new();
        let mut ids = IdGenerator::new();
        Synchronizer::new(&mut store, &mut ids)
            .synchronize("", None)
            .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_split_inside_paragraph() {
        use TextAlign::*;
        let (mut store, mut ids) = styled(&[Left, Center, Right]);
        let original = store.clone();

        let change = Synchronizer::new(&mut store, &mut ids)
            .synchronize("a\naa\nbbb\nccc", Some(1))
            .unwrap();

        assert_eq!(change, SyncChange::Split { index: 0, created: 1 });
        assert_eq!(aligns(&store), vec![Some(Left), Some(Left), Some(Center), Some(Right)]);
        // Leading fragment keeps its id, trailing fragment is fresh
        assert_eq!(store.get(0).unwrap().id, original.get(0).unwrap().id);
        assert_eq!(store.get(1).unwrap().id.as_str(), "p-3");
        assert_eq!(store.get(2), original.get(1));
        assert_eq!(store.get(3), original.get(2));
    }

    #[test]
    fn test_split_at_paragraph_start() {
        use TextAlign::*;
        let (mut store, mut ids) = styled(&[Left, Center]);
        Synchronizer::new(&mut store, &mut ids)
            .synchronize("aaa\n\nbbb", Some(4))
            .unwrap();
        assert_eq!(aligns(&store), vec![Some(Left), Some(Center), Some(Center)]);
    }

    #[test]
    fn test_split_multiple_newlines() {
        use TextAlign::*;
        let (mut store, mut ids) = styled(&[Right]);
        let change = Synchronizer::new(&mut store, &mut ids)
            .synchronize("a\n\n\nb", Some(1))
            .unwrap();
        assert_eq!(change, SyncChange::Split { index: 0, created: 3 });
        assert_eq!(aligns(&store), vec![Some(Right); 4]);
    }

    #[test]
    fn test_split_copies_style_by_value() {
        let (mut store, mut ids) = styled(&[TextAlign::Center]);
        Synchronizer::new(&mut store, &mut ids)
            .synchronize("a\nb", Some(1))
            .unwrap();
        store
            .set_style(0, Some(ParagraphStyle::align(TextAlign::Right)))
            .unwrap();
        assert_eq!(store.style(1), Some(ParagraphStyle::align(TextAlign::Center)));
    }

    #[test]
    fn test_merge_earlier_wins() {
        use TextAlign::*;
        let (mut store, mut ids) = styled(&[Left, Center, Right]);
        let original = store.clone();

        // "aaa\nbbb\nccc" with the second newline removed
        let change = Synchronizer::new(&mut store, &mut ids)
            .synchronize("aaa\nbbbccc", Some(7))
            .unwrap();

        assert_eq!(change, SyncChange::Merged { index: 1, removed: 1 });
        assert_eq!(aligns(&store), vec![Some(Left), Some(Center)]);
        assert_eq!(store.get(0), original.get(0));
        assert_eq!(store.get(1), original.get(1));
    }

    #[test]
    fn test_merge_span_with_many_newlines() {
        use TextAlign::*;
        let (mut store, mut ids) = styled(&[Left, Center, Right, Justify]);
        // "a\nb\nc\nd" with "\nb\nc" removed from offset 1
        Synchronizer::new(&mut store, &mut ids)
            .synchronize("a\nd", Some(1))
            .unwrap();
        assert_eq!(aligns(&store), vec![Some(Left), Some(Justify)]);
    }

    #[test]
    fn test_unchanged_is_noop() {
        use TextAlign::*;
        let (mut store, mut ids) = styled(&[Left, Center]);
        let before = store.clone();
        let mut sync = Synchronizer::new(&mut store, &mut ids);
        assert!(sync.synchronize("a\nb", None).unwrap().is_unchanged());
        assert!(sync.synchronize("a\nb", Some(2)).unwrap().is_unchanged());
        assert_eq!(store, before);
    }

    #[test]
    fn test_hintless_resize_works_at_end() {
        use TextAlign::*;
        let (mut store, mut ids) = styled(&[Left, Center]);
        Synchronizer::new(&mut store, &mut ids)
            .synchronize("a\nb\nc\nd", None)
            .unwrap();
        assert_eq!(
            aligns(&store),
            vec![Some(Left), Some(Center), Some(Center), Some(Center)]
        );

        Synchronizer::new(&mut store, &mut ids)
            .synchronize("abcd", None)
            .unwrap();
        assert_eq!(aligns(&store), vec![Some(Left)]);
    }

    #[test]
    fn test_offset_out_of_bounds() {
        let (mut store, mut ids) = styled(&[TextAlign::Left]);
        let result = Synchronizer::new(&mut store, &mut ids).synchronize("abc", Some(4));
        assert!(matches!(
            result,
            Err(Error::OffsetOutOfBounds { offset: 4, len: 3 })
        ));
        // Offset equal to the length is the end of the text
        assert!(
            Synchronizer::new(&mut store, &mut ids)
                .synchronize("abc", Some(3))
                .is_ok()
        );
    }

    #[test]
    fn test_ids_never_reused() {
        let (mut store, mut ids) = styled(&[TextAlign::Left]);
        let mut sync = Synchronizer::new(&mut store, &mut ids);
        sync.synchronize("a\nb", Some(1)).unwrap();
        let removed = sync.store.get(1).unwrap().id.clone();
        sync.synchronize("ab", Some(1)).unwrap();
        sync.synchronize("a\nb", Some(1)).unwrap();
        assert_ne!(sync.store.get(1).unwrap().id, removed);
    }
}
