//! Paragraph records, stable ids and derived paragraph ranges.
//!
//! A paragraph is a maximal run of text between `'\n'` separators. The
//! [`ParagraphStore`] holds one [`ParagraphRecord`] per paragraph, in text
//! order, and its length always equals the number of separators plus one
//! once [`Synchronizer`] has run.
//!
//! Key types:
//!
//! - [`ParagraphId`]: Opaque stable identifier, never reused within a buffer
//! - [`IdGenerator`]: Monotonic id source owned by the host buffer
//! - [`ParagraphStore`]: Ordered records, the only persisted paragraph state
//! - [`ParagraphRange`]: Derived char span of a paragraph
//! - [`Synchronizer`]: Keeps the store consistent with the text
//!
//! # Examples
//!
//! ```
//! use paraflow::paragraph::{IdGenerator, ParagraphStore, Synchronizer};
//!
//! let mut store = ParagraphStore::new();
//! let mut ids = IdGenerator::new();
//! Synchronizer::new(&mut store, &mut ids)
//!     .synchronize("one\ntwo", None)
//!     .unwrap();
//! assert_eq!(store.len(), 2);
//! ```

mod sync;

pub use sync::{SyncChange, Synchronizer};

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};
use std::fmt;
use std::ops::Range;

use crate::error::{Error, Result};
use crate::style::ParagraphStyle;

/// Paragraph separator.
pub const SEPARATOR: char = '\n';

/// Stable paragraph identifier.
///
/// Ids are compared by value and carry no positional meaning.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParagraphId(SmolStr);

impl ParagraphId {
    /// Wrap an existing identifier string.
    #[must_use]
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    /// Get the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParagraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParagraphId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Default prefix for generated ids.
pub const DEFAULT_ID_PREFIX: &str = "p";

/// Source of fresh paragraph ids.
///
/// Generated ids have the form `{prefix}-{n}` with a counter that only moves
/// forward. Ids loaded from elsewhere are passed to [`observe`](Self::observe)
/// so the counter skips past them.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    prefix: SmolStr,
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_ID_PREFIX)
    }
}

impl IdGenerator {
    /// Create a generator with the default prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator with a custom prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<SmolStr>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Get the id prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Switch the prefix of ids issued from now on.
    ///
    /// The counter keeps running, so no earlier id is issued again under
    /// any prefix.
    pub fn set_prefix(&mut self, prefix: impl Into<SmolStr>) {
        self.prefix = prefix.into();
    }

    /// Issue a fresh id.
    pub fn next_id(&mut self) -> ParagraphId {
        let id = ParagraphId(format_smolstr!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }

    /// Advance the counter past an id that is already in use.
    pub fn observe(&mut self, id: &ParagraphId) {
        let Some(rest) = id
            .as_str()
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
        else {
            return;
        };
        if let Ok(n) = rest.parse::<u64>() {
            self.next = self.next.max(n.saturating_add(1));
        }
    }
}

/// One logical paragraph: stable id plus optional style overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    pub id: ParagraphId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ParagraphStyle>,
}

impl ParagraphRecord {
    /// Create a record with no style.
    #[must_use]
    pub fn new(id: ParagraphId) -> Self {
        Self { id, style: None }
    }

    /// Create a record with a style.
    #[must_use]
    pub fn with_style(id: ParagraphId, style: ParagraphStyle) -> Self {
        Self {
            id,
            style: Some(style),
        }
    }

    /// Style overrides, or the empty style when unset.
    #[must_use]
    pub fn style_or_default(&self) -> ParagraphStyle {
        self.style.unwrap_or_default()
    }
}

/// Ordered paragraph records in text order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphStore {
    records: Vec<ParagraphRecord>,
}

impl ParagraphStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from existing records.
    #[must_use]
    pub fn from_records(records: Vec<ParagraphRecord>) -> Self {
        Self { records }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a record by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ParagraphRecord> {
        self.records.get(index)
    }

    /// All records in order.
    #[must_use]
    pub fn records(&self) -> &[ParagraphRecord] {
        &self.records
    }

    /// Iterate over records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParagraphRecord> {
        self.records.iter()
    }

    /// Consume the store into its records.
    #[must_use]
    pub fn into_records(self) -> Vec<ParagraphRecord> {
        self.records
    }

    /// Find the current index of a paragraph by id.
    #[must_use]
    pub fn position_of(&self, id: &ParagraphId) -> Option<usize> {
        self.records.iter().position(|record| &record.id == id)
    }

    /// Style of the paragraph at `index`.
    #[must_use]
    pub fn style(&self, index: usize) -> Option<ParagraphStyle> {
        self.records.get(index).and_then(|record| record.style)
    }

    /// Replace the style of the paragraph at `index`.
    pub fn set_style(&mut self, index: usize, style: Option<ParagraphStyle>) -> Result<()> {
        let count = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(Error::ParagraphOutOfBounds { index, count })?;
        record.style = style.filter(|style| !style.is_empty());
        Ok(())
    }

    /// Overlay `patch` on the style of the paragraph at `index`.
    pub fn update_style(&mut self, index: usize, patch: ParagraphStyle) -> Result<()> {
        let merged = self
            .get(index)
            .map(|record| record.style_or_default().merge(patch));
        self.set_style(index, merged.or(Some(patch)))
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<ParagraphRecord> {
        &mut self.records
    }
}

impl<'a> IntoIterator for &'a ParagraphStore {
    type Item = &'a ParagraphRecord;
    type IntoIter = std::slice::Iter<'a, ParagraphRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Char span owned by one paragraph.
///
/// `end` is exclusive and excludes the separator. Derived from the text and
/// store order; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParagraphRange {
    pub start: usize,
    pub end: usize,
    pub id: ParagraphId,
    /// The range is terminated by an explicit separator.
    pub hard_break: bool,
}

impl ParagraphRange {
    /// Char span as a `Range`.
    #[must_use]
    pub fn chars(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Length in chars, excluding the separator.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the paragraph has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if a char offset belongs to this paragraph.
    ///
    /// The offset of the terminating separator belongs to the paragraph.
    #[must_use]
    pub fn contains(&self, offset: usize) -> bool {
        (self.start..=self.end).contains(&offset)
    }
}

/// Char offsets of every separator in `text`.
#[must_use]
pub fn separator_offsets(text: &str) -> Vec<usize> {
    text.chars()
        .enumerate()
        .filter_map(|(i, ch)| (ch == SEPARATOR).then_some(i))
        .collect()
}

/// Build paragraph ranges from separator offsets and store order.
///
/// The store must already be synchronized: `store.len()` equals
/// `separators.len() + 1`.
#[must_use]
pub fn build_ranges(
    separators: &[usize],
    len_chars: usize,
    store: &ParagraphStore,
) -> Vec<ParagraphRange> {
    debug_assert_eq!(store.len(), separators.len() + 1);
    let mut ranges = Vec::with_capacity(store.len());
    let mut start = 0usize;
    for (i, record) in store.iter().enumerate() {
        let (end, hard_break) = match separators.get(i) {
            Some(&sep) => (sep, true),
            None => (len_chars, false),
        };
        ranges.push(ParagraphRange {
            start,
            end,
            id: record.id.clone(),
            hard_break,
        });
        start = end + 1;
    }
    ranges
}

/// Index of the range owning `offset`, by binary search over sorted ranges.
#[must_use]
pub fn range_index_at(ranges: &[ParagraphRange], offset: usize) -> Option<usize> {
    let idx = ranges.partition_point(|range| range.end < offset);
    ranges
        .get(idx)
        .filter(|range| range.contains(offset))
        .map(|_| idx)
}
