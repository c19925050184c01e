//! Cached layout view over a text buffer.

use std::cell::{Ref, RefCell};

use tracing::trace;

use super::justify::{LineAlignment, line_alignment};
use super::line_meta::LineMetaTable;
use super::wrap::{LineWrapper, MonospaceWrapper, VisualLine, WrapMode};
use super::{LayoutOptions, LineHeights};
use crate::error::Result;
use crate::style::TextAlign;
use crate::text::TextBuffer;

/// Derived layout of a buffer at one revision.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    pub visual_lines: Vec<VisualLine>,
    pub lines: LineMetaTable,
    pub heights: LineHeights,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LayoutCacheKey {
    wrapper: MonospaceWrapper,
    custom_wrapper: bool,
    buffer_revision: u64,
}

#[derive(Debug, Default)]
struct LayoutCache {
    key: Option<LayoutCacheKey>,
    layout: Layout,
}

/// Layout view of a [`TextBuffer`].
///
/// The layout is rebuilt lazily whenever the buffer revision or the wrap
/// configuration changes.
pub struct LayoutView<'a> {
    buffer: &'a TextBuffer,
    wrapper: MonospaceWrapper,
    custom_wrapper: Option<&'a dyn LineWrapper>,
    options: LayoutOptions,
    cache: RefCell<LayoutCache>,
}

impl<'a> LayoutView<'a> {
    /// Create a new view of a text buffer.
    #[must_use]
    pub fn new(buffer: &'a TextBuffer) -> Self {
        Self {
            buffer,
            wrapper: MonospaceWrapper::default(),
            custom_wrapper: None,
            options: LayoutOptions::default(),
            cache: RefCell::new(LayoutCache::default()),
        }
    }

    /// Set the wrap mode.
    #[must_use]
    pub fn wrap_mode(mut self, mode: WrapMode) -> Self {
        self.wrapper = self.wrapper.with_mode(mode);
        self.clear_cache();
        self
    }

    /// Set the wrap width in columns.
    #[must_use]
    pub fn wrap_width(mut self, width: usize) -> Self {
        self.wrapper = self.wrapper.with_width(width);
        self.clear_cache();
        self
    }

    /// Replace the built-in wrapper configuration.
    #[must_use]
    pub fn monospace(mut self, wrapper: MonospaceWrapper) -> Self {
        self.wrapper = wrapper;
        self.clear_cache();
        self
    }

    /// Use an external wrap engine instead of the built-in wrapper.
    #[must_use]
    pub fn wrapper(mut self, wrapper: &'a dyn LineWrapper) -> Self {
        self.custom_wrapper = Some(wrapper);
        self.clear_cache();
        self
    }

    /// Set the layout defaults.
    #[must_use]
    pub fn options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self.clear_cache();
        self
    }

    /// Get the layout defaults.
    #[must_use]
    pub fn layout_options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Get the underlying buffer.
    #[must_use]
    pub fn buffer(&self) -> &'a TextBuffer {
        self.buffer
    }

    fn clear_cache(&self) {
        self.cache.borrow_mut().key = None;
    }

    fn cache_key(&self) -> LayoutCacheKey {
        LayoutCacheKey {
            wrapper: self.wrapper,
            custom_wrapper: self.custom_wrapper.is_some(),
            buffer_revision: self.buffer.revision(),
        }
    }

    /// Current layout, rebuilt if stale.
    pub fn layout(&self) -> Result<Ref<'_, Layout>> {
        let key = self.cache_key();
        let stale = self.cache.borrow().key != Some(key);
        if stale {
            let layout = self.build_layout()?;
            trace!(
                revision = key.buffer_revision,
                lines = layout.lines.len(),
                "rebuilt layout"
            );
            *self.cache.borrow_mut() = LayoutCache {
                key: Some(key),
                layout,
            };
        }
        Ok(Ref::map(self.cache.borrow(), |cache| &cache.layout))
    }

    fn build_layout(&self) -> Result<Layout> {
        let text = self.buffer.to_string();
        let visual_lines = match self.custom_wrapper {
            Some(wrapper) => wrapper.wrap(&text),
            None => self.wrapper.wrap(&text),
        };
        let lines = {
            let ranges = self.buffer.paragraph_ranges();
            LineMetaTable::build(&visual_lines, &ranges)?
        };
        let heights = LineHeights::resolve(&lines, self.buffer.paragraphs(), &self.options);
        Ok(Layout {
            visual_lines,
            lines,
            heights,
        })
    }

    /// Number of visual lines.
    pub fn line_count(&self) -> Result<usize> {
        Ok(self.layout()?.lines.len())
    }

    /// Alignment of a paragraph after applying the default.
    #[must_use]
    pub fn paragraph_align(&self, paragraph: usize) -> TextAlign {
        self.buffer
            .paragraphs()
            .style(paragraph)
            .and_then(|style| style.align)
            .unwrap_or(self.options.default_align)
    }

    /// Placement decisions for every visual line.
    pub fn line_alignments(&self) -> Result<Vec<LineAlignment>> {
        let layout = self.layout()?;
        Ok(layout
            .lines
            .iter()
            .map(|line| line_alignment(self.paragraph_align(line.paragraph_index), line))
            .collect())
    }

    /// Total height of the laid out text.
    pub fn total_height(&self) -> Result<f64> {
        Ok(self.layout()?.heights.total())
    }
}
