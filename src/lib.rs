//! `paraflow` - paragraph-level style tracking for rich text
//!
//! Keeps one stable-id style record per paragraph of a rope-backed text,
//! synchronized through every edit, and derives the line metadata a renderer
//! needs to place and justify wrapped lines.

// Crate-level lint configuration
#![forbid(unsafe_code)]
#![allow(clippy::cast_precision_loss)] // Intentional for layout math
#![allow(clippy::module_name_repetitions)] // Allow layout::LayoutView etc
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::suboptimal_flops)] // Standard math notation is clearer than mul_add
#![allow(clippy::inherent_to_string)] // to_string methods are convenient
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::needless_collect)] // Collect for assertions is clear

pub mod document;
pub mod error;
pub mod layout;
pub mod paragraph;
pub mod style;
pub mod text;

// Re-export core types at crate root
pub use document::{Document, StoredParagraph};
pub use error::{Error, Result};
pub use paragraph::{
    IdGenerator, ParagraphId, ParagraphRange, ParagraphRecord, ParagraphStore, SyncChange,
    Synchronizer,
};
pub use style::{ParagraphStyle, TextAlign};

// Re-export commonly used types
pub use layout::{LayoutOptions, LayoutView, LineMeta, LineMetaTable, MonospaceWrapper, WrapMode};
pub use text::{Cursor, EditBuffer, RopeWrapper, TextBuffer};
