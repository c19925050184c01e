//! Rope-backed text storage with synchronized paragraph records.
//!
//! Key types:
//!
//! - [`RopeWrapper`]: Char-offset rope with checked edits
//! - [`TextBuffer`]: Text plus one paragraph record per paragraph
//! - [`EditBuffer`]: Editable buffer with cursor movement and undo/redo
//!
//! # Examples
//!
//! ## Paragraph Records Follow Edits
//!
//! ```
//! use paraflow::TextBuffer;
//!
//! let mut buffer = TextBuffer::with_text("Hello, world!");
//! let id = buffer.paragraph(0).unwrap().id.clone();
//!
//! buffer.insert(6, "\n").unwrap();
//! assert_eq!(buffer.paragraph_count(), 2);
//! assert_eq!(buffer.paragraph(0).unwrap().id, id);
//! ```
//!
//! ## Editable Buffer with Undo
//!
//! ```
//! use paraflow::EditBuffer;
//!
//! let mut editor = EditBuffer::new();
//! editor.insert("Hello").unwrap();
//! editor.commit(); // Create undo checkpoint
//! editor.insert(" World").unwrap();
//! editor.commit();
//! assert_eq!(editor.text(), "Hello World");
//!
//! // Undo the last insert
//! editor.undo().unwrap();
//! assert_eq!(editor.text(), "Hello");
//!
//! // Redo brings it back
//! editor.redo().unwrap();
//! assert_eq!(editor.text(), "Hello World");
//! ```

mod buffer;
mod edit;
mod rope;

pub use buffer::TextBuffer;
pub use edit::{Cursor, EditBuffer};
pub use rope::RopeWrapper;
