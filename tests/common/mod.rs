#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)] // Each test binary uses a subset of the helpers

use paraflow::{ParagraphStyle, TextAlign, TextBuffer};
use tracing::Level;

/// Install a test-writer subscriber once per test binary.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_test_writer()
        .try_init();
}

/// Buffer whose paragraphs carry the given alignments in order.
pub fn aligned_buffer(text: &str, aligns: &[TextAlign]) -> TextBuffer {
    let mut buffer = TextBuffer::with_text(text);
    for (index, &align) in aligns.iter().enumerate() {
        buffer
            .set_paragraph_style(index, Some(ParagraphStyle::align(align)))
            .expect("paragraph index in range");
    }
    buffer
}

/// Alignment override of every paragraph.
pub fn aligns(buffer: &TextBuffer) -> Vec<Option<TextAlign>> {
    buffer
        .paragraphs()
        .iter()
        .map(|record| record.style.and_then(|style| style.align))
        .collect()
}

/// Id of every paragraph as plain strings.
pub fn ids(buffer: &TextBuffer) -> Vec<String> {
    buffer
        .paragraphs()
        .iter()
        .map(|record| record.id.as_str().to_string())
        .collect()
}
