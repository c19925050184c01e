//! Fuzz target for lenient document loading.
//!
//! Any JSON with a string `text` field must load into a consistent buffer.

#![no_main]

use libfuzzer_sys::fuzz_target;
use paraflow::TextBuffer;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(buffer) = TextBuffer::from_json(json) {
        assert!(buffer.is_consistent());
        let reloaded = TextBuffer::from_json(&buffer.to_json().unwrap()).unwrap();
        assert_eq!(reloaded.paragraphs(), buffer.paragraphs());
    }
});
