//! Fuzz target for paragraph synchronization.
//!
//! Drives arbitrary edit sequences through `TextBuffer` and checks that the
//! store keeps one record per paragraph with unique ids.

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use paraflow::{ParagraphStyle, TextAlign, TextBuffer};

#[derive(Arbitrary, Debug)]
enum Op {
    Insert { at: u16, text: String },
    Delete { at: u16, len: u8 },
    Align { at: u8, align: u8 },
    SetText(String),
}

#[derive(Arbitrary, Debug)]
struct Input {
    initial: String,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let mut buffer = TextBuffer::with_text(&input.initial);

    for op in input.ops.iter().take(256) {
        let len = buffer.len_chars();
        match op {
            Op::Insert { at, text } => {
                let at = usize::from(*at) % (len + 1);
                buffer.insert(at, text).unwrap();
            }
            Op::Delete { at, len: count } => {
                let start = usize::from(*at) % (len + 1);
                let end = (start + usize::from(*count)).min(len);
                buffer.delete(start..end).unwrap();
            }
            Op::Align { at, align } => {
                let index = usize::from(*at) % buffer.paragraph_count();
                let align = TextAlign::ALL[usize::from(*align) % TextAlign::ALL.len()];
                buffer
                    .set_paragraph_style(index, Some(ParagraphStyle::align(align)))
                    .unwrap();
            }
            Op::SetText(text) => buffer.set_text(text),
        }

        // Offsets past the end must fail, never panic
        assert!(buffer.insert(buffer.len_chars() + 1, "x").is_err());

        let newlines = buffer.to_string().chars().filter(|&c| c == '\n').count();
        assert_eq!(buffer.paragraph_count(), newlines + 1);
    }

    let ids: HashSet<_> = buffer.paragraphs().iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids.len(), buffer.paragraph_count());
});
