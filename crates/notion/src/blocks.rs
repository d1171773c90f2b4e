//! Rich-text and block builders respecting Notion's size limits.
//!
//! A single rich-text object holds at most [`MAX_TEXT_LENGTH`] characters
//! (measured in UTF-16 code units) and a block holds at most
//! [`MAX_SEGMENTS_PER_BLOCK`] rich-text objects. Longer text is split on
//! character boundaries; concatenating the segments in order always yields the
//! original text exactly.

use serde_json::{json, Value};

pub const MAX_TEXT_LENGTH: usize = 2000;
pub const MAX_SEGMENTS_PER_BLOCK: usize = 100;

/// Splits `text` into segments of at most `max_units` UTF-16 code units.
///
/// Empty text yields a single empty segment.
pub fn split_text(text: &str, max_units: usize) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut units = 0;

    for (index, ch) in text.char_indices() {
        let width = ch.len_utf16();
        if units + width > max_units {
            segments.push(&text[start..index]);
            start = index;
            units = 0;
        }
        units += width;
    }
    segments.push(&text[start..]);
    segments
}

/// A rich-text array carrying `text`.
pub fn rich_text(text: &str) -> Vec<Value> {
    split_text(text, MAX_TEXT_LENGTH)
        .into_iter()
        .map(|segment| json!({ "type": "text", "text": { "content": segment } }))
        .collect()
}

/// Paragraph blocks carrying `text`, in order.
pub fn paragraphs(text: &str) -> Vec<Value> {
    rich_text(text)
        .chunks(MAX_SEGMENTS_PER_BLOCK)
        .map(|segments| {
            json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": { "rich_text": segments }
            })
        })
        .collect()
}
