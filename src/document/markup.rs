//! Inline markup helpers
//!
//! Article bodies carry light inline markup (`<em>`, `<a href="...">`,
//! entities). Layout only cares about what ends up visible, and the splitter
//! must never cut a tag in half.

use std::borrow::Cow;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

const ENTITIES: [(&str, &str); 6] = [
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", "\u{a0}"),
];

/// Text as the reader sees it: tags removed, common entities decoded.
pub fn visible_text(text: &str) -> Cow<'_, str> {
    if !text.contains('<') && !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    if out.contains('&') {
        for (entity, decoded) in ENTITIES {
            if out.contains(entity) {
                out = out.replace(entity, decoded);
            }
        }
    }

    Cow::Owned(out)
}

/// Number of user-perceived characters once markup is removed
pub fn visible_char_count(text: &str) -> usize {
    visible_text(text).graphemes(true).count()
}

/// Elements that never take a closing tag
const VOID_ELEMENTS: [&str; 6] = ["br", "hr", "img", "wbr", "input", "source"];

/// Whitespace-delimited words, treating whitespace inside a tag as part of
/// the word. Every token is a slice of `text`.
pub fn word_tokens(text: &str) -> Vec<&str> {
    word_spans(text).into_iter().map(|span| &text[span]).collect()
}

/// Byte ranges of the words [`word_tokens`] returns
pub fn word_spans(text: &str) -> Vec<Range<usize>> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_tag = false;

    for (idx, c) in text.char_indices() {
        if c == '<' {
            in_tag = true;
        } else if c == '>' {
            in_tag = false;
        }

        if c.is_whitespace() && !in_tag {
            if let Some(s) = start.take() {
                words.push(s..idx);
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }

    if let Some(s) = start {
        words.push(s..text.len());
    }

    words
}

/// Inline elements left open after each word prefix: entry `k` is the depth
/// after the first `k` words, so the result has one entry more than `words`.
pub fn open_element_depths(words: &[&str]) -> Vec<usize> {
    let mut depths = Vec::with_capacity(words.len() + 1);
    let mut depth = 0usize;
    depths.push(depth);

    for word in words {
        let mut rest = *word;
        while let Some(open) = rest.find('<') {
            let Some(close) = rest[open..].find('>') else {
                break;
            };
            let tag = &rest[open + 1..open + close];
            rest = &rest[open + close + 1..];

            if let Some(closing) = tag.strip_prefix('/') {
                if !closing.trim().is_empty() {
                    depth = depth.saturating_sub(1);
                }
                continue;
            }
            if tag.starts_with('!') || tag.ends_with('/') {
                continue;
            }
            let name = tag
                .split(|c: char| c.is_whitespace())
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();
            if !name.is_empty() && !VOID_ELEMENTS.contains(&name.as_str()) {
                depth += 1;
            }
        }
        depths.push(depth);
    }

    depths
}

/// Collapse whitespace runs to single spaces and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
