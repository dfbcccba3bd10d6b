//! Case-insensitive match finding and segment building
//!
//! Matching works on the unescaped source text and yields plain segments; the
//! renderer escapes every segment before wrapping marked ones in markup.

use serde::{Deserialize, Serialize};

/// A run of source text, optionally marked for highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub marked: bool,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marked: false,
        }
    }

    pub fn marked(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marked: true,
        }
    }
}

/// Characters that make up a word run (letters, digits, underscore, apostrophe).
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

fn is_boundary_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split `text` into alternating word and non-word runs.
///
/// Returns `(run, is_word)` pairs; concatenating the runs reproduces `text`.
pub fn split_word_runs(text: &str) -> Vec<(&str, bool)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (idx, c) in text.char_indices() {
        let word = is_word_char(c);
        if let Some(prev) = current {
            if prev != word {
                runs.push((&text[start..idx], prev));
                start = idx;
            }
        }
        current = Some(word);
    }
    if let Some(word) = current {
        runs.push((&text[start..], word));
    }
    runs
}

fn same_char(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn find_matches(text: &str, needle: &str, whole_word: bool) -> Vec<(usize, usize)> {
    let pattern: Vec<char> = needle.chars().collect();
    if pattern.is_empty() {
        return Vec::new();
    }
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut matches = Vec::new();
    let mut i = 0;

    while i + pattern.len() <= chars.len() {
        let hit = pattern
            .iter()
            .enumerate()
            .all(|(k, p)| same_char(chars[i + k].1, *p));

        let bounded = !whole_word
            || ((i == 0 || !is_boundary_char(chars[i - 1].1))
                && chars
                    .get(i + pattern.len())
                    .map_or(true, |(_, c)| !is_boundary_char(*c)));

        if hit && bounded {
            let start = chars[i].0;
            let end = chars
                .get(i + pattern.len())
                .map_or(text.len(), |(idx, _)| *idx);
            matches.push((start, end));
            i += pattern.len();
        } else {
            i += 1;
        }
    }
    matches
}

/// Byte ranges of every case-insensitive whole-word occurrence of `word`.
pub fn find_word_matches(text: &str, word: &str) -> Vec<(usize, usize)> {
    find_matches(text, word, true)
}

/// Byte ranges of every case-insensitive occurrence of `phrase`.
pub fn find_phrase_matches(text: &str, phrase: &str) -> Vec<(usize, usize)> {
    find_matches(text, phrase, false)
}

/// Cut `text` at non-overlapping, ascending `matches`.
pub fn segments_from_matches(text: &str, matches: &[(usize, usize)]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for &(start, end) in matches {
        if start > cursor {
            segments.push(Segment::plain(&text[cursor..start]));
        }
        segments.push(Segment::marked(&text[start..end]));
        cursor = end;
    }
    if cursor < text.len() {
        segments.push(Segment::plain(&text[cursor..]));
    }
    segments
}

pub fn highlight_word(text: &str, word: &str) -> Vec<Segment> {
    segments_from_matches(text, &find_word_matches(text, word))
}

pub fn highlight_phrase(text: &str, phrase: &str) -> Vec<Segment> {
    segments_from_matches(text, &find_phrase_matches(text, phrase))
}
