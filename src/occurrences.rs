//! Word occurrence listing ("usages across the Bible")

use crate::highlight::{highlight_word, Segment};
use crate::reference::VerseText;
use serde::{Deserialize, Serialize};

/// A verse returned by the usage lookup.
pub type UsageRow = VerseText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum UsageScope {
    #[default]
    All,
    CurrentBook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceEntry {
    pub chapter: u32,
    pub verse: u32,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceGroup {
    pub book: String,
    pub entries: Vec<OccurrenceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceListing {
    pub word: String,
    pub scope: UsageScope,
    pub groups: Vec<OccurrenceGroup>,
    pub total: usize,
}

impl OccurrenceListing {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Filter `rows` by `scope`, group them by book in arrival order and mark
/// every whole-word occurrence of `word`.
pub fn build_occurrences(
    word: &str,
    rows: &[UsageRow],
    scope: UsageScope,
    current_book: Option<&str>,
) -> OccurrenceListing {
    let mut groups: Vec<OccurrenceGroup> = Vec::new();
    let mut total = 0;

    let kept = rows.iter().filter(|row| match (scope, current_book) {
        (UsageScope::CurrentBook, Some(book)) => row.book == book,
        _ => true,
    });

    for row in kept {
        let entry = OccurrenceEntry {
            chapter: row.chapter,
            verse: row.verse,
            segments: highlight_word(&row.text, word),
        };
        match groups.last_mut() {
            Some(group) if group.book == row.book => group.entries.push(entry),
            _ => groups.push(OccurrenceGroup {
                book: row.book.clone(),
                entries: vec![entry],
            }),
        }
        total += 1;
    }

    OccurrenceListing {
        word: word.to_string(),
        scope,
        groups,
        total,
    }
}
