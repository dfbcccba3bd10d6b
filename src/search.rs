//! Phrase search result listing

use crate::highlight::{highlight_phrase, Segment};
use crate::reference::{Testament, VerseText};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snippets longer than this many characters are cut and suffixed with "…".
pub const SNIPPET_CHARS: usize = 180;

/// The collaborator caps phrase search results at this many rows.
pub const RESULT_CAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestamentFilter {
    #[default]
    All,
    Old,
    New,
}

impl TestamentFilter {
    pub fn admits(&self, testament: Testament) -> bool {
        match self {
            TestamentFilter::All => true,
            TestamentFilter::Old => testament == Testament::Old,
            TestamentFilter::New => testament == Testament::New,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub chapter: u32,
    pub verse: u32,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchGroup {
    pub book: String,
    /// Matches for this book across the whole filtered listing.
    pub book_count: usize,
    pub entries: Vec<SearchEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchListing {
    pub phrase: String,
    pub filter: TestamentFilter,
    pub groups: Vec<SearchGroup>,
    pub total: usize,
    /// Set when the filtered listing reaches [`RESULT_CAP`].
    pub truncated: bool,
}

impl SearchListing {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn build_search_listing(
    phrase: &str,
    rows: &[VerseText],
    filter: TestamentFilter,
) -> SearchListing {
    let phrase = phrase.trim();
    let kept: Vec<&VerseText> = rows
        .iter()
        .filter(|row| filter.admits(row.testament()))
        .collect();

    let mut per_book: HashMap<&str, usize> = HashMap::new();
    for row in &kept {
        *per_book.entry(row.book.as_str()).or_insert(0) += 1;
    }

    let mut groups: Vec<SearchGroup> = Vec::new();
    for row in &kept {
        let text = snippet(row.text.trim());
        let entry = SearchEntry {
            chapter: row.chapter,
            verse: row.verse,
            segments: highlight_phrase(&text, phrase),
        };
        match groups.last_mut() {
            Some(group) if group.book == row.book => group.entries.push(entry),
            _ => groups.push(SearchGroup {
                book: row.book.clone(),
                book_count: per_book.get(row.book.as_str()).copied().unwrap_or(0),
                entries: vec![entry],
            }),
        }
    }

    SearchListing {
        phrase: phrase.to_string(),
        filter,
        groups,
        total: kept.len(),
        truncated: kept.len() >= RESULT_CAP,
    }
}
