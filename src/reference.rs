//! Verse references, reference parsing and testament lookup

use crate::error::StudyError;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

static FULL_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([1-3]?\s?[A-Za-z][A-Za-z ]+)\s+(\d+):(\d+)$").expect("valid verse pattern")
});
static CHAPTER_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([1-3]?\s?[A-Za-z][A-Za-z ]+)\s+(\d+)$").expect("valid chapter pattern")
});
static BOOK_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([1-3]?\s?[A-Za-z][A-Za-z ]+)$").expect("valid book pattern"));

const OLD_TESTAMENT_BOOKS: &[&str] = &[
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Psalm", "Proverbs", "Ecclesiastes",
    "Song of Solomon", "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea",
    "Joel", "Amos", "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai",
    "Zechariah", "Malachi",
];

static OLD_TESTAMENT: Lazy<HashSet<&'static str>> =
    Lazy::new(|| OLD_TESTAMENT_BOOKS.iter().copied().collect());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    Old,
    New,
}

impl Testament {
    pub fn of_book(book: &str) -> Self {
        if OLD_TESTAMENT.contains(book) {
            Testament::Old
        } else {
            Testament::New
        }
    }
}

/// A single verse. Identity is the (book, chapter, verse) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerseRef {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseRef {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Result<Self, StudyError> {
        let book = book.into();
        if book.trim().is_empty() || chapter == 0 || verse == 0 {
            return Err(StudyError::MalformedReference(format!(
                "{} {}:{}",
                book, chapter, verse
            )));
        }
        Ok(Self {
            book,
            chapter,
            verse,
        })
    }

    pub fn testament(&self) -> Testament {
        Testament::of_book(&self.book)
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// A parsed user reference: a book, a chapter, or a single verse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceQuery {
    pub book: String,
    pub chapter: Option<u32>,
    pub verse: Option<u32>,
}

impl ReferenceQuery {
    /// The verse this query names, if it names exactly one.
    pub fn verse_ref(&self) -> Option<VerseRef> {
        match (self.chapter, self.verse) {
            (Some(chapter), Some(verse)) => VerseRef::new(self.book.clone(), chapter, verse).ok(),
            _ => None,
        }
    }

    pub fn is_single_verse(&self) -> bool {
        self.verse.is_some()
    }
}

impl fmt::Display for ReferenceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.chapter, self.verse) {
            (Some(c), Some(v)) => write!(f, "{} {}:{}", self.book, c, v),
            (Some(c), None) => write!(f, "{} {}", self.book, c),
            _ => write!(f, "{}", self.book),
        }
    }
}

/// A verse as returned by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseText {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl VerseText {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32, text: impl Into<String>) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
            text: text.into(),
        }
    }

    pub fn reference(&self) -> VerseRef {
        VerseRef {
            book: self.book.clone(),
            chapter: self.chapter,
            verse: self.verse,
        }
    }

    pub fn testament(&self) -> Testament {
        Testament::of_book(&self.book)
    }
}

fn parse_number(raw: &str, input: &str) -> Result<u32, StudyError> {
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(StudyError::MalformedReference(input.to_string())),
    }
}

/// Parse "Book", "Book C" or "Book C:V".
pub fn parse_reference(input: &str) -> Result<ReferenceQuery, StudyError> {
    let trimmed = input.trim();

    if let Some(caps) = FULL_REF.captures(trimmed) {
        return Ok(ReferenceQuery {
            book: caps[1].trim().to_string(),
            chapter: Some(parse_number(&caps[2], trimmed)?),
            verse: Some(parse_number(&caps[3], trimmed)?),
        });
    }

    if let Some(caps) = CHAPTER_REF.captures(trimmed) {
        return Ok(ReferenceQuery {
            book: caps[1].trim().to_string(),
            chapter: Some(parse_number(&caps[2], trimmed)?),
            verse: None,
        });
    }

    if let Some(caps) = BOOK_REF.captures(trimmed) {
        return Ok(ReferenceQuery {
            book: caps[1].trim().to_string(),
            chapter: None,
            verse: None,
        });
    }

    Err(StudyError::MalformedReference(trimmed.to_string()))
}

/// Parse a reference that must name exactly one verse.
pub fn parse_verse_ref(input: &str) -> Result<VerseRef, StudyError> {
    parse_reference(input)?.verse_ref().ok_or_else(|| {
        StudyError::MalformedReference(format!("expected a single verse: {}", input.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_reference() {
        let q = parse_reference("  John 3:16 ").unwrap();
        assert_eq!(q.book, "John");
        assert_eq!(q.chapter, Some(3));
        assert_eq!(q.verse, Some(16));
        assert_eq!(q.verse_ref().unwrap().to_string(), "John 3:16");
    }

    #[test]
    fn test_parse_numbered_and_spaced_books() {
        let q = parse_reference("1 Corinthians 13:13").unwrap();
        assert_eq!(q.book, "1 Corinthians");
        let q = parse_reference("Song of Solomon 2").unwrap();
        assert_eq!(q.book, "Song of Solomon");
        assert_eq!(q.chapter, Some(2));
        assert_eq!(q.verse, None);
    }

    #[test]
    fn test_parse_book_only() {
        let q = parse_reference("Genesis").unwrap();
        assert_eq!(q.chapter, None);
        assert!(q.verse_ref().is_none());
        assert_eq!(q.to_string(), "Genesis");
    }

    #[test]
    fn test_malformed_references() {
        for input in ["", "3:16", "John 3:", "John 0:1", "John 3:0", "John 3:16a", "John 3-4"] {
            assert!(
                matches!(parse_reference(input), Err(StudyError::MalformedReference(_))),
                "{input:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_verse_ref_requires_verse() {
        assert!(parse_verse_ref("Psalm 23").is_err());
        assert_eq!(parse_verse_ref("Psalm 23:1").unwrap().book, "Psalm");
    }

    #[test]
    fn test_verse_ref_rejects_zero() {
        assert!(VerseRef::new("John", 0, 1).is_err());
        assert!(VerseRef::new("John", 1, 0).is_err());
        assert!(VerseRef::new(" ", 1, 1).is_err());
    }

    #[test]
    fn test_equal_tuples_are_one_identity() {
        let mut set = HashSet::new();
        set.insert(VerseRef::new("John", 3, 16).unwrap());
        set.insert(VerseText::new("John", 3, 16, "For God so loved").reference());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_testament_lookup() {
        assert_eq!(Testament::of_book("Psalm"), Testament::Old);
        assert_eq!(Testament::of_book("Psalms"), Testament::Old);
        assert_eq!(Testament::of_book("Malachi"), Testament::Old);
        assert_eq!(Testament::of_book("Matthew"), Testament::New);
    }
}
