//! Word study and cross-reference payloads

use serde::{Deserialize, Serialize};

/// Characters of the origin verse shown above a word study.
pub const STUDY_SNIPPET_CHARS: usize = 130;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyLine {
    #[serde(default)]
    pub tag: String,
    pub text: String,
}

impl StudyLine {
    /// The tag as a class name. Anything outside `[A-Za-z0-9_-]` is dropped.
    pub fn class(&self) -> String {
        self.tag
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySection {
    pub header: String,
    #[serde(default)]
    pub lines: Vec<StudyLine>,
}

/// Lexical notes for one word as used in one verse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordStudy {
    #[serde(default)]
    pub sections: Vec<StudySection>,
    #[serde(default)]
    pub verse_text: Option<String>,
}

impl WordStudy {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The origin verse cut to [`STUDY_SNIPPET_CHARS`] characters.
    pub fn verse_snippet(&self) -> Option<String> {
        let text = self.verse_text.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }
        if text.chars().count() > STUDY_SNIPPET_CHARS {
            let cut: String = text.chars().take(STUDY_SNIPPET_CHARS).collect();
            Some(format!("{}…", cut))
        } else {
            Some(text.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// Related passages for one verse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReferences {
    #[serde(default)]
    pub src_text: Option<String>,
    #[serde(default)]
    pub xrefs: Vec<CrossReference>,
}

impl CrossReferences {
    pub fn is_empty(&self) -> bool {
        self.xrefs.is_empty()
    }
}
