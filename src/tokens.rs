//! Token types and key normalization

use serde::{Deserialize, Serialize};

/// Words shorter than this (in normalized characters) are not clickable.
pub const MIN_INTERACTIVE_LEN: usize = 2;

/// Character classes admitted into a normalized key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScriptMode {
    /// Latin letters and apostrophe
    #[default]
    English,
    /// English plus the Hebrew and Greek blocks, used when alignment is active
    Multilingual,
}

impl ScriptMode {
    pub fn admits(&self, c: char) -> bool {
        if c.is_ascii_alphabetic() || c == '\'' {
            return true;
        }
        match self {
            ScriptMode::English => false,
            ScriptMode::Multilingual => matches!(
                c,
                '\u{0590}'..='\u{05FF}' | '\u{0370}'..='\u{03FF}' | '\u{1F00}'..='\u{1FFF}'
            ),
        }
    }
}

/// Lower-case `text` and drop every character outside the mode's set.
///
/// Lower-casing runs per character before filtering, so the result is already
/// a fixed point: normalizing a normalized key returns it unchanged.
pub fn normalize_key(text: &str, mode: ScriptMode) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| mode.admits(*c))
        .collect()
}

/// Key of `word` when it names a word. Apostrophes alone do not.
pub fn word_key(word: &str, mode: ScriptMode) -> Option<String> {
    let key = normalize_key(word, mode);
    key.chars().any(|c| c != '\'').then_some(key)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub raw: String,
    pub key: String,
    pub is_word: bool,
}

impl Token {
    fn whitespace(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            key: String::new(),
            is_word: false,
        }
    }

    fn text(raw: &str, mode: ScriptMode) -> Self {
        let (key, is_word) = match word_key(raw, mode) {
            Some(key) => (key, true),
            None => (String::new(), false),
        };
        Self {
            raw: raw.to_string(),
            key,
            is_word,
        }
    }

    /// Whether the token may be clicked or hovered.
    pub fn is_interactive(&self) -> bool {
        self.is_word && self.key.chars().count() >= MIN_INTERACTIVE_LEN
    }

    /// Display form used for word study: letters and apostrophes, case kept.
    pub fn lookup_word(&self) -> String {
        self.raw
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || *c == '\'')
            .collect()
    }
}

/// Split `text` into alternating whitespace and non-whitespace tokens.
///
/// Concatenating every token's `raw` reproduces `text` exactly.
pub fn tokenize(text: &str, mode: ScriptMode) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (idx, c) in text.char_indices() {
        let space = c.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                tokens.push(make_token(&text[start..idx], prev, mode));
                start = idx;
            }
            _ => {}
        }
        in_space = Some(space);
    }

    if let Some(space) = in_space {
        tokens.push(make_token(&text[start..], space, mode));
    }

    tokens
}

fn make_token(raw: &str, space: bool, mode: ScriptMode) -> Token {
    if space {
        Token::whitespace(raw)
    } else {
        Token::text(raw, mode)
    }
}

/// Keys of the words in `phrase`, in order, non-words skipped.
pub fn phrase_keys(phrase: &str, mode: ScriptMode) -> Vec<String> {
    phrase
        .split_whitespace()
        .filter_map(|word| word_key(word, mode))
        .collect()
}
