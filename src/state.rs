//! Navigation session: the displayed passage and everything derived from it
//!
//! Every navigation and every word lookup takes a stamp from one counter.
//! Async results carry the stamp they were started under and are applied only
//! while that stamp is still current.

use crate::alignment::{AlignmentGroup, AlignmentIndex, HoverInfo};
use crate::error::StudyError;
use crate::occurrences::{build_occurrences, OccurrenceListing, UsageRow, UsageScope};
use crate::reference::{VerseRef, VerseText};
use crate::study::WordStudy;
use crate::tokens::{tokenize, ScriptMode, Token, MIN_INTERACTIVE_LEN};
use tracing::debug;

/// A verse on screen with its tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedVerse {
    pub text: VerseText,
    pub tokens: Vec<Token>,
}

/// Position of a token: verse index in the passage, token index in the verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordPos {
    pub verse: usize,
    pub token: usize,
}

impl WordPos {
    pub fn new(verse: usize, token: usize) -> Self {
        Self { verse, token }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTicket {
    stamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentTicket {
    stamp: u64,
    pub verse: VerseRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    stamp: u64,
    pub word: String,
    pub verse: VerseRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UsageState {
    #[default]
    NotSearched,
    Pending,
    Unavailable(String),
    Loaded(Vec<UsageRow>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StudyState {
    #[default]
    NotSearched,
    Pending,
    Unavailable(String),
    Loaded(WordStudy),
}

#[derive(Debug, Clone, Default)]
pub enum AlignmentState {
    #[default]
    NotComputed,
    Pending,
    Unavailable(String),
    Ready(AlignmentIndex),
}

impl AlignmentState {
    pub fn index(&self) -> Option<&AlignmentIndex> {
        match self {
            AlignmentState::Ready(index) => Some(index),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct NavigationSession {
    version: u64,
    navigation_stamp: u64,
    lookup_stamp: u64,
    mode: ScriptMode,
    passage: Vec<DisplayedVerse>,
    current: Option<VerseRef>,
    clicked: Option<WordPos>,
    word: Option<String>,
    lookup_verse: Option<VerseRef>,
    usages: UsageState,
    usage_scope: UsageScope,
    study: StudyState,
    alignment: AlignmentState,
    hover: Option<HoverInfo>,
}

impl NavigationSession {
    pub fn new(mode: ScriptMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Start a navigation. Discards the passage and everything derived from
    /// it, and supersedes any navigation or lookup still in flight.
    pub fn begin_navigation(&mut self) -> NavigationTicket {
        self.version += 1;
        self.navigation_stamp = self.version;
        self.lookup_stamp = self.version;

        self.passage.clear();
        self.current = None;
        self.clicked = None;
        self.word = None;
        self.lookup_verse = None;
        self.usages = UsageState::NotSearched;
        self.study = StudyState::NotSearched;
        self.alignment = AlignmentState::NotComputed;
        self.hover = None;

        NavigationTicket {
            stamp: self.navigation_stamp,
        }
    }

    pub fn is_current(&self, ticket: &NavigationTicket) -> bool {
        ticket.stamp == self.navigation_stamp
    }

    /// Tokenize and display `verses`. Returns false if the ticket is stale.
    pub fn apply_passage(&mut self, ticket: &NavigationTicket, verses: Vec<VerseText>) -> bool {
        if !self.is_current(ticket) {
            debug!(stamp = ticket.stamp, current = self.navigation_stamp, "discarding superseded passage");
            return false;
        }
        self.current = verses.first().map(VerseText::reference);
        self.passage = verses
            .into_iter()
            .map(|text| DisplayedVerse {
                tokens: tokenize(&text.text, self.mode),
                text,
            })
            .collect();
        true
    }

    /// Mark alignment as pending for a single-verse passage.
    pub fn begin_alignment(&mut self, ticket: &NavigationTicket) -> Option<AlignmentTicket> {
        if !self.is_current(ticket) || self.passage.len() != 1 {
            return None;
        }
        let verse = self.current.clone()?;
        self.alignment = AlignmentState::Pending;
        Some(AlignmentTicket {
            stamp: ticket.stamp,
            verse,
        })
    }

    /// Install the alignment index, or mark it unavailable on failure.
    pub fn apply_alignment(
        &mut self,
        ticket: &AlignmentTicket,
        result: Result<Vec<AlignmentGroup>, StudyError>,
    ) -> bool {
        if ticket.stamp != self.navigation_stamp || self.current.as_ref() != Some(&ticket.verse) {
            debug!(verse = %ticket.verse, "discarding alignment for a verse no longer displayed");
            return false;
        }
        self.alignment = match result {
            Ok(groups) => AlignmentState::Ready(AlignmentIndex::build(ticket.verse.clone(), groups)),
            Err(e) => {
                debug!(verse = %ticket.verse, error = %e, "alignment unavailable");
                AlignmentState::Unavailable(e.to_string())
            }
        };
        self.hover = None;
        true
    }

    fn token(&self, pos: WordPos) -> Option<(&DisplayedVerse, &Token)> {
        let verse = self.passage.get(pos.verse)?;
        let token = verse.tokens.get(pos.token)?;
        Some((verse, token))
    }

    /// Select a word for study. Non-interactive tokens are ignored.
    pub fn click_word(&mut self, pos: WordPos) -> Option<LookupTicket> {
        let (verse, token) = self.token(pos)?;
        if !token.is_interactive() {
            return None;
        }
        let word = token.lookup_word();
        if word.chars().count() < MIN_INTERACTIVE_LEN {
            return None;
        }
        let reference = verse.text.reference();

        self.version += 1;
        self.lookup_stamp = self.version;
        self.clicked = Some(pos);
        self.word = Some(word.clone());
        self.lookup_verse = Some(reference.clone());
        self.usages = UsageState::Pending;
        self.study = StudyState::Pending;

        Some(LookupTicket {
            stamp: self.lookup_stamp,
            word,
            verse: reference,
        })
    }

    pub fn apply_usages(
        &mut self,
        ticket: &LookupTicket,
        result: Result<Vec<UsageRow>, StudyError>,
    ) -> bool {
        if ticket.stamp != self.lookup_stamp {
            debug!(word = %ticket.word, "discarding superseded usage lookup");
            return false;
        }
        self.usages = match result {
            Ok(rows) => UsageState::Loaded(rows),
            Err(e) => {
                debug!(word = %ticket.word, error = %e, "usages unavailable");
                UsageState::Unavailable(e.to_string())
            }
        };
        true
    }

    /// Install the word study for the selected word. Shares the lookup stamp
    /// with `apply_usages`.
    pub fn apply_word_study(
        &mut self,
        ticket: &LookupTicket,
        result: Result<WordStudy, StudyError>,
    ) -> bool {
        if ticket.stamp != self.lookup_stamp {
            debug!(word = %ticket.word, "discarding superseded word study");
            return false;
        }
        self.study = match result {
            Ok(study) => StudyState::Loaded(study),
            Err(e) => {
                debug!(word = %ticket.word, error = %e, "word study unavailable");
                StudyState::Unavailable(e.to_string())
            }
        };
        true
    }

    pub fn set_usage_scope(&mut self, scope: UsageScope) {
        self.usage_scope = scope;
    }

    /// The occurrence listing for the selected word under the current scope.
    pub fn occurrences(&self) -> Option<OccurrenceListing> {
        let word = self.word.as_deref()?;
        match &self.usages {
            UsageState::Loaded(rows) => Some(build_occurrences(
                word,
                rows,
                self.usage_scope,
                self.lookup_verse.as_ref().map(|v| v.book.as_str()),
            )),
            _ => None,
        }
    }

    /// Resolve alignment highlights for the token under the pointer.
    ///
    /// The index is only consulted for spans of the verse it was built for.
    pub fn hover(&mut self, pos: WordPos) -> Option<HoverInfo> {
        let info = self.token(pos).and_then(|(verse, token)| {
            let index = self.alignment.index()?;
            if !token.is_interactive() || *index.verse() != verse.text.reference() {
                return None;
            }
            index.hover(&token.key)
        });
        self.hover = info.clone();
        info
    }

    pub fn leave_word(&mut self) {
        self.hover = None;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mode(&self) -> ScriptMode {
        self.mode
    }

    pub fn passage(&self) -> &[DisplayedVerse] {
        &self.passage
    }

    pub fn current_verse(&self) -> Option<&VerseRef> {
        self.current.as_ref()
    }

    pub fn clicked(&self) -> Option<WordPos> {
        self.clicked
    }

    pub fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    pub fn usages(&self) -> &UsageState {
        &self.usages
    }

    pub fn usage_scope(&self) -> UsageScope {
        self.usage_scope
    }

    pub fn word_study(&self) -> &StudyState {
        &self.study
    }

    /// Verse the selected word was clicked in.
    pub fn lookup_verse(&self) -> Option<&VerseRef> {
        self.lookup_verse.as_ref()
    }

    pub fn alignment(&self) -> &AlignmentState {
        &self.alignment
    }

    pub fn hover_info(&self) -> Option<&HoverInfo> {
        self.hover.as_ref()
    }
}
