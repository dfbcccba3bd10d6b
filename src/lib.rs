//! Lectio - Scripture Study Engine
//!
//! Tokenizes verse text into interactive word spans and builds the indices
//! behind word study, word usages, cross-language phrase alignment and
//! translation comparison.

// Tokens and references are used by every other module
pub mod tokens;
pub mod reference;
pub mod highlight;
pub mod occurrences;
pub mod alignment;
pub mod compare;
pub mod search;
pub mod study;
pub mod render;
pub mod state;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod commands;

pub use error::StudyError;
pub use tokens::{normalize_key, tokenize, ScriptMode, Token};
pub use reference::{parse_reference, parse_verse_ref, ReferenceQuery, Testament, VerseRef, VerseText};
pub use occurrences::{build_occurrences, OccurrenceListing, UsageRow, UsageScope};
pub use alignment::{parse_alignment_payload, AlignmentGroup, AlignmentIndex, HoverInfo, Language};
pub use compare::{compute_distinctive, ComparisonView, TranslationId};
pub use search::{build_search_listing, SearchListing, TestamentFilter};
pub use study::{CrossReference, CrossReferences, WordStudy};
pub use state::{NavigationSession, WordPos};
pub use cache::PassageCache;
pub use client::{Collaborator, HttpCollaborator};
pub use config::StudyConfig;
pub use commands::{LookupOutcome, NavigationOutcome, SharedSession, StudyContext};
