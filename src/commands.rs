//! Event handlers: search submit, word click/hover, scope toggle, compare,
//! cross-references and phrase search

use crate::alignment::{parse_alignment_payload, HoverInfo};
use crate::cache::PassageCache;
use crate::client::Collaborator;
use crate::compare::{ComparisonView, TranslationId};
use crate::config::StudyConfig;
use crate::error::StudyError;
use crate::occurrences::{OccurrenceListing, UsageScope};
use crate::reference::{parse_reference, parse_verse_ref, VerseRef};
use crate::render;
use crate::search::{build_search_listing, SearchListing, TestamentFilter};
use crate::state::{NavigationSession, StudyState, WordPos};
use crate::study::CrossReferences;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Session shared between handlers. Never locked across an `.await`.
pub type SharedSession = Arc<Mutex<NavigationSession>>;

fn lock_session(session: &SharedSession) -> Result<MutexGuard<'_, NavigationSession>, StudyError> {
    session
        .lock()
        .map_err(|_| StudyError::Other("Failed to acquire session lock".to_string()))
}

/// Everything a handler needs.
pub struct StudyContext<C> {
    pub session: SharedSession,
    pub collaborator: Arc<C>,
    pub cache: Arc<PassageCache>,
    pub config: StudyConfig,
}

impl<C: Collaborator> StudyContext<C> {
    pub fn new(collaborator: C, config: StudyConfig) -> Self {
        let session = NavigationSession::new(config.script_mode());
        Self {
            session: Arc::new(Mutex::new(session)),
            collaborator: Arc::new(collaborator),
            cache: Arc::new(PassageCache::new(config.passage_cache_capacity)),
            config,
        }
    }
}

impl<C> Clone for StudyContext<C> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            collaborator: Arc::clone(&self.collaborator),
            cache: Arc::clone(&self.cache),
            config: self.config.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Displayed { verses: usize, aligned: bool },
    NotFound,
    /// A later navigation replaced this one before it finished.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Whitespace, punctuation or a word too short to study
    Ignored,
    Superseded,
    Unavailable(StudyError),
    Listed(OccurrenceListing),
}

/// Load the passage named by `input` into the session.
pub async fn go_search<C: Collaborator>(
    ctx: &StudyContext<C>,
    input: &str,
) -> Result<NavigationOutcome, StudyError> {
    let query = parse_reference(input)?;
    let ticket = lock_session(&ctx.session)?.begin_navigation();
    debug!(reference = %query, "navigation started");

    let verses = match ctx.cache.get(&query) {
        Some(cached) => cached.as_ref().clone(),
        None => {
            let fetched = ctx.collaborator.fetch_verses(&query).await?;
            ctx.cache.put(query.clone(), fetched).as_ref().clone()
        }
    };

    let alignment_ticket = {
        let mut session = lock_session(&ctx.session)?;
        if !session.is_current(&ticket) {
            return Ok(NavigationOutcome::Superseded);
        }
        if verses.is_empty() {
            info!(reference = %query, "no verses found");
            return Ok(NavigationOutcome::NotFound);
        }
        session.apply_passage(&ticket, verses.clone());
        if ctx.config.alignment_enabled {
            session.begin_alignment(&ticket)
        } else {
            None
        }
    };
    info!(reference = %query, verses = verses.len(), "passage displayed");

    let Some(alignment_ticket) = alignment_ticket else {
        return Ok(NavigationOutcome::Displayed {
            verses: verses.len(),
            aligned: false,
        });
    };

    let text = verses.first().map(|v| v.text.as_str()).unwrap_or_default();
    let result = ctx
        .collaborator
        .fetch_alignment(&alignment_ticket.verse, text)
        .await
        .and_then(|raw| parse_alignment_payload(&raw));

    let parsed = result.is_ok();
    if !lock_session(&ctx.session)?.apply_alignment(&alignment_ticket, result) {
        return Ok(NavigationOutcome::Superseded);
    }
    Ok(NavigationOutcome::Displayed {
        verses: verses.len(),
        aligned: parsed,
    })
}

/// Select the word at `pos` and fetch its word study and usages together.
pub async fn click_word<C: Collaborator>(
    ctx: &StudyContext<C>,
    pos: WordPos,
) -> Result<LookupOutcome, StudyError> {
    let Some(ticket) = lock_session(&ctx.session)?.click_word(pos) else {
        return Ok(LookupOutcome::Ignored);
    };
    debug!(word = %ticket.word, verse = %ticket.verse, "word lookup started");

    let (study, usages) = tokio::join!(
        ctx.collaborator.fetch_word_study(&ticket.word, &ticket.verse),
        ctx.collaborator.fetch_usages(&ticket.word, &ticket.verse),
    );
    let failure = usages.as_ref().err().cloned();

    let mut session = lock_session(&ctx.session)?;
    if !session.apply_usages(&ticket, usages) {
        return Ok(LookupOutcome::Superseded);
    }
    session.apply_word_study(&ticket, study);
    if let Some(e) = failure {
        return Ok(LookupOutcome::Unavailable(e));
    }
    Ok(session
        .occurrences()
        .map(LookupOutcome::Listed)
        .unwrap_or(LookupOutcome::Ignored))
}

pub fn hover_word<C>(ctx: &StudyContext<C>, pos: WordPos) -> Result<Option<HoverInfo>, StudyError> {
    Ok(lock_session(&ctx.session)?.hover(pos))
}

pub fn leave_word<C>(ctx: &StudyContext<C>) -> Result<(), StudyError> {
    lock_session(&ctx.session)?.leave_word();
    Ok(())
}

/// Switch the usage scope and rebuild the listing from the loaded rows.
pub fn set_usage_scope<C>(
    ctx: &StudyContext<C>,
    scope: UsageScope,
) -> Result<Option<OccurrenceListing>, StudyError> {
    let mut session = lock_session(&ctx.session)?;
    session.set_usage_scope(scope);
    Ok(session.occurrences())
}

/// Compare translations of one verse. `sources` defaults to the configured set.
pub async fn run_compare<C: Collaborator>(
    ctx: &StudyContext<C>,
    input: &str,
    sources: Option<&[TranslationId]>,
) -> Result<ComparisonView, StudyError> {
    let verse = parse_verse_ref(input)?;
    let active: Vec<TranslationId> = match sources {
        Some(sources) if !sources.is_empty() => sources.to_vec(),
        _ => ctx.config.compare_sources.clone(),
    };

    let translations = ctx
        .collaborator
        .fetch_translations(&verse, &active)
        .await?;
    debug!(%verse, returned = translations.len(), "translations fetched");

    let active: HashSet<TranslationId> = active.into_iter().collect();
    Ok(ComparisonView::build(verse, &translations, &active))
}

/// Cross-references for one verse.
pub async fn run_cross_references<C: Collaborator>(
    ctx: &StudyContext<C>,
    input: &str,
) -> Result<(VerseRef, CrossReferences), StudyError> {
    let verse = parse_verse_ref(input)?;
    let refs = ctx.collaborator.fetch_cross_references(&verse).await?;
    debug!(%verse, found = refs.xrefs.len(), "cross-references fetched");
    Ok((verse, refs))
}

/// Search the whole Bible for `phrase`.
pub async fn run_bible_search<C: Collaborator>(
    ctx: &StudyContext<C>,
    phrase: &str,
    filter: TestamentFilter,
) -> Result<SearchListing, StudyError> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return Err(StudyError::InvalidQuery("search phrase is empty".to_string()));
    }
    let rows = ctx.collaborator.search(phrase).await?;
    info!(phrase, rows = rows.len(), "phrase search finished");
    Ok(build_search_listing(phrase, &rows, filter))
}

/// Markup for the passage currently in the session.
pub fn passage_html<C>(ctx: &StudyContext<C>) -> Result<String, StudyError> {
    let session = lock_session(&ctx.session)?;
    let html = render::render_passage(session.passage(), session.clicked(), session.hover_info())?;
    Ok(html)
}

/// Markup for the word study pane, or `None` before any word is clicked.
pub fn study_html<C>(ctx: &StudyContext<C>) -> Result<Option<String>, StudyError> {
    let session = lock_session(&ctx.session)?;
    let (Some(word), Some(verse)) = (session.word(), session.lookup_verse()) else {
        return Ok(None);
    };
    let html = match session.word_study() {
        StudyState::NotSearched => return Ok(None),
        StudyState::Pending => render::render_notice("Loading word study…")?,
        StudyState::Unavailable(_) => render::render_notice("Word study unavailable.")?,
        StudyState::Loaded(study) => render::render_word_study(word, verse, study)?,
    };
    Ok(Some(html))
}
