use lectio_lib::commands::{self, passage_html, study_html};
use lectio_lib::state::{AlignmentState, StudyState, UsageState};
use lectio_lib::study::{StudyLine, StudySection};
use lectio_lib::{
    Collaborator, CrossReference, CrossReferences, LookupOutcome, NavigationOutcome,
    ReferenceQuery, StudyConfig, StudyContext, StudyError, TestamentFilter, TranslationId,
    UsageScope, VerseRef, VerseText, WordPos, WordStudy,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

/// In-memory backend. Alignment for a gated verse waits for its signal.
#[derive(Default)]
struct FakeBackend {
    verses: HashMap<String, Vec<VerseText>>,
    alignments: HashMap<VerseRef, String>,
    gates: Mutex<HashMap<VerseRef, oneshot::Receiver<()>>>,
    usages: HashMap<String, Vec<VerseText>>,
    fail_usages: bool,
    fail_study: bool,
    verse_fetches: AtomicUsize,
}

impl FakeBackend {
    fn with_verse(mut self, reference: &str, verses: Vec<VerseText>) -> Self {
        self.verses.insert(reference.to_string(), verses);
        self
    }

    fn with_alignment(mut self, verse: VerseRef, raw: &str) -> Self {
        self.alignments.insert(verse, raw.to_string());
        self
    }

    fn gate(&self, verse: VerseRef) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(verse, rx);
        tx
    }
}

impl Collaborator for FakeBackend {
    async fn fetch_verses(&self, query: &ReferenceQuery) -> Result<Vec<VerseText>, StudyError> {
        self.verse_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.verses.get(&query.to_string()).cloned().unwrap_or_default())
    }

    async fn fetch_usages(&self, word: &str, _origin: &VerseRef) -> Result<Vec<VerseText>, StudyError> {
        if self.fail_usages {
            return Err(StudyError::CollaboratorUnavailable("backend down".to_string()));
        }
        Ok(self.usages.get(word).cloned().unwrap_or_default())
    }

    async fn fetch_alignment(&self, verse: &VerseRef, _text: &str) -> Result<String, StudyError> {
        let gate = self.gates.lock().unwrap().remove(verse);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.alignments
            .get(verse)
            .cloned()
            .ok_or_else(|| StudyError::CollaboratorUnavailable("no alignment".to_string()))
    }

    async fn fetch_translations(
        &self,
        _verse: &VerseRef,
        _sources: &[TranslationId],
    ) -> Result<BTreeMap<TranslationId, String>, StudyError> {
        Ok(BTreeMap::new())
    }

    async fn search(&self, phrase: &str) -> Result<Vec<VerseText>, StudyError> {
        Ok(vec![
            VerseText::new("Psalms", 23, 1, format!("The LORD is my {}", phrase)),
            VerseText::new("John", 10, 11, format!("I am the good {}", phrase)),
        ])
    }

    async fn fetch_word_study(&self, word: &str, verse: &VerseRef) -> Result<WordStudy, StudyError> {
        if self.fail_study {
            return Err(StudyError::CollaboratorUnavailable("lexicon down".to_string()));
        }
        Ok(WordStudy {
            sections: vec![StudySection {
                header: "DEFINITION".to_string(),
                lines: vec![StudyLine {
                    tag: "def".to_string(),
                    text: format!("{} as used in {}", word, verse),
                }],
            }],
            verse_text: None,
        })
    }

    async fn fetch_cross_references(&self, verse: &VerseRef) -> Result<CrossReferences, StudyError> {
        if verse.book != "John" {
            return Ok(CrossReferences::default());
        }
        Ok(CrossReferences {
            src_text: Some("In the beginning was the Word".to_string()),
            xrefs: vec![CrossReference {
                reference: "Genesis 1:1".to_string(),
                text: Some("In the beginning God created".to_string()),
            }],
        })
    }
}

fn john_1_1() -> VerseRef {
    VerseRef::new("John", 1, 1).unwrap()
}

fn genesis_1_1() -> VerseRef {
    VerseRef::new("Genesis", 1, 1).unwrap()
}

fn backend() -> FakeBackend {
    FakeBackend::default()
        .with_verse(
            "John 1:1",
            vec![VerseText::new("John", 1, 1, "In the beginning was the Word")],
        )
        .with_verse(
            "Genesis 1:1",
            vec![VerseText::new("Genesis", 1, 1, "In the beginning God created")],
        )
        .with_alignment(john_1_1(), r#"[{"kjv":"the Word","greek":"ὁ λόγος"}]"#)
        .with_alignment(genesis_1_1(), r#"[{"kjv":"God created","hebrew":"בָּרָא אֱלֹהִים"}]"#)
}

#[tokio::test]
async fn test_superseded_alignment_is_discarded() {
    let backend = backend();
    let release = backend.gate(john_1_1());
    let ctx = StudyContext::new(backend, StudyConfig::default());

    let (first, second, _) = tokio::join!(
        commands::go_search(&ctx, "John 1:1"),
        commands::go_search(&ctx, "Genesis 1:1"),
        async {
            tokio::task::yield_now().await;
            let _ = release.send(());
        }
    );

    assert_eq!(first.unwrap(), NavigationOutcome::Superseded);
    assert_eq!(
        second.unwrap(),
        NavigationOutcome::Displayed {
            verses: 1,
            aligned: true
        }
    );

    let session = ctx.session.lock().unwrap();
    let index = session.alignment().index().unwrap();
    assert_eq!(index.verse(), &genesis_1_1());
    assert_eq!(index.lookup("god"), &[0]);
    assert!(index.lookup("word").is_empty());
    assert_eq!(session.current_verse(), Some(&genesis_1_1()));
}

#[tokio::test]
async fn test_usage_scope_scenario() {
    let mut backend = backend();
    backend.usages.insert(
        "beginning".to_string(),
        vec![
            VerseText::new("John", 1, 2, "The same was in the beginning with God."),
            VerseText::new("John", 8, 25, "the same that I said unto you from the beginning."),
            VerseText::new("Genesis", 1, 1, "In the beginning God created"),
        ],
    );
    let ctx = StudyContext::new(backend, StudyConfig::default());
    commands::go_search(&ctx, "John 1:1").await.unwrap();

    let outcome = commands::click_word(&ctx, WordPos::new(0, 4)).await.unwrap();
    let LookupOutcome::Listed(listing) = outcome else {
        panic!("expected a listing, got {:?}", outcome);
    };
    assert_eq!(listing.word, "beginning");
    assert_eq!(listing.total, 3);
    assert_eq!(listing.groups.len(), 2);

    let listing = commands::set_usage_scope(&ctx, UsageScope::CurrentBook)
        .unwrap()
        .unwrap();
    assert_eq!(listing.groups.len(), 1);
    assert_eq!(listing.groups[0].book, "John");
    assert_eq!(listing.groups[0].entries.len(), 2);
}

#[tokio::test]
async fn test_short_word_click_is_ignored() {
    let backend = FakeBackend::default().with_verse(
        "Isaiah 6:8",
        vec![VerseText::new("Isaiah", 6, 8, "Here am I; send me.")],
    );
    let ctx = StudyContext::new(backend, StudyConfig::default());
    commands::go_search(&ctx, "Isaiah 6:8").await.unwrap();

    // "I;" normalizes to a single character
    let outcome = commands::click_word(&ctx, WordPos::new(0, 4)).await.unwrap();
    assert_eq!(outcome, LookupOutcome::Ignored);
    assert_eq!(ctx.session.lock().unwrap().usages(), &UsageState::NotSearched);
}

#[tokio::test]
async fn test_usage_failure_leaves_listing_empty() {
    let mut backend = backend();
    backend.fail_usages = true;
    let ctx = StudyContext::new(backend, StudyConfig::default());
    commands::go_search(&ctx, "John 1:1").await.unwrap();

    let outcome = commands::click_word(&ctx, WordPos::new(0, 4)).await.unwrap();
    assert!(matches!(
        outcome,
        LookupOutcome::Unavailable(StudyError::CollaboratorUnavailable(_))
    ));
    let session = ctx.session.lock().unwrap();
    assert!(matches!(session.usages(), UsageState::Unavailable(_)));
    assert!(session.occurrences().is_none());
}

#[tokio::test]
async fn test_malformed_alignment_disables_hover() {
    let backend = FakeBackend::default()
        .with_verse(
            "John 1:1",
            vec![VerseText::new("John", 1, 1, "In the beginning was the Word")],
        )
        .with_alignment(john_1_1(), "I'm sorry, here is the alignment you asked for");
    let ctx = StudyContext::new(backend, StudyConfig::default());

    let outcome = commands::go_search(&ctx, "John 1:1").await.unwrap();
    assert_eq!(
        outcome,
        NavigationOutcome::Displayed {
            verses: 1,
            aligned: false
        }
    );
    assert!(matches!(
        ctx.session.lock().unwrap().alignment(),
        AlignmentState::Unavailable(_)
    ));
    assert!(commands::hover_word(&ctx, WordPos::new(0, 8)).unwrap().is_none());
    assert!(passage_html(&ctx).unwrap().contains("data-word=\"word\""));
}

#[tokio::test]
async fn test_hover_and_leave() {
    let ctx = StudyContext::new(backend(), StudyConfig::default());
    commands::go_search(&ctx, "John 1:1").await.unwrap();

    // In(0) the(2) beginning(4) was(6) the(8) Word(10)
    let hover = commands::hover_word(&ctx, WordPos::new(0, 10)).unwrap().unwrap();
    assert_eq!(hover.tooltip, vec!["EN: the Word  |  GR: ὁ λόγος"]);
    let html = passage_html(&ctx).unwrap();
    assert!(html.contains("class=\"word-span hl-kjv\" data-word=\"the\" data-verse=\"0\" data-idx=\"2\""));

    commands::leave_word(&ctx).unwrap();
    assert!(!passage_html(&ctx).unwrap().contains("hl-kjv"));
}

#[tokio::test]
async fn test_not_found_and_malformed_reference() {
    let ctx = StudyContext::new(backend(), StudyConfig::default());
    assert_eq!(
        commands::go_search(&ctx, "Hezekiah 4:1").await.unwrap(),
        NavigationOutcome::NotFound
    );

    let err = commands::go_search(&ctx, "John 1:").await.unwrap_err();
    assert!(matches!(err, StudyError::MalformedReference(_)));
    assert_eq!(ctx.collaborator.verse_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_passages_are_cached() {
    let ctx = StudyContext::new(backend(), StudyConfig::default());
    commands::go_search(&ctx, "John 1:1").await.unwrap();
    commands::go_search(&ctx, "john 1:1 ").await.unwrap();
    commands::go_search(&ctx, "John 1:1").await.unwrap();
    // "john" is a different key and not known to the backend
    assert_eq!(ctx.collaborator.verse_fetches.load(Ordering::SeqCst), 2);
    assert_eq!(ctx.cache.stats().0, 1);
}

#[tokio::test]
async fn test_alignment_disabled_skips_fetch() {
    let config = StudyConfig {
        alignment_enabled: false,
        ..Default::default()
    };
    let ctx = StudyContext::new(backend(), config);
    let outcome = commands::go_search(&ctx, "John 1:1").await.unwrap();
    assert_eq!(
        outcome,
        NavigationOutcome::Displayed {
            verses: 1,
            aligned: false
        }
    );
    assert!(matches!(
        ctx.session.lock().unwrap().alignment(),
        AlignmentState::NotComputed
    ));
}

#[tokio::test]
async fn test_bible_search() {
    let ctx = StudyContext::new(backend(), StudyConfig::default());
    let listing = commands::run_bible_search(&ctx, " shepherd ", TestamentFilter::New)
        .await
        .unwrap();
    assert_eq!(listing.total, 1);
    assert_eq!(listing.groups[0].book, "John");

    let err = commands::run_bible_search(&ctx, "   ", TestamentFilter::All)
        .await
        .unwrap_err();
    assert!(matches!(err, StudyError::InvalidQuery(_)));
}

#[tokio::test]
async fn test_click_loads_word_study_with_usages() {
    let ctx = StudyContext::new(backend(), StudyConfig::default());
    assert_eq!(study_html(&ctx).unwrap(), None);
    commands::go_search(&ctx, "John 1:1").await.unwrap();

    let outcome = commands::click_word(&ctx, WordPos::new(0, 4)).await.unwrap();
    assert!(matches!(outcome, LookupOutcome::Listed(_)));
    {
        let session = ctx.session.lock().unwrap();
        let StudyState::Loaded(study) = session.word_study() else {
            panic!("expected a word study, got {:?}", session.word_study());
        };
        assert_eq!(study.sections[0].lines[0].text, "beginning as used in John 1:1");
    }
    let html = study_html(&ctx).unwrap().unwrap();
    assert!(html.starts_with("<span class=\"word-title\">beginning</span><span class=\"verse-ref\">John 1:1</span>"));
    assert!(html.contains("<span class=\"def\">beginning as used in John 1:1</span>"));

    commands::go_search(&ctx, "Genesis 1:1").await.unwrap();
    assert_eq!(study_html(&ctx).unwrap(), None);
}

#[tokio::test]
async fn test_word_study_failure_keeps_usages() {
    let mut backend = backend();
    backend.fail_study = true;
    let ctx = StudyContext::new(backend, StudyConfig::default());
    commands::go_search(&ctx, "John 1:1").await.unwrap();

    let outcome = commands::click_word(&ctx, WordPos::new(0, 4)).await.unwrap();
    assert!(matches!(outcome, LookupOutcome::Listed(_)));
    assert!(matches!(
        ctx.session.lock().unwrap().word_study(),
        StudyState::Unavailable(_)
    ));
    assert!(study_html(&ctx).unwrap().unwrap().contains("Word study unavailable."));
}

#[tokio::test]
async fn test_cross_references() {
    let ctx = StudyContext::new(backend(), StudyConfig::default());
    let (verse, refs) = commands::run_cross_references(&ctx, "John 1:1").await.unwrap();
    assert_eq!(verse, john_1_1());
    assert_eq!(refs.xrefs[0].reference, "Genesis 1:1");

    let (_, refs) = commands::run_cross_references(&ctx, "Obadiah 1:1").await.unwrap();
    assert!(refs.is_empty());

    let err = commands::run_cross_references(&ctx, "Romans 8").await.unwrap_err();
    assert!(matches!(err, StudyError::MalformedReference(_)));
}
