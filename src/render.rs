//! HTML fragments for the reading, study, compare, cross-reference and search
//! panes
//!
//! Fragments are askama templates. Every piece of source text goes through the
//! template's HTML escaping; highlight markup is template text wrapped around
//! the escaped segments.

use crate::alignment::HoverInfo;
use crate::compare::{ComparisonView, TranslationId};
use crate::error::StudyError;
use crate::highlight::Segment;
use crate::occurrences::{OccurrenceListing, UsageScope};
use crate::reference::VerseRef;
use crate::search::{SearchListing, RESULT_CAP};
use crate::state::{DisplayedVerse, WordPos};
use crate::study::{CrossReferences, WordStudy};
use askama::Template;

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

struct TokenView<'a> {
    raw: &'a str,
    key: &'a str,
    idx: usize,
    interactive: bool,
    class: String,
}

struct VerseView<'a> {
    index: usize,
    reference: String,
    tokens: Vec<TokenView<'a>>,
}

#[derive(Template)]
#[template(
    source = r#"
{%- for verse in verses -%}
<div class="verse"><span class="verse-hdr">{{ verse.reference }}</span><span class="src-lbl">{{ label }}</span><div class="src-text">
{%- for token in verse.tokens -%}
{%- if token.interactive -%}
<span class="{{ token.class }}" data-word="{{ token.key }}" data-verse="{{ verse.index }}" data-idx="{{ token.idx }}">{{ token.raw }}</span>
{%- else -%}
{{ token.raw }}
{%- endif -%}
{%- endfor -%}
</div></div>
{%- endfor -%}"#,
    ext = "html"
)]
struct PassageTemplate<'a> {
    verses: Vec<VerseView<'a>>,
    label: &'a str,
}

/// The reading pane: one block per verse, interactive tokens as word spans.
pub fn render_passage(
    verses: &[DisplayedVerse],
    clicked: Option<WordPos>,
    hover: Option<&HoverInfo>,
) -> Result<String, StudyError> {
    let verses = verses
        .iter()
        .enumerate()
        .map(|(vi, verse)| VerseView {
            index: vi,
            reference: verse.text.reference().to_string(),
            tokens: verse
                .tokens
                .iter()
                .enumerate()
                .map(|(ti, token)| {
                    let mut class = String::from("word-span");
                    if clicked == Some(WordPos::new(vi, ti)) {
                        class.push_str(" clicked");
                    }
                    if let Some(hover) = hover {
                        for hl in hover.classes_for(&token.key) {
                            class.push(' ');
                            class.push_str(hl);
                        }
                    }
                    TokenView {
                        raw: &token.raw,
                        key: &token.key,
                        idx: ti,
                        interactive: token.is_interactive(),
                        class,
                    }
                })
                .collect(),
        })
        .collect();

    let template = PassageTemplate {
        verses,
        label: TranslationId::Kjv.label(),
    };
    Ok(template.render()?)
}

#[derive(Template)]
#[template(
    source = r#"<span class="usages-count">({{ count }})</span>
{%- if listing.is_empty() -%}
<span class="loading">"{{ listing.word }}" not found elsewhere {{ place }}.</span>
{%- else -%}
{%- for group in listing.groups -%}
<span class="book-hdr">{{ group.book }}</span>
{%- for entry in group.entries -%}
<span class="ref">{{ entry.chapter }}:{{ entry.verse }}</span>  <span class="text-line">
{%- for segment in entry.segments -%}
{%- if segment.marked -%}<span class="hl">{{ segment.text }}</span>{%- else -%}{{ segment.text }}{%- endif -%}
{%- endfor -%}
</span><br>
{%- endfor -%}
{%- endfor -%}
{%- endif -%}"#,
    ext = "html"
)]
struct OccurrencesTemplate<'a> {
    listing: &'a OccurrenceListing,
    count: String,
    place: &'a str,
}

pub fn render_occurrences(listing: &OccurrenceListing) -> Result<String, StudyError> {
    let place = match listing.scope {
        UsageScope::CurrentBook => "in this book",
        UsageScope::All => "in the Bible",
    };
    let template = OccurrencesTemplate {
        listing,
        count: plural(listing.total, "result"),
        place,
    };
    Ok(template.render()?)
}

struct CompareEntryView<'a> {
    label: &'a str,
    class: String,
    segments: &'a [Segment],
}

fn script_class(id: TranslationId) -> Option<&'static str> {
    match id {
        TranslationId::TanakhHebrew => Some("text-hebrew"),
        TranslationId::Septuagint | TranslationId::TextusReceptus => Some("text-greek"),
        TranslationId::Vulgate => Some("text-latin"),
        TranslationId::Kjv | TranslationId::TanakhEnglish | TranslationId::Web => None,
    }
}

#[derive(Template)]
#[template(
    source = r#"<span class="ch-title">{{ verse }}</span><hr class="divider">
{%- if entries.is_empty() -%}
<span class="loading">No results found.</span>
{%- else -%}
{%- for entry in entries -%}
<span class="cmp-src">{{ entry.label }}</span><span class="{{ entry.class }}">
{%- for segment in entry.segments -%}
{%- if segment.marked -%}<span class="diff">{{ segment.text }}</span>{%- else -%}{{ segment.text }}{%- endif -%}
{%- endfor -%}
</span>
{%- endfor -%}
{%- if show_legend -%}
<span class="dim legend">Highlighted words are not shared by every English translation shown.</span>
{%- endif -%}
{%- endif -%}"#,
    ext = "html"
)]
struct ComparisonTemplate<'a> {
    verse: &'a VerseRef,
    entries: Vec<CompareEntryView<'a>>,
    show_legend: bool,
}

pub fn render_comparison(view: &ComparisonView) -> Result<String, StudyError> {
    let entries = view
        .entries
        .iter()
        .map(|entry| CompareEntryView {
            label: &entry.label,
            class: match script_class(entry.source) {
                Some(script) => format!("cmp-text {}", script),
                None => "cmp-text".to_string(),
            },
            segments: &entry.segments,
        })
        .collect();

    let template = ComparisonTemplate {
        verse: &view.verse,
        entries,
        show_legend: view.show_legend,
    };
    Ok(template.render()?)
}

struct SearchGroupView<'a> {
    book: &'a str,
    count: String,
    entries: &'a [crate::search::SearchEntry],
}

#[derive(Template)]
#[template(
    source = r#"<span class="bs-count">({{ summary }})</span>
{%- if groups.is_empty() -%}
<span class="loading">No results found for "{{ phrase }}" in this filter.</span>
{%- else -%}
{%- for group in groups -%}
<span class="book-hdr">{{ group.book }}</span> <span class="book-count">({{ group.count }})</span>
{%- for entry in group.entries -%}
<br><span class="ref">{{ entry.chapter }}:{{ entry.verse }}</span>  <span class="text-line">
{%- for segment in entry.segments -%}
{%- if segment.marked -%}<span class="hl">{{ segment.text }}</span>{%- else -%}{{ segment.text }}{%- endif -%}
{%- endfor -%}
</span>
{%- endfor -%}
{%- endfor -%}
{%- endif -%}"#,
    ext = "html"
)]
struct SearchTemplate<'a> {
    phrase: &'a str,
    summary: String,
    groups: Vec<SearchGroupView<'a>>,
}

pub fn render_search_results(listing: &SearchListing) -> Result<String, StudyError> {
    let mut summary = plural(listing.total, "verse");
    if listing.truncated {
        summary.push_str(&format!(" (showing first {})", RESULT_CAP));
    }
    let groups = if listing.is_empty() {
        Vec::new()
    } else {
        listing
            .groups
            .iter()
            .map(|group| SearchGroupView {
                book: &group.book,
                count: plural(group.book_count, "verse"),
                entries: &group.entries,
            })
            .collect()
    };

    let template = SearchTemplate {
        phrase: &listing.phrase,
        summary,
        groups,
    };
    Ok(template.render()?)
}

#[derive(Template)]
#[template(
    source = r#"<span class="word-title">{{ word }}</span><span class="verse-ref">{{ verse }}</span>
{%- if !snippet.is_empty() -%}
<span class="verse-text">{{ snippet }}</span>
{%- endif -%}
{%- if study.is_empty() -%}
<span class="loading">No word study available for this word.</span>
{%- endif -%}
{%- for section in study.sections -%}
<span class="section-hdr">{{ section.header }}</span><span class="divider">────────────────────────────────────</span>
{%- for line in section.lines -%}
<span class="{{ line.class() }}">{{ line.text }}</span>
{%- endfor -%}
{%- endfor -%}"#,
    ext = "html"
)]
struct WordStudyTemplate<'a> {
    word: &'a str,
    verse: &'a VerseRef,
    snippet: String,
    study: &'a WordStudy,
}

/// The word study pane for `word` as clicked in `verse`.
pub fn render_word_study(
    word: &str,
    verse: &VerseRef,
    study: &WordStudy,
) -> Result<String, StudyError> {
    let template = WordStudyTemplate {
        word,
        verse,
        snippet: study.verse_snippet().unwrap_or_default(),
        study,
    };
    Ok(template.render()?)
}

struct CrossReferenceView<'a> {
    reference: &'a str,
    text: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"<span class="ch-title">{{ verse }}</span>
{%- if !source.is_empty() -%}
<span class="section-hdr">SOURCE VERSE</span><span class="xref-src">“{{ source }}”</span>
{%- endif -%}
{%- if refs.is_empty() -%}
<span class="loading">No cross-references found.</span>
{%- else -%}
<span class="section-hdr">CROSS-REFERENCES ({{ refs.len() }})</span>
{%- for xref in refs -%}
<span class="xref-ref" data-ref="{{ xref.reference }}">{{ xref.reference }}</span>
{%- if !xref.text.is_empty() -%}
<span class="xref-text">{{ xref.text }}</span>
{%- endif -%}
{%- endfor -%}
<span class="dim">Click any reference to open it in the Scripture panel.</span>
{%- endif -%}"#,
    ext = "html"
)]
struct CrossReferencesTemplate<'a> {
    verse: &'a VerseRef,
    source: &'a str,
    refs: Vec<CrossReferenceView<'a>>,
}

pub fn render_cross_references(
    verse: &VerseRef,
    refs: &CrossReferences,
) -> Result<String, StudyError> {
    let template = CrossReferencesTemplate {
        verse,
        source: refs.src_text.as_deref().map(str::trim).unwrap_or_default(),
        refs: refs
            .xrefs
            .iter()
            .map(|xref| CrossReferenceView {
                reference: &xref.reference,
                text: xref.text.as_deref().map(str::trim).unwrap_or_default(),
            })
            .collect(),
    };
    Ok(template.render()?)
}

#[derive(Template)]
#[template(
    source = r#"<div class="tooltip">{% for line in lines %}{% if !loop.first %}<br>{% endif %}{{ line }}{% endfor %}</div>"#,
    ext = "html"
)]
struct TooltipTemplate<'a> {
    lines: &'a [String],
}

pub fn render_tooltip(hover: &HoverInfo) -> Result<String, StudyError> {
    Ok(TooltipTemplate {
        lines: &hover.tooltip,
    }
    .render()?)
}

#[derive(Template)]
#[template(source = r#"<span class="loading">{{ message }}</span>"#, ext = "html")]
struct NoticeTemplate<'a> {
    message: &'a str,
}

/// A single status line ("Searching…", "Usages unavailable.").
pub fn render_notice(message: &str) -> Result<String, StudyError> {
    Ok(NoticeTemplate { message }.render()?)
}
