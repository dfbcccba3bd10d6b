//! Cross-language phrase alignment for a single verse

use crate::error::StudyError;
use crate::reference::VerseRef;
use crate::tokens::{phrase_keys, ScriptMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Kjv,
    Hebrew,
    Greek,
    Latin,
}

impl Language {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "kjv" => Some(Language::Kjv),
            "hebrew" => Some(Language::Hebrew),
            "greek" => Some(Language::Greek),
            "latin" => Some(Language::Latin),
            _ => None,
        }
    }

    /// Short label used in tooltips.
    pub fn label(&self) -> &'static str {
        match self {
            Language::Kjv => "EN",
            Language::Hebrew => "HE",
            Language::Greek => "GR",
            Language::Latin => "LA",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Language::Kjv => "hl-kjv",
            Language::Hebrew => "hl-hebrew",
            Language::Greek => "hl-greek",
            Language::Latin => "hl-latin",
        }
    }
}

/// One aligned phrase set, ordered by language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentGroup {
    pub phrases: Vec<(Language, String)>,
}

impl AlignmentGroup {
    pub fn new(mut phrases: Vec<(Language, String)>) -> Self {
        phrases.sort_by_key(|(lang, _)| *lang);
        Self { phrases }
    }

    pub fn phrase(&self, language: Language) -> Option<&str> {
        self.phrases
            .iter()
            .find(|(lang, _)| *lang == language)
            .map(|(_, phrase)| phrase.as_str())
    }

    fn tooltip_line(&self) -> String {
        self.phrases
            .iter()
            .map(|(lang, phrase)| format!("{}: {}", lang.label(), phrase))
            .collect::<Vec<_>>()
            .join("  |  ")
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let mut body = raw.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // drop the info string ("json") up to the first newline
        body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Validate untrusted alignment output and turn it into groups.
///
/// The payload must be a JSON array of objects. Every key must be a known
/// language tag with a non-empty string value and every group needs a `kjv`
/// phrase.
pub fn parse_alignment_payload(raw: &str) -> Result<Vec<AlignmentGroup>, StudyError> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| StudyError::MalformedPayload(format!("alignment is not JSON: {}", e)))?;

    let items = value
        .as_array()
        .ok_or_else(|| StudyError::MalformedPayload("alignment is not an array".to_string()))?;

    let mut groups = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let object = item.as_object().ok_or_else(|| {
            StudyError::MalformedPayload(format!("alignment group {} is not an object", i))
        })?;

        let mut phrases = Vec::with_capacity(object.len());
        for (tag, phrase) in object {
            let language = Language::from_tag(tag).ok_or_else(|| {
                StudyError::MalformedPayload(format!("unknown language '{}' in group {}", tag, i))
            })?;
            let phrase = phrase
                .as_str()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| {
                    StudyError::MalformedPayload(format!("empty '{}' phrase in group {}", tag, i))
                })?;
            phrases.push((language, phrase.to_string()));
        }

        if !phrases.iter().any(|(lang, _)| *lang == Language::Kjv) {
            return Err(StudyError::MalformedPayload(format!(
                "group {} has no kjv phrase",
                i
            )));
        }
        groups.push(AlignmentGroup::new(phrases));
    }

    Ok(groups)
}

/// Result of hovering a key: what to highlight and what to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverInfo {
    pub key: String,
    pub group_ids: Vec<usize>,
    pub highlights: Vec<(Language, BTreeSet<String>)>,
    pub tooltip: Vec<String>,
}

impl HoverInfo {
    /// Highlight classes for a span with this key.
    pub fn classes_for(&self, key: &str) -> Vec<&'static str> {
        self.highlights
            .iter()
            .filter(|(_, keys)| keys.contains(key))
            .map(|(lang, _)| lang.css_class())
            .collect()
    }
}

/// Key → group ids for the verse the groups were produced for.
#[derive(Debug, Clone)]
pub struct AlignmentIndex {
    verse: VerseRef,
    groups: Vec<AlignmentGroup>,
    tokens: HashMap<String, Vec<usize>>,
}

impl AlignmentIndex {
    pub fn build(verse: VerseRef, groups: Vec<AlignmentGroup>) -> Self {
        let mut tokens: HashMap<String, Vec<usize>> = HashMap::new();

        for (id, group) in groups.iter().enumerate() {
            for (_, phrase) in &group.phrases {
                for key in phrase_keys(phrase, ScriptMode::Multilingual) {
                    let ids = tokens.entry(key).or_default();
                    // ids are pushed in ascending order, so a repeat is always last
                    if ids.last() != Some(&id) {
                        ids.push(id);
                    }
                }
            }
        }

        Self {
            verse,
            groups,
            tokens,
        }
    }

    pub fn verse(&self) -> &VerseRef {
        &self.verse
    }

    pub fn groups(&self) -> &[AlignmentGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn lookup(&self, key: &str) -> &[usize] {
        self.tokens.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn hover(&self, key: &str) -> Option<HoverInfo> {
        let group_ids = self.lookup(key);
        if group_ids.is_empty() {
            return None;
        }

        let mut highlights: Vec<(Language, BTreeSet<String>)> = Vec::new();
        let mut tooltip = Vec::with_capacity(group_ids.len());

        for group in group_ids.iter().filter_map(|id| self.groups.get(*id)) {
            for (lang, phrase) in &group.phrases {
                let keys = phrase_keys(phrase, ScriptMode::Multilingual).into_iter();
                match highlights.iter_mut().find(|(l, _)| l == lang) {
                    Some((_, set)) => set.extend(keys),
                    None => highlights.push((*lang, keys.collect())),
                }
            }
            tooltip.push(group.tooltip_line());
        }
        highlights.sort_by_key(|(lang, _)| *lang);

        Some(HoverInfo {
            key: key.to_string(),
            group_ids: group_ids.to_vec(),
            highlights,
            tooltip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis_1_1() -> VerseRef {
        VerseRef::new("Genesis", 1, 1).unwrap()
    }

    fn sample_groups() -> Vec<AlignmentGroup> {
        vec![
            AlignmentGroup::new(vec![
                (Language::Kjv, "In the beginning".to_string()),
                (Language::Hebrew, "בְּרֵאשִׁית".to_string()),
            ]),
            AlignmentGroup::new(vec![
                (Language::Kjv, "God created".to_string()),
                (Language::Hebrew, "בָּרָא אֱלֹהִים".to_string()),
            ]),
            AlignmentGroup::new(vec![
                (Language::Kjv, "the heaven and the earth".to_string()),
                (Language::Greek, "τὸν οὐρανὸν καὶ τὴν γῆν".to_string()),
            ]),
        ]
    }

    #[test]
    fn test_index_lists_every_group_once() {
        let index = AlignmentIndex::build(genesis_1_1(), sample_groups());
        // "the" appears in group 0 once and group 2 twice
        assert_eq!(index.lookup("the"), &[0, 2]);
        assert_eq!(index.lookup("god"), &[1]);
        assert_eq!(index.lookup("אֱלֹהִים"), &[1]);
        assert_eq!(index.lookup("γῆν"), &[2]);
        assert!(index.lookup("missing").is_empty());
    }

    #[test]
    fn test_apostrophes_are_never_indexed() {
        let groups = vec![AlignmentGroup::new(vec![
            (Language::Kjv, "the LORD ' s ''".to_string()),
            (Language::Hebrew, "יְהוָה".to_string()),
        ])];
        let index = AlignmentIndex::build(genesis_1_1(), groups);
        assert!(index.lookup("'").is_empty());
        assert!(index.lookup("''").is_empty());
        assert!(index.hover("'").is_none());
        let hover = index.hover("lord").unwrap();
        assert!(hover.classes_for("'").is_empty());
        assert_eq!(hover.classes_for("s"), vec!["hl-kjv"]);
    }

    #[test]
    fn test_index_covers_every_phrase_word() {
        let groups = sample_groups();
        let index = AlignmentIndex::build(genesis_1_1(), groups.clone());
        for (id, group) in groups.iter().enumerate() {
            for (_, phrase) in &group.phrases {
                for key in phrase_keys(phrase, ScriptMode::Multilingual) {
                    let ids = index.lookup(&key);
                    assert!(ids.contains(&id), "{key} missing group {id}");
                    let mut sorted = ids.to_vec();
                    sorted.dedup();
                    assert_eq!(sorted.len(), ids.len());
                }
            }
        }
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let raw = "```json\n[{\"kjv\":\"In the beginning\",\"hebrew\":\"בְּרֵאשִׁית\"}]\n```";
        let groups = parse_alignment_payload(raw).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].phrase(Language::Kjv), Some("In the beginning"));
        assert_eq!(groups[0].phrase(Language::Hebrew), Some("בְּרֵאשִׁית"));
    }

    #[test]
    fn test_parse_orders_languages() {
        let raw = r#"[{"latin":"Deus","greek":"θεός","kjv":"God"}]"#;
        let groups = parse_alignment_payload(raw).unwrap();
        let langs: Vec<_> = groups[0].phrases.iter().map(|(l, _)| *l).collect();
        assert_eq!(langs, vec![Language::Kjv, Language::Greek, Language::Latin]);
    }

    #[test]
    fn test_parse_rejects_bad_payloads() {
        let bad = [
            "Sorry, I cannot help with that.",
            r#"{"kjv":"God"}"#,
            r#"["God"]"#,
            r#"[{"kjv":"God","syriac":"ܐܠܗܐ"}]"#,
            r#"[{"kjv":""}]"#,
            r#"[{"kjv":3}]"#,
            r#"[{"hebrew":"אֱלֹהִים"}]"#,
        ];
        for raw in bad {
            assert!(
                matches!(parse_alignment_payload(raw), Err(StudyError::MalformedPayload(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(parse_alignment_payload("[]").unwrap().is_empty());
    }

    #[test]
    fn test_hover_collects_highlights_and_tooltip() {
        let index = AlignmentIndex::build(genesis_1_1(), sample_groups());
        let hover = index.hover("god").unwrap();
        assert_eq!(hover.group_ids, vec![1]);
        assert_eq!(hover.tooltip, vec!["EN: God created  |  HE: בָּרָא אֱלֹהִים"]);
        assert_eq!(hover.classes_for("created"), vec!["hl-kjv"]);
        assert_eq!(hover.classes_for("אֱלֹהִים"), vec!["hl-hebrew"]);
        assert!(hover.classes_for("beginning").is_empty());
        assert!(index.hover("firmament").is_none());
    }

    #[test]
    fn test_index_remembers_its_verse() {
        let index = AlignmentIndex::build(genesis_1_1(), Vec::new());
        assert_eq!(index.verse(), &genesis_1_1());
        assert!(index.is_empty());
    }
}
