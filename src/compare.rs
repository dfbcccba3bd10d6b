//! Translation comparison and distinctive-word highlighting

use crate::highlight::{split_word_runs, Segment};
use crate::reference::VerseRef;
use crate::tokens::{normalize_key, ScriptMode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationId {
    Kjv,
    TanakhEnglish,
    Web,
    TanakhHebrew,
    Septuagint,
    TextusReceptus,
    Vulgate,
}

impl TranslationId {
    /// Order in which translations are displayed.
    pub const DISPLAY_ORDER: [TranslationId; 7] = [
        TranslationId::Kjv,
        TranslationId::TanakhEnglish,
        TranslationId::Web,
        TranslationId::Septuagint,
        TranslationId::TextusReceptus,
        TranslationId::TanakhHebrew,
        TranslationId::Vulgate,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "kjv" => Some(TranslationId::Kjv),
            "tanakh_english" => Some(TranslationId::TanakhEnglish),
            "web" => Some(TranslationId::Web),
            "tanakh_hebrew" => Some(TranslationId::TanakhHebrew),
            "septuagint" => Some(TranslationId::Septuagint),
            "textus_receptus" => Some(TranslationId::TextusReceptus),
            "vulgate" => Some(TranslationId::Vulgate),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            TranslationId::Kjv => "kjv",
            TranslationId::TanakhEnglish => "tanakh_english",
            TranslationId::Web => "web",
            TranslationId::TanakhHebrew => "tanakh_hebrew",
            TranslationId::Septuagint => "septuagint",
            TranslationId::TextusReceptus => "textus_receptus",
            TranslationId::Vulgate => "vulgate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TranslationId::Kjv => "English (KJV)",
            TranslationId::TanakhEnglish => "English (Tanakh)",
            TranslationId::Web => "English (WEB)",
            TranslationId::TanakhHebrew => "Hebrew (Masoretic)",
            TranslationId::Septuagint => "Greek (Septuagint)",
            TranslationId::TextusReceptus => "Greek (Textus Receptus)",
            TranslationId::Vulgate => "Latin (Vulgate)",
        }
    }

    pub fn is_english(&self) -> bool {
        matches!(
            self,
            TranslationId::Kjv | TranslationId::TanakhEnglish | TranslationId::Web
        )
    }
}

fn chunk_key(chunk: &str) -> String {
    normalize_key(chunk, ScriptMode::English)
        .trim_matches('\'')
        .to_string()
}

/// Mark the words of each English translation that not every other English
/// translation shares. Non-English texts come back as one plain segment.
pub fn compute_distinctive(
    translations: &BTreeMap<TranslationId, String>,
    eligible: &HashSet<TranslationId>,
) -> BTreeMap<TranslationId, Vec<Segment>> {
    let participants: Vec<TranslationId> = translations
        .keys()
        .copied()
        .filter(|id| eligible.contains(id) && id.is_english())
        .collect();

    let mut word_freq: HashMap<String, usize> = HashMap::new();
    for id in &participants {
        let words: HashSet<String> = split_word_runs(&translations[id])
            .into_iter()
            .filter(|(_, is_word)| *is_word)
            .map(|(run, _)| chunk_key(run))
            .filter(|key| !key.is_empty())
            .collect();
        for word in words {
            *word_freq.entry(word).or_insert(0) += 1;
        }
    }
    let n = participants.len().max(1);

    let mut result = BTreeMap::new();
    for (id, text) in translations {
        if !eligible.contains(id) {
            continue;
        }
        if !id.is_english() {
            result.insert(*id, vec![Segment::plain(text.as_str())]);
            continue;
        }

        let segments = split_word_runs(text)
            .into_iter()
            .map(|(run, is_word)| {
                let key = if is_word { chunk_key(run) } else { String::new() };
                let distinctive =
                    !key.is_empty() && word_freq.get(&key).copied().unwrap_or(0) < n;
                Segment {
                    text: run.to_string(),
                    marked: distinctive,
                }
            })
            .collect();
        result.insert(*id, segments);
    }
    result
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub source: TranslationId,
    pub label: String,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonView {
    pub verse: VerseRef,
    pub entries: Vec<ComparisonEntry>,
    /// Whether the distinctive-word legend applies (more than one English text).
    pub show_legend: bool,
}

impl ComparisonView {
    /// Lay out the translations to display for `verse`.
    ///
    /// Active sources with text are shown in display order. When none of them
    /// has text, every returned source is shown instead.
    pub fn build(
        verse: VerseRef,
        translations: &BTreeMap<TranslationId, String>,
        active: &HashSet<TranslationId>,
    ) -> Self {
        let has_text = |id: &TranslationId| {
            translations
                .get(id)
                .map_or(false, |text| !text.trim().is_empty())
        };

        let mut shown: Vec<TranslationId> = TranslationId::DISPLAY_ORDER
            .iter()
            .copied()
            .filter(|id| active.contains(id) && has_text(id))
            .collect();
        if shown.is_empty() {
            shown = TranslationId::DISPLAY_ORDER
                .iter()
                .copied()
                .filter(|id| has_text(id))
                .collect();
        }

        let eligible: HashSet<TranslationId> = shown.iter().copied().collect();
        let trimmed: BTreeMap<TranslationId, String> = translations
            .iter()
            .filter(|(id, _)| eligible.contains(id))
            .map(|(id, text)| (*id, text.trim().to_string()))
            .collect();
        let mut segments = compute_distinctive(&trimmed, &eligible);

        let entries = shown
            .iter()
            .map(|id| ComparisonEntry {
                source: *id,
                label: id.label().to_string(),
                segments: segments.remove(id).unwrap_or_default(),
            })
            .collect();

        Self {
            verse,
            entries,
            show_legend: shown.iter().filter(|id| id.is_english()).count() > 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
