//! Backend collaborator contract and its HTTP implementation

use crate::compare::TranslationId;
use crate::error::StudyError;
use crate::reference::{ReferenceQuery, VerseRef, VerseText};
use crate::study::{CrossReferences, WordStudy};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Everything the study engine asks of the backend.
pub trait Collaborator: Send + Sync {
    /// Verses of a passage. An unknown reference yields an empty list.
    fn fetch_verses(
        &self,
        query: &ReferenceQuery,
    ) -> impl Future<Output = Result<Vec<VerseText>, StudyError>> + Send;

    /// Verses containing `word`, excluding `origin`.
    fn fetch_usages(
        &self,
        word: &str,
        origin: &VerseRef,
    ) -> impl Future<Output = Result<Vec<VerseText>, StudyError>> + Send;

    /// Raw, unvalidated alignment output for one verse.
    fn fetch_alignment(
        &self,
        verse: &VerseRef,
        text: &str,
    ) -> impl Future<Output = Result<String, StudyError>> + Send;

    fn fetch_translations(
        &self,
        verse: &VerseRef,
        sources: &[TranslationId],
    ) -> impl Future<Output = Result<BTreeMap<TranslationId, String>, StudyError>> + Send;

    fn search(&self, phrase: &str)
        -> impl Future<Output = Result<Vec<VerseText>, StudyError>> + Send;

    /// Lexical notes for `word` as used in `verse`.
    fn fetch_word_study(
        &self,
        word: &str,
        verse: &VerseRef,
    ) -> impl Future<Output = Result<WordStudy, StudyError>> + Send;

    fn fetch_cross_references(
        &self,
        verse: &VerseRef,
    ) -> impl Future<Output = Result<CrossReferences, StudyError>> + Send;
}

/// One row of `/api/translations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRow {
    pub source: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
struct AlignmentRequest<'a> {
    book: &'a str,
    chapter: u32,
    verse: u32,
    text: &'a str,
}

pub struct HttpCollaborator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCollaborator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StudyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StudyError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON body. 404 is the empty value.
    async fn get_json<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, StudyError> {
        debug!(path, ?params, "collaborator request");
        let response = self.client.get(self.url(path)).query(params).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(path, "collaborator returned 404");
            return Ok(T::default());
        }
        if !status.is_success() {
            warn!(path, %status, "collaborator request failed");
            return Err(StudyError::CollaboratorUnavailable(format!(
                "{} returned HTTP {}",
                path, status
            )));
        }

        Ok(response.json().await?)
    }
}

impl Collaborator for HttpCollaborator {
    async fn fetch_verses(&self, query: &ReferenceQuery) -> Result<Vec<VerseText>, StudyError> {
        let mut params = vec![("book", query.book.clone())];
        if let Some(chapter) = query.chapter {
            params.push(("chapter", chapter.to_string()));
        }
        if let Some(verse) = query.verse {
            params.push(("verse", verse.to_string()));
        }
        params.push(("source", TranslationId::Kjv.tag().to_string()));
        self.get_json("/api/scripture", &params).await
    }

    async fn fetch_usages(
        &self,
        word: &str,
        origin: &VerseRef,
    ) -> Result<Vec<VerseText>, StudyError> {
        let params = [
            ("word", word.to_string()),
            ("book", origin.book.clone()),
            ("chapter", origin.chapter.to_string()),
            ("verse", origin.verse.to_string()),
        ];
        self.get_json("/api/usages", &params).await
    }

    async fn fetch_alignment(&self, verse: &VerseRef, text: &str) -> Result<String, StudyError> {
        let request = AlignmentRequest {
            book: &verse.book,
            chapter: verse.chapter,
            verse: verse.verse,
            text,
        };
        debug!(%verse, "requesting alignment");
        let response = self
            .client
            .post(self.url("/api/alignment"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%verse, %status, "alignment request failed");
            return Err(StudyError::CollaboratorUnavailable(format!(
                "/api/alignment returned HTTP {}",
                status
            )));
        }
        Ok(response.text().await?)
    }

    async fn fetch_translations(
        &self,
        verse: &VerseRef,
        sources: &[TranslationId],
    ) -> Result<BTreeMap<TranslationId, String>, StudyError> {
        let tags: Vec<&str> = sources.iter().map(TranslationId::tag).collect();
        let params = [
            ("book", verse.book.clone()),
            ("chapter", verse.chapter.to_string()),
            ("verse", verse.verse.to_string()),
            ("sources", tags.join(",")),
        ];
        let rows: Vec<TranslationRow> = self.get_json("/api/translations", &params).await?;

        let mut translations = BTreeMap::new();
        for row in rows {
            match TranslationId::from_tag(&row.source) {
                Some(id) => {
                    translations.insert(id, row.text);
                }
                None => debug!(source = %row.source, "ignoring unknown translation"),
            }
        }
        Ok(translations)
    }

    async fn search(&self, phrase: &str) -> Result<Vec<VerseText>, StudyError> {
        self.get_json("/api/search", &[("q", phrase.to_string())])
            .await
    }

    async fn fetch_word_study(&self, word: &str, verse: &VerseRef) -> Result<WordStudy, StudyError> {
        let params = [
            ("word", word.to_string()),
            ("book", verse.book.clone()),
            ("chapter", verse.chapter.to_string()),
            ("verse", verse.verse.to_string()),
        ];
        self.get_json("/api/wordstudy", &params).await
    }

    async fn fetch_cross_references(&self, verse: &VerseRef) -> Result<CrossReferences, StudyError> {
        let params = [
            ("book", verse.book.clone()),
            ("chapter", verse.chapter.to_string()),
            ("verse", verse.verse.to_string()),
        ];
        self.get_json("/api/xrefs", &params).await
    }
}
