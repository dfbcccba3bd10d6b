//! Error types for Lectio

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StudyError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("{0}")]
    Other(String),
}

impl StudyError {
    /// Whether the user can reasonably retry the same action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StudyError::CollaboratorUnavailable(_))
    }
}

impl serde::Serialize for StudyError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<reqwest::Error> for StudyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StudyError::MalformedPayload(err.to_string())
        } else {
            StudyError::CollaboratorUnavailable(err.to_string())
        }
    }
}

impl From<askama::Error> for StudyError {
    fn from(err: askama::Error) -> Self {
        StudyError::Other(format!("Failed to render template: {}", err))
    }
}
