//! Error types for Lectio

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LectioError {
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Invalid corpus: {0}")]
    InvalidCorpus(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Request superseded by a newer query")]
    Superseded,
}

impl LectioError {
    /// True for errors caused by malformed caller input.
    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            LectioError::InvalidReference(_) | LectioError::InvalidCorpus(_) | LectioError::InvalidQuery(_)
        )
    }
}

impl From<rusqlite::Error> for LectioError {
    fn from(e: rusqlite::Error) -> Self {
        LectioError::Database(e.to_string())
    }
}

impl serde::Serialize for LectioError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
