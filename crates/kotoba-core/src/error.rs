use std::path::PathBuf;

use crate::query::{Relevance, TokenType};

/// Raised while turning user text into a compiled query
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Malformed query: {0}")]
    Malformed(String),

    #[error("Failed to compile {kind} pattern for {relevance} relevance: {source}")]
    PatternCompileFailed {
        kind: TokenType,
        relevance: Relevance,
        #[source]
        source: regex::Error,
    },
}

impl QueryError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        QueryError::Malformed(reason.into())
    }
}

/// A single dictionary line that does not fit its format's grammar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("Malformed record: {0}")]
    Malformed(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Dictionary file unavailable: {}: {source}", path.display())]
    DictionaryFileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Query has not been compiled")]
    QueryNotCompiled,

    #[error("Query was compiled for {query} dictionaries, not {dictionary}")]
    FormatMismatch {
        query: &'static str,
        dictionary: &'static str,
    },

    #[error("Search is already running")]
    AlreadyRunning,

    #[error("Failed to spawn search worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
