use serde::Serialize;

use crate::query::Relevance;
use crate::record::Record;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Query text typed by the user
    TextInput(String),
    SelectDictionary(String),
    CancelSearch,
    ShowResults(Vec<DisplayResult>),
    SearchStatus {
        status: String,
        progress: f64,
    },
    /// Query or dictionary problem, shown to the user as is
    SearchFailed(String),
    SearchFinished {
        dictionary: String,
        total: usize,
    },
    Shutdown,
}

/// A kept record flattened for printing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayResult {
    pub relevance: Relevance,
    pub term: String,
    pub reading: String,
    pub definition: String,
    pub important: bool,
}

impl DisplayResult {
    pub fn from_record(relevance: Relevance, record: &Record<'_>) -> Self {
        let (term, reading, definition) = match record {
            Record::Edict(e) => (
                e.headwords().collect::<Vec<_>>().join(", "),
                e.readings().collect::<Vec<_>>().join(", "),
                e.glosses().collect::<Vec<_>>().join("; "),
            ),
            Record::Kanji(k) => (
                k.character.to_string(),
                k.readings[0].join(", "),
                k.meanings.join("; "),
            ),
            Record::Example(x) => (
                x.japanese.to_string(),
                x.breakdown.as_deref().unwrap_or_default().to_string(),
                x.english.to_string(),
            ),
            Record::Unknown(u) => (u.raw.to_string(), String::new(), String::new()),
        };

        Self {
            relevance,
            term,
            reading,
            definition,
            important: record.is_important(),
        }
    }
}
