use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, RecordError};
use crate::format::{self, FormatAdapter};
use crate::language::Deconjugator;
use crate::query::{Query, QueryFlags, Relevance};
use crate::record::Record;

/// On-disk grammar of a dictionary file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DictionaryFormat {
    /// EDICT style word dictionaries
    EdictLike,
    /// KANJIDIC style, one character per line
    KanjiLike,
    /// Tanaka corpus style example sentences
    ExamplesLike,
    Unknown,
}

impl DictionaryFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DictionaryFormat::EdictLike => "edict",
            DictionaryFormat::KanjiLike => "kanji",
            DictionaryFormat::ExamplesLike => "examples",
            DictionaryFormat::Unknown => "unknown",
        }
    }

    /// Guess the format from a dictionary's name
    pub fn detect(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        let stem = name.rsplit(['/', '\\']).next().unwrap_or(&name);
        if stem.contains("kanji") {
            DictionaryFormat::KanjiLike
        } else if stem.contains("example") || stem.contains("tanaka") {
            DictionaryFormat::ExamplesLike
        } else if stem.contains("edict")
            || stem.contains("english")
            || stem.contains("names")
            || stem.contains("places")
        {
            DictionaryFormat::EdictLike
        } else {
            DictionaryFormat::Unknown
        }
    }

    pub fn adapter(&self) -> &'static dyn FormatAdapter {
        match self {
            DictionaryFormat::EdictLike => &format::edict::EdictFormat,
            DictionaryFormat::KanjiLike => &format::kanji::KanjiFormat,
            DictionaryFormat::ExamplesLike => &format::examples::ExamplesFormat,
            DictionaryFormat::Unknown => &format::unknown::UnknownFormat,
        }
    }

    /// Classify and compile `text` with this format's templates
    pub fn parse_query(
        &self,
        text: &str,
        flags: QueryFlags,
        deconjugator: Option<&dyn Deconjugator>,
    ) -> Result<Query, QueryError> {
        Query::compile(text, *self, flags, deconjugator)
    }

    pub fn parse_record<'a>(&self, line: &'a str) -> Result<Record<'a>, RecordError> {
        self.adapter().parse_record(line)
    }

    pub fn compare(&self, record: &Record<'_>, query: &Query, relevance: Relevance) -> bool {
        format::compare(self.adapter(), record, query, relevance)
    }

    /// Highest tier the record satisfies, if any
    pub fn relevance(&self, record: &Record<'_>, query: &Query) -> Option<Relevance> {
        format::relevance(self.adapter(), record, query)
    }
}

/// A dictionary file on disk; holds no per-search state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    name: String,
    path: PathBuf,
    format: DictionaryFormat,
}

impl Dictionary {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, format: DictionaryFormat) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            format,
        }
    }

    /// Format detected from the name, falling back to the file name
    pub fn detect(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let path = path.into();
        let mut format = DictionaryFormat::detect(&name);
        if format == DictionaryFormat::Unknown {
            if let Some(file_name) = path.file_name().and_then(|f| f.to_str()) {
                format = DictionaryFormat::detect(file_name);
            }
        }
        Self { name, path, format }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DictionaryFormat {
        self.format
    }

    /// A fresh read handle; every search opens its own
    pub fn open(&self) -> std::io::Result<File> {
        File::open(&self.path)
    }

    /// File length in bytes, for progress reporting
    pub fn length_hint(&self) -> Option<u64> {
        std::fs::metadata(&self.path).ok().map(|m| m.len())
    }

    pub fn parse_query(
        &self,
        text: &str,
        flags: QueryFlags,
        deconjugator: Option<&dyn Deconjugator>,
    ) -> Result<Query, QueryError> {
        self.format.parse_query(text, flags, deconjugator)
    }
}
