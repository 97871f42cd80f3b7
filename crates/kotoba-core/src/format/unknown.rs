//! Dictionaries without a known grammar: every line is matched as plain text.

use std::borrow::Cow;

use crate::dictionary::DictionaryFormat;
use crate::error::RecordError;
use crate::query::{Relevance, TokenType};
use crate::record::{Record, UnknownEntry};

use super::{FormatAdapter, JA_BOUNDED, SUBSTRING, WORD_BOUNDED};

#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownFormat;

impl FormatAdapter for UnknownFormat {
    fn format(&self) -> DictionaryFormat {
        DictionaryFormat::Unknown
    }

    /// No field structure, so nothing ranks as a high relevance match
    fn template(&self, kind: TokenType, relevance: Relevance) -> Option<&'static str> {
        match (kind, relevance) {
            (_, Relevance::High) => None,
            (TokenType::Kanji | TokenType::Furigana, Relevance::Medium) => Some(JA_BOUNDED),
            (TokenType::Romaji | TokenType::Mix, Relevance::Medium) => Some(WORD_BOUNDED),
            (_, Relevance::Low) => Some(SUBSTRING),
        }
    }

    fn parse_record<'a>(&self, line: &'a str) -> Result<Record<'a>, RecordError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(RecordError::Malformed("empty line"));
        }
        Ok(Record::Unknown(UnknownEntry {
            raw: Cow::Borrowed(line),
        }))
    }

    fn candidates<'r>(&self, record: &'r Record<'_>, _kind: TokenType) -> Vec<Cow<'r, str>> {
        vec![Cow::Borrowed(record.raw_line())]
    }
}
