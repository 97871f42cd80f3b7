//! Tanaka corpus style example sentences:
//! `A: japanese<TAB>english#ID=…:B: word{reading} word[sense]…`

use std::borrow::Cow;

use crate::dictionary::DictionaryFormat;
use crate::error::RecordError;
use crate::query::{Relevance, TokenType};
use crate::record::{ExampleEntry, Record};

use super::{FormatAdapter, JA_BOUNDED, SUBSTRING, WORD_BOUNDED, WORD_PREFIX};

/// A whole breakdown word, optionally followed by its annotations
const WORD_HIGH: &str = r"(?:^|\s){}(?:[\[{(~\s]|$)";

#[derive(Debug, Clone, Copy, Default)]
pub struct ExamplesFormat;

impl FormatAdapter for ExamplesFormat {
    fn format(&self) -> DictionaryFormat {
        DictionaryFormat::ExamplesLike
    }

    fn template(&self, kind: TokenType, relevance: Relevance) -> Option<&'static str> {
        use Relevance::*;
        use TokenType::*;

        let template = match (kind, relevance) {
            (Kanji | Furigana, High) => WORD_HIGH,
            (Kanji | Furigana, Medium) => JA_BOUNDED,
            (Kanji | Furigana, Low) => "{}",
            (Romaji | Mix, High) => WORD_BOUNDED,
            (Romaji | Mix, Medium) => WORD_PREFIX,
            (Romaji | Mix, Low) => SUBSTRING,
        };
        Some(template)
    }

    fn parse_record<'a>(&self, line: &'a str) -> Result<Record<'a>, RecordError> {
        parse(line).map(Record::Example)
    }

    fn candidates<'r>(&self, record: &'r Record<'_>, kind: TokenType) -> Vec<Cow<'r, str>> {
        let Record::Example(entry) = record else {
            return vec![Cow::Borrowed(record.raw_line())];
        };

        let japanese = || {
            std::iter::once(Cow::Borrowed(entry.japanese.as_ref()))
                .chain(entry.breakdown.as_deref().map(Cow::Borrowed))
        };
        match kind {
            TokenType::Kanji | TokenType::Furigana => japanese().collect(),
            TokenType::Romaji => vec![Cow::Borrowed(entry.english.as_ref())],
            TokenType::Mix => japanese()
                .chain([Cow::Borrowed(entry.english.as_ref()), Cow::Borrowed(entry.raw.as_ref())])
                .collect(),
        }
    }
}

fn parse(line: &str) -> Result<ExampleEntry<'_>, RecordError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let body = line
        .strip_prefix("A:")
        .ok_or(RecordError::Malformed("missing A: prefix"))?
        .trim_start();

    let (body, breakdown) = match body.find(":B:") {
        Some(at) => (&body[..at], Some(body[at + 3..].trim()).filter(|b| !b.is_empty())),
        None => (body, None),
    };
    let (japanese, english) = body
        .split_once('\t')
        .ok_or(RecordError::Malformed("missing tab between sentences"))?;
    let (english, id) = match english.find("#ID=") {
        Some(at) => (&english[..at], Some(english[at + 4..].trim())),
        None => (english, None),
    };

    let japanese = japanese.trim();
    if japanese.is_empty() {
        return Err(RecordError::Malformed("empty japanese sentence"));
    }

    Ok(ExampleEntry {
        raw: Cow::Borrowed(line),
        japanese: Cow::Borrowed(japanese),
        english: Cow::Borrowed(english.trim()),
        breakdown: breakdown.map(Cow::Borrowed),
        id: id.filter(|id| !id.is_empty()).map(Cow::Borrowed),
    })
}
