//! EDICT style word dictionaries: `HEADWORD [READING] /gloss/gloss/(P)/`

use std::borrow::Cow;

use crate::dictionary::DictionaryFormat;
use crate::error::RecordError;
use crate::query::{Relevance, TokenType};
use crate::record::{Definition, EdictEntry, Record};

use super::{FormatAdapter, JA_BOUNDED, SUBSTRING, WORD_BOUNDED};

const JA_HIGH: &str = "^(?:お|ご)?{}(?:する|な|の|に|と)?$";
const GLOSS_HIGH: &str = r"(?i)^(?:to |a |an |the )?{}(?: \(.*\))?$";

#[derive(Debug, Clone, Copy, Default)]
pub struct EdictFormat;

impl FormatAdapter for EdictFormat {
    fn format(&self) -> DictionaryFormat {
        DictionaryFormat::EdictLike
    }

    fn template(&self, kind: TokenType, relevance: Relevance) -> Option<&'static str> {
        use Relevance::*;
        use TokenType::*;

        let template = match (kind, relevance) {
            (Kanji | Furigana, High) => JA_HIGH,
            (Kanji | Furigana, Medium) => JA_BOUNDED,
            (Kanji | Furigana, Low) => "{}",
            (Romaji | Mix, High) => GLOSS_HIGH,
            (Romaji | Mix, Medium) => WORD_BOUNDED,
            (Romaji | Mix, Low) => SUBSTRING,
        };
        Some(template)
    }

    fn parse_record<'a>(&self, line: &'a str) -> Result<Record<'a>, RecordError> {
        parse(line).map(Record::Edict)
    }

    fn candidates<'r>(&self, record: &'r Record<'_>, kind: TokenType) -> Vec<Cow<'r, str>> {
        let Record::Edict(entry) = record else {
            return vec![Cow::Borrowed(record.raw_line())];
        };

        let mut out: Vec<Cow<'r, str>> = Vec::new();
        match kind {
            TokenType::Kanji => out.extend(entry.headwords().map(Cow::Borrowed)),
            TokenType::Furigana => {
                out.extend(entry.readings().map(Cow::Borrowed));
                out.extend(entry.headwords().map(Cow::Borrowed));
            }
            TokenType::Romaji => {
                out.extend(entry.glosses().map(Cow::Borrowed));
                out.extend(entry.headwords().map(Cow::Borrowed));
                out.extend(entry.readings().map(Cow::Borrowed));
            }
            TokenType::Mix => {
                out.extend(entry.glosses().map(Cow::Borrowed));
                out.extend(entry.headwords().map(Cow::Borrowed));
                out.extend(entry.readings().map(Cow::Borrowed));
                out.push(Cow::Borrowed(entry.raw.as_ref()));
            }
        }
        out
    }
}

fn parse(line: &str) -> Result<EdictEntry<'_>, RecordError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let split = line
        .find(" /")
        .ok_or(RecordError::Malformed("missing gloss section"))?;
    let head = line[..split].trim();
    let body = line[split + 2..]
        .strip_suffix('/')
        .ok_or(RecordError::Malformed("gloss section is not terminated"))?;

    let (headword, reading) = match head.find(" [") {
        Some(open) => {
            let rest = &head[open + 2..];
            let close = rest
                .find(']')
                .ok_or(RecordError::Malformed("unterminated reading"))?;
            (head[..open].trim(), Some(rest[..close].trim()))
        }
        None => (head, None),
    };
    if headword.is_empty() {
        return Err(RecordError::Malformed("empty headword"));
    }

    let mut entry = EdictEntry {
        raw: Cow::Borrowed(line),
        headword: Cow::Borrowed(headword),
        reading: reading.filter(|r| !r.is_empty()).map(Cow::Borrowed),
        classification: None,
        definitions: Vec::new(),
        important: false,
        entry_id: None,
    };

    for item in body.split('/').map(str::trim).filter(|i| !i.is_empty()) {
        if item == "(P)" {
            entry.important = true;
            continue;
        }
        if item.starts_with("EntL") {
            entry.entry_id = Some(Cow::Borrowed(item));
            continue;
        }

        let gloss = peel_tags(item);
        if entry.classification.is_none() && !gloss.tags.is_empty() {
            entry.classification = Some(match gloss.tags.as_slice() {
                [single] => Cow::Borrowed(*single),
                many => Cow::Owned(many.join(" ")),
            });
        }
        entry.definitions.push(Definition {
            marker: gloss.marker.map(Cow::Borrowed),
            text: Cow::Borrowed(gloss.text),
        });
    }

    if entry.definitions.is_empty() {
        return Err(RecordError::Malformed("entry has no definitions"));
    }
    Ok(entry)
}

struct Gloss<'a> {
    marker: Option<&'a str>,
    tags: Vec<&'a str>,
    text: &'a str,
}

/// Split leading `(n)`, `(1)` and `{comp}` tags off a gloss
fn peel_tags(item: &str) -> Gloss<'_> {
    let mut marker = None;
    let mut tags = Vec::new();
    let mut rest = item;

    loop {
        let close = match rest.chars().next() {
            Some('(') => ')',
            Some('{') => '}',
            _ => break,
        };
        let Some(end) = rest.find(close) else {
            break;
        };
        let tag = &rest[..=end];
        let inner = &tag[1..tag.len() - 1];
        if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
            marker = Some(tag);
        } else {
            tags.push(tag);
        }
        rest = rest[end + 1..].trim_start();
    }

    if rest.is_empty() {
        // nothing but parentheses, keep it as text
        return Gloss {
            marker: None,
            tags: Vec::new(),
            text: item,
        };
    }
    Gloss { marker, tags, text: rest }
}
