//! KANJIDIC style character dictionaries.
//!
//! `C [RADICALS] CODES… READINGS… [T1 …] [T2 …] {meaning}…`; the radical
//! section is optional and space separated.

use std::borrow::Cow;

use crate::dictionary::DictionaryFormat;
use crate::error::RecordError;
use crate::query::{RangeKind, Relevance, Token, TokenType};
use crate::record::{KanjiEntry, Record};
use crate::script::{is_kana, is_kanji};

use super::{FormatAdapter, SUBSTRING, WHOLE_FIELD, WORD_BOUNDED};

#[derive(Debug, Clone, Copy, Default)]
pub struct KanjiFormat;

impl FormatAdapter for KanjiFormat {
    fn format(&self) -> DictionaryFormat {
        DictionaryFormat::KanjiLike
    }

    fn template(&self, kind: TokenType, relevance: Relevance) -> Option<&'static str> {
        use Relevance::*;
        use TokenType::*;

        let template = match (kind, relevance) {
            (Kanji, High) => "^{}$",
            (Kanji, Medium) => r"(?:^|\s){}(?:\s|$)",
            (Kanji, Low) => "{}",
            // readings carry `-` for prefixes and suffixes
            (Furigana, High) => "^-?{}-?$",
            (Furigana, Medium) => "^-?{}",
            (Furigana, Low) => "{}",
            (Romaji | Mix, High) => WHOLE_FIELD,
            (Romaji | Mix, Medium) => WORD_BOUNDED,
            (Romaji | Mix, Low) => SUBSTRING,
        };
        Some(template)
    }

    fn parse_record<'a>(&self, line: &'a str) -> Result<Record<'a>, RecordError> {
        parse(line).map(Record::Kanji)
    }

    fn candidates<'r>(&self, record: &'r Record<'_>, kind: TokenType) -> Vec<Cow<'r, str>> {
        let Record::Kanji(entry) = record else {
            return vec![Cow::Borrowed(record.raw_line())];
        };

        let mut out: Vec<Cow<'r, str>> = Vec::new();
        if matches!(kind, TokenType::Kanji | TokenType::Mix) {
            out.push(Cow::Borrowed(entry.character.as_ref()));
            if let Some(radicals) = &entry.radicals {
                out.extend(radicals.split_whitespace().map(Cow::Borrowed));
            }
        }
        if matches!(kind, TokenType::Furigana | TokenType::Mix) {
            out.extend(entry.plain_readings());
        }
        if matches!(kind, TokenType::Romaji | TokenType::Mix) {
            out.extend(entry.meanings.iter().map(|m| Cow::Borrowed(m.as_ref())));
        }
        if kind == TokenType::Mix {
            out.push(Cow::Borrowed(entry.raw.as_ref()));
        }
        out
    }

    fn numeric_field(&self, record: &Record<'_>, kind: RangeKind) -> Option<u32> {
        let Record::Kanji(entry) = record else {
            return None;
        };
        match kind {
            RangeKind::Strokes => entry.strokes,
            RangeKind::Frequency => entry.frequency,
            RangeKind::Grade => entry.grade,
            RangeKind::Jlpt => entry.jlpt,
        }
    }

    fn uses_range_filters(&self) -> bool {
        true
    }

    /// A compound looks up each of its characters
    fn extra_variants(&self, token: &Token) -> Vec<String> {
        if token.kind != TokenType::Kanji || token.text.chars().count() < 2 {
            return Vec::new();
        }
        token
            .text
            .chars()
            .filter(|c| is_kanji(*c))
            .map(String::from)
            .collect()
    }
}

fn parse(line: &str) -> Result<KanjiEntry<'_>, RecordError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let first = line
        .chars()
        .next()
        .ok_or(RecordError::Malformed("empty line"))?;
    if first.is_ascii() {
        return Err(RecordError::Malformed("line does not start with a character"));
    }
    let (character, rest) = line.split_at(first.len_utf8());
    if !rest.starts_with(' ') {
        return Err(RecordError::Malformed("character is not followed by a space"));
    }
    let mut rest = rest.trim_start();

    let mut radicals = None;
    if let Some(section) = rest.strip_prefix('[') {
        let close = section
            .find(']')
            .ok_or(RecordError::Malformed("unbalanced brackets"))?;
        radicals = Some(section[..close].trim()).filter(|r| !r.is_empty());
        rest = section[close + 1..].trim_start();
    }

    let brace = rest.find('{').unwrap_or(rest.len());
    let (codes, meanings) = rest.split_at(brace);
    if codes.contains(['[', ']', '}']) {
        return Err(RecordError::Malformed("unbalanced brackets"));
    }

    let mut entry = KanjiEntry {
        raw: Cow::Borrowed(line),
        character: Cow::Borrowed(character),
        radicals: radicals.map(Cow::Borrowed),
        strokes: None,
        frequency: None,
        grade: None,
        jlpt: None,
        readings: Default::default(),
        meanings: Vec::new(),
    };

    let mut group = 0;
    for word in codes.split_whitespace() {
        match word {
            "T1" => group = 1,
            "T2" => group = 2,
            _ if is_reading(word) => entry.readings[group].push(Cow::Borrowed(word)),
            _ => read_code(&mut entry, word),
        }
    }

    let mut rest = meanings;
    while let Some(open) = rest.find('{') {
        let body = &rest[open + 1..];
        let close = body
            .find('}')
            .ok_or(RecordError::Malformed("unbalanced braces"))?;
        let meaning = &body[..close];
        if meaning.contains('{') {
            return Err(RecordError::Malformed("unbalanced braces"));
        }
        let meaning = meaning.trim();
        if !meaning.is_empty() {
            entry.meanings.push(Cow::Borrowed(meaning));
        }
        rest = &body[close + 1..];
    }
    if rest.contains('}') {
        return Err(RecordError::Malformed("unbalanced braces"));
    }

    Ok(entry)
}

/// Kana-led words, including `-` prefixed suffix readings
fn is_reading(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some('-') => chars.next().is_some_and(is_kana),
        Some(c) => is_kana(c),
        None => false,
    }
}

fn read_code(entry: &mut KanjiEntry<'_>, word: &str) {
    let mut chars = word.chars();
    let Some(code) = chars.next() else {
        return;
    };
    let Ok(value) = chars.as_str().parse::<u32>() else {
        return;
    };
    let slot = match code {
        'S' => &mut entry.strokes,
        'F' => &mut entry.frequency,
        'G' => &mut entry.grade,
        'J' => &mut entry.jlpt,
        _ => return,
    };
    // first value wins, later S codes are common miscounts
    slot.get_or_insert(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryFlags, compile_query};

    const ASIA: &str = "亜 3021 U4e9c B1 C7 G8 S7 S8 XJ0505B F1509 J1 N43 ア つ.ぐ T1 や つぎ {Asia} {rank next} {come after} {-ous}";
    const TREE: &str = "木 [木] 4C5A U6728 B75 G1 S4 F317 J5 ボク モク き こ- T2 きへん {tree} {wood}";
    const SUN: &str = "日 467C U65e5 B72 G1 S4 F1 J5 ニチ ジツ ひ -び -か {day} {sun} {Japan} {counter for days}";
    const SAY: &str = "言 3840 U8a00 B149 G2 S7 F83 J4 ゲン ゴン い.う こと {say}";

    fn entry(line: &str) -> KanjiEntry<'_> {
        match KanjiFormat.parse_record(line).unwrap() {
            Record::Kanji(entry) => entry,
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn parses_codes_and_readings() {
        let asia = entry(ASIA);
        assert_eq!(asia.character, "亜");
        assert_eq!(asia.strokes, Some(7));
        assert_eq!(asia.grade, Some(8));
        assert_eq!(asia.frequency, Some(1509));
        assert_eq!(asia.jlpt, Some(1));
        assert_eq!(asia.readings[0], vec!["ア", "つ.ぐ"]);
        assert_eq!(asia.readings[1], vec!["や", "つぎ"]);
        assert!(asia.readings[2].is_empty());
        assert_eq!(asia.meanings, vec!["Asia", "rank next", "come after", "-ous"]);

        let tree = entry(TREE);
        assert_eq!(tree.radicals.as_deref(), Some("木"));
        assert_eq!(tree.readings[0], vec!["ボク", "モク", "き", "こ-"]);
        assert_eq!(tree.readings[2], vec!["きへん"]);
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["", "A 1234 {x}", "亜{Asia}", "亜 [一 S7 {Asia}", "亜 S7 {Asia", "亜 S7 Asia}", "亜 S7 {{Asia}}"] {
            assert!(KanjiFormat.parse_record(line).is_err(), "{line:?} should be rejected");
        }
    }

    #[test]
    fn stroke_range_selects_records() {
        let format = DictionaryFormat::KanjiLike;
        let query = compile_query("S4", format, QueryFlags::default()).unwrap();
        assert_eq!(query.token_count(), 0);

        let matches: Vec<&str> = [ASIA, TREE, SUN, SAY]
            .into_iter()
            .filter(|line| {
                let record = format.parse_record(line).unwrap();
                format.compare(&record, &query, Relevance::High)
            })
            .collect();
        assert_eq!(matches, vec![TREE, SUN]);
    }

    #[test]
    fn ranges_combine_with_tokens() {
        let format = DictionaryFormat::KanjiLike;
        let query = compile_query("day G1 S3-5", format, QueryFlags::default()).unwrap();
        let sun = format.parse_record(SUN).unwrap();
        let tree = format.parse_record(TREE).unwrap();
        assert_eq!(format.relevance(&sun, &query), Some(Relevance::High));
        assert_eq!(format.relevance(&tree, &query), None);
    }

    #[test]
    fn missing_field_fails_range() {
        let format = DictionaryFormat::KanjiLike;
        let query = compile_query("J1-5", format, QueryFlags::default()).unwrap();
        let record = format.parse_record("乂 S2 ガイ {mow}").unwrap();
        assert!(!format.compare(&record, &query, Relevance::Low));
    }

    #[test]
    fn readings_match_without_okurigana_dots() {
        let format = DictionaryFormat::KanjiLike;
        let query = compile_query("いう", format, QueryFlags::default()).unwrap();
        let record = format.parse_record(SAY).unwrap();
        assert_eq!(format.relevance(&record, &query), Some(Relevance::High));

        let query = compile_query("び", format, QueryFlags::default()).unwrap();
        let record = format.parse_record(SUN).unwrap();
        assert_eq!(format.relevance(&record, &query), Some(Relevance::High));
    }

    #[test]
    fn compounds_look_up_each_character() {
        let format = DictionaryFormat::KanjiLike;
        let query = compile_query("日本", format, QueryFlags::default()).unwrap();
        let token = &query.tokens(TokenType::Kanji)[0];
        assert_eq!(token.variants, vec!["日".to_string(), "本".to_string()]);

        let record = format.parse_record(SUN).unwrap();
        assert_eq!(format.relevance(&record, &query), Some(Relevance::High));
    }

    #[test]
    fn tiers_are_nested() {
        crate::format::assert_tiers_nested(
            DictionaryFormat::KanjiLike,
            &["木", "き", "ボク", "tree", "day", "S4", "日本", "木S4", "come"],
            &[ASIA, TREE, SUN, SAY],
        );
    }
}
