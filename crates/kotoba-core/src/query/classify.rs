use std::collections::BTreeMap;

use crate::dictionary::DictionaryFormat;
use crate::error::QueryError;
use crate::preprocess::{DefaultPreprocessor, Preprocessor};
use crate::script::{Script, contains_kanji, is_all_kana, is_all_kanji, is_romaji_word};

use super::range::parse_range_token;
use super::{Query, QueryFlags, Token, TokenType};

const AND: char = '&';
const OR: char = '|';
const ESCAPE: char = '\\';

/// A query character and whether it was escaped with a backslash
#[derive(Debug, Clone, Copy)]
struct Lexeme {
    c: char,
    escaped: bool,
}

impl Lexeme {
    fn is(&self, c: char) -> bool {
        !self.escaped && self.c == c
    }

    fn is_space(&self) -> bool {
        !self.escaped && self.c.is_whitespace()
    }
}

/// Split normalized query text into typed tokens and range filters
pub fn classify(text: &str, format: DictionaryFormat, flags: QueryFlags) -> Result<Query, QueryError> {
    let normalized = DefaultPreprocessor.process(text);
    if normalized.is_empty() {
        return Err(QueryError::malformed("query is empty"));
    }

    let lexemes = lex(&normalized)?;
    let takes_ranges = format.adapter().uses_range_filters();

    let mut tokens: BTreeMap<TokenType, Vec<Token>> = BTreeMap::new();
    let mut range_filters = BTreeMap::new();

    let segments: Vec<&[Lexeme]> = lexemes.split(|l| l.is(AND)).collect();
    let last = segments.len() - 1;

    for (i, segment) in segments.iter().enumerate() {
        let words: Vec<&[Lexeme]> = segment
            .split(Lexeme::is_space)
            .filter(|word| !word.is_empty())
            .collect();

        if words.is_empty() {
            let reason = if i == 0 || i == last {
                "dangling '&' operator"
            } else {
                "empty '&' segment"
            };
            return Err(QueryError::malformed(reason));
        }

        for word in words {
            let alternatives: Vec<&[Lexeme]> = word.split(|l| l.is(OR)).collect();
            if alternatives.iter().any(|alt| alt.is_empty()) {
                return Err(QueryError::malformed("dangling '|' operator"));
            }

            if alternatives.len() > 1 {
                let token = alternatives_token(&alternatives);
                tokens.entry(token.kind).or_default().push(token);
                continue;
            }

            let ranges_allowed = takes_ranges && !word.iter().any(|l| l.escaped);
            for piece in split_script_runs(word) {
                if ranges_allowed {
                    if let Some((kind, range)) = parse_range_token(&piece) {
                        // last one wins
                        range_filters.insert(kind, range);
                        continue;
                    }
                }
                let token = single_token(piece);
                tokens.entry(token.kind).or_default().push(token);
            }
        }
    }

    tracing::trace!(query = %normalized, ?tokens, ?range_filters, "Classified query");

    Ok(Query::from_parts(normalized, format, flags, tokens, range_filters))
}

fn lex(text: &str) -> Result<Vec<Lexeme>, QueryError> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            let Some(next) = chars.next() else {
                return Err(QueryError::malformed("query ends with an unescaped backslash"));
            };
            out.push(Lexeme { c: next, escaped: true });
        } else {
            out.push(Lexeme { c, escaped: false });
        }
    }
    Ok(out)
}

fn collect(lexemes: &[Lexeme]) -> String {
    lexemes.iter().map(|l| l.c).collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Latin,
    Japanese,
}

fn side_of(lexeme: &Lexeme) -> Option<Side> {
    if lexeme.escaped {
        return None;
    }
    match Script::of(lexeme.c) {
        Script::Latin => Some(Side::Latin),
        script if script.is_japanese() => Some(Side::Japanese),
        _ => None,
    }
}

/// Break a word where it switches between Latin and Japanese script
fn split_script_runs(word: &[Lexeme]) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_side = None;

    for lexeme in word {
        let side = side_of(lexeme);
        if let (Some(side), Some(prev)) = (side, current_side) {
            if side != prev && !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
        }
        if side.is_some() {
            current_side = side;
        }
        current.push(lexeme.c);
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Script majority: any kanji, then all kana, then plain ASCII words
pub(crate) fn token_type_of(text: &str) -> TokenType {
    if contains_kanji(text) {
        TokenType::Kanji
    } else if is_all_kana(text) {
        TokenType::Furigana
    } else if is_romaji_word(text) {
        TokenType::Romaji
    } else {
        TokenType::Mix
    }
}

fn single_token(text: String) -> Token {
    let kind = token_type_of(&text);
    let mut token = Token::new(kind, text);

    // Yojijukugo: keep the halves around so partial idiom matches still count
    if token.text.chars().count() == 4 && is_all_kanji(&token.text) {
        let split = token
            .text
            .char_indices()
            .nth(2)
            .map(|(i, _)| i)
            .unwrap_or(token.text.len());
        token.fragments = vec![token.text[..split].to_string(), token.text[split..].to_string()];
    }

    token
}

fn alternatives_token(alternatives: &[&[Lexeme]]) -> Token {
    let texts: Vec<String> = alternatives.iter().map(|alt| collect(alt)).collect();
    let first_kind = token_type_of(&texts[0]);
    let kind = if texts.iter().all(|t| token_type_of(t) == first_kind) {
        first_kind
    } else {
        TokenType::Mix
    };

    let mut iter = texts.into_iter();
    let mut token = Token::new(kind, iter.next().unwrap_or_default());
    token.alternatives = iter.collect();
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Range, RangeKind};

    fn edict(text: &str) -> Result<Query, QueryError> {
        classify(text, DictionaryFormat::EdictLike, QueryFlags::default())
    }

    fn texts(query: &Query, kind: TokenType) -> Vec<&str> {
        query.tokens(kind).iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn single_romaji_token() {
        let query = edict("English").unwrap();
        assert_eq!(texts(&query, TokenType::Romaji), vec!["English"]);
        assert_eq!(query.token_count(), 1);
        assert!(!query.is_compiled());
    }

    #[test]
    fn splits_on_and_and_whitespace() {
        let query = edict("cats&dogs").unwrap();
        assert_eq!(texts(&query, TokenType::Romaji), vec!["cats", "dogs"]);

        let query = edict("big  red dog").unwrap();
        assert_eq!(texts(&query, TokenType::Romaji), vec!["big", "red", "dog"]);
    }

    #[test]
    fn splits_script_transitions() {
        let query = edict("日本go").unwrap();
        assert_eq!(texts(&query, TokenType::Kanji), vec!["日本"]);
        assert_eq!(texts(&query, TokenType::Romaji), vec!["go"]);

        // kanji followed by kana stays one word
        let query = edict("食べる").unwrap();
        assert_eq!(texts(&query, TokenType::Kanji), vec!["食べる"]);
    }

    #[test]
    fn classifies_by_script() {
        let query = edict("ねこ カタカナ e-mail 3D 猫").unwrap();
        assert_eq!(texts(&query, TokenType::Furigana), vec!["ねこ", "カタカナ"]);
        assert_eq!(texts(&query, TokenType::Romaji), vec!["e-mail"]);
        assert_eq!(texts(&query, TokenType::Mix), vec!["3D"]);
        assert_eq!(texts(&query, TokenType::Kanji), vec!["猫"]);
    }

    #[test]
    fn or_alternatives_stay_one_token() {
        let query = edict("cat|dog").unwrap();
        let token = &query.tokens(TokenType::Romaji)[0];
        assert_eq!(token.text, "cat");
        assert_eq!(token.alternatives, vec!["dog".to_string()]);

        let query = edict("猫|cat").unwrap();
        assert_eq!(texts(&query, TokenType::Mix), vec!["猫"]);
    }

    #[test]
    fn yojijukugo_fragments() {
        let query = edict("一期一会").unwrap();
        let token = &query.tokens(TokenType::Kanji)[0];
        assert_eq!(token.fragments, vec!["一期".to_string(), "一会".to_string()]);
        assert_eq!(query.token_count(), 1);
    }

    #[test]
    fn escapes_are_literal() {
        let query = edict(r"AT\&T").unwrap();
        assert_eq!(texts(&query, TokenType::Mix), vec!["AT&T"]);
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["", "   ", "&cat", "cat&", "cat&&dog", "cat|", "|cat", "cat\\", "&"] {
            assert!(
                matches!(edict(text), Err(QueryError::Malformed(_))),
                "{text:?} should be rejected"
            );
        }
        assert!(edict("cat\\\\").is_ok());
    }

    #[test]
    fn kanji_format_extracts_ranges() {
        let query = classify("S5", DictionaryFormat::KanjiLike, QueryFlags::default()).unwrap();
        assert_eq!(query.token_count(), 0);
        assert_eq!(query.range(RangeKind::Strokes), Some(&Range::new(5, 5)));
        assert!(query.has_content());

        let query = classify("木 G1 G2-3 J2", DictionaryFormat::KanjiLike, QueryFlags::default()).unwrap();
        assert_eq!(texts(&query, TokenType::Kanji), vec!["木"]);
        assert_eq!(query.range(RangeKind::Grade), Some(&Range::new(2, 3)));
        assert_eq!(query.range(RangeKind::Jlpt), Some(&Range::new(2, 2)));
    }

    #[test]
    fn ranges_glued_to_kanji_are_extracted() {
        let query = classify("木S4", DictionaryFormat::KanjiLike, QueryFlags::default()).unwrap();
        assert_eq!(texts(&query, TokenType::Kanji), vec!["木"]);
        assert!(query.tokens(TokenType::Mix).is_empty());
        assert_eq!(query.range(RangeKind::Strokes), Some(&Range::new(4, 4)));

        let query = classify("G1日", DictionaryFormat::KanjiLike, QueryFlags::default()).unwrap();
        assert_eq!(texts(&query, TokenType::Kanji), vec!["日"]);
        assert_eq!(query.range(RangeKind::Grade), Some(&Range::new(1, 1)));

        let query = classify(r"木\S4", DictionaryFormat::KanjiLike, QueryFlags::default()).unwrap();
        assert!(query.range_filters().is_empty());
    }

    #[test]
    fn other_formats_keep_range_like_words() {
        let query = edict("S5").unwrap();
        assert!(query.range_filters().is_empty());
        assert_eq!(texts(&query, TokenType::Mix), vec!["S5"]);
    }

    #[test]
    fn ascii_tokens_reconstruct_input() {
        for text in ["hello world", "a b c", "x1 y2-z", "tea time 42", "don't stop"] {
            let query = edict(text).unwrap();
            let mut joined: Vec<&str> = query.all_tokens().map(|t| t.text.as_str()).collect();
            let mut expected: Vec<&str> = text.split_whitespace().collect();
            joined.sort_unstable();
            expected.sort_unstable();
            assert_eq!(joined, expected, "{text}");
        }
    }
}
