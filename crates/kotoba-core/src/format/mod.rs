//! Per-format record grammar, pattern templates and record/query comparison.

use std::borrow::Cow;

use crate::dictionary::DictionaryFormat;
use crate::error::RecordError;
use crate::query::{Query, RangeKind, Relevance, Token, TokenType};
use crate::record::Record;

/// Japanese particles and punctuation accepted around a medium relevance match.
/// Holds every affix the high relevance templates allow.
macro_rules! ja_boundary {
    () => {
        r"(?:お|ご|する|な|の|に|と|を|が|は|で|へ|も|や|か|から|まで|より|[\s、。・,.;:!?！？「」『』()（）\[\]\{\}~〜])"
    };
}

/// Japanese text bounded by particles, punctuation or the field edges
pub(crate) const JA_BOUNDED: &str = concat!("(?:^|", ja_boundary!(), "){}(?:", ja_boundary!(), "|$)");

pub mod edict;
pub mod examples;
pub mod kanji;
pub mod unknown;

/// Romaji and mixed tokens: whole field, case-insensitive
pub(crate) const WHOLE_FIELD: &str = "(?i)^{}$";
/// Romaji and mixed tokens: not inside another word
pub(crate) const WORD_BOUNDED: &str = r"(?i)(?:^|[^\p{L}\p{N}]){}(?:[^\p{L}\p{N}]|$)";
/// Romaji tokens: at the start of a word
pub(crate) const WORD_PREFIX: &str = r"(?i)(?:^|[^\p{L}\p{N}]){}";
pub(crate) const SUBSTRING: &str = "(?i){}";

/// How one dictionary format parses lines and exposes fields to matching
pub trait FormatAdapter: Send + Sync {
    fn format(&self) -> DictionaryFormat;

    /// Pattern template for a cell; `None` means the type can't match at that tier
    fn template(&self, kind: TokenType, relevance: Relevance) -> Option<&'static str>;

    fn parse_record<'a>(&self, line: &'a str) -> Result<Record<'a>, RecordError>;

    /// Fields a token of `kind` is tested against
    fn candidates<'r>(&self, record: &'r Record<'_>, kind: TokenType) -> Vec<Cow<'r, str>>;

    /// Numeric attribute for range filters
    fn numeric_field(&self, _record: &Record<'_>, _kind: RangeKind) -> Option<u32> {
        None
    }

    /// Whether queries pull `S5`-style range words out of the token stream
    fn uses_range_filters(&self) -> bool {
        false
    }

    /// Extra spellings specific to this format
    fn extra_variants(&self, _token: &Token) -> Vec<String> {
        Vec::new()
    }
}

/// Candidate fields extracted once per record, per token type in play
struct Candidates<'r> {
    fields: [Vec<Cow<'r, str>>; 4],
}

impl<'r> Candidates<'r> {
    fn extract(adapter: &dyn FormatAdapter, record: &'r Record<'_>, query: &Query) -> Self {
        let mut fields: [Vec<Cow<'r, str>>; 4] = Default::default();
        for &kind in query.match_types() {
            fields[kind.index()] = adapter.candidates(record, kind);
        }
        Self { fields }
    }

    fn get(&self, kind: TokenType) -> &[Cow<'r, str>] {
        &self.fields[kind.index()]
    }
}

fn satisfies(
    adapter: &dyn FormatAdapter,
    candidates: &Candidates<'_>,
    record: &Record<'_>,
    query: &Query,
    relevance: Relevance,
) -> bool {
    let mut tested = false;

    for &kind in query.match_types() {
        tested = true;
        let Some(patterns) = query.matchers(kind, relevance) else {
            return false;
        };
        let fields = candidates.get(kind);
        // every token of the type must hit at least one field
        let all_tokens_hit = patterns
            .iter()
            .all(|pattern| fields.iter().any(|field| pattern.is_match(field)));
        if !all_tokens_hit {
            return false;
        }
    }

    for (kind, range) in query.range_filters() {
        tested = true;
        match adapter.numeric_field(record, *kind) {
            Some(value) if range.contains(value) => {}
            _ => return false,
        }
    }

    tested
}

/// Does `record` satisfy `query` at `relevance`?
///
/// False when the query has nothing to test, so an empty query never
/// matches the whole dictionary.
pub fn compare(
    adapter: &dyn FormatAdapter,
    record: &Record<'_>,
    query: &Query,
    relevance: Relevance,
) -> bool {
    if !query.is_compiled() {
        return false;
    }
    let candidates = Candidates::extract(adapter, record, query);
    satisfies(adapter, &candidates, record, query, relevance)
}

/// Highest satisfied tier: the cheap low relevance test first, then top-down
pub fn relevance(adapter: &dyn FormatAdapter, record: &Record<'_>, query: &Query) -> Option<Relevance> {
    if !query.is_compiled() {
        return None;
    }
    let candidates = Candidates::extract(adapter, record, query);
    if !satisfies(adapter, &candidates, record, query, Relevance::Low) {
        return None;
    }
    [Relevance::High, Relevance::Medium]
        .into_iter()
        .find(|tier| satisfies(adapter, &candidates, record, query, *tier))
        .or(Some(Relevance::Low))
}

/// Every record a tier accepts is accepted by the weaker tiers too
#[cfg(test)]
pub(crate) fn assert_tiers_nested(format: DictionaryFormat, queries: &[&str], lines: &[&str]) {
    use crate::query::{QueryFlags, compile_query};

    for text in queries {
        let query = compile_query(text, format, QueryFlags::default()).unwrap();
        for line in lines {
            let record = format.parse_record(line).unwrap();
            if format.compare(&record, &query, Relevance::High) {
                assert!(format.compare(&record, &query, Relevance::Medium), "{text} {line}");
            }
            if format.compare(&record, &query, Relevance::Medium) {
                assert!(format.compare(&record, &query, Relevance::Low), "{text} {line}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryFlags, compile_query};

    fn edict_relevance(query: &str, line: &str) -> Option<Relevance> {
        let format = DictionaryFormat::EdictLike;
        let query = compile_query(query, format, QueryFlags::default()).unwrap();
        let record = format.parse_record(line).unwrap();
        format.relevance(&record, &query)
    }

    #[test]
    fn uncompiled_queries_never_match() {
        let format = DictionaryFormat::EdictLike;
        let query = Query::parse("cat", format, QueryFlags::default()).unwrap();
        let record = format.parse_record("猫 [ねこ] /(n) cat/(P)/").unwrap();
        assert!(!format.compare(&record, &query, Relevance::Low));
    }

    #[test]
    fn tiers_follow_match_quality() {
        let line = "猫 [ねこ] /(n) (1) cat/(2) shamisen/(3) geisha/(P)/";
        assert_eq!(edict_relevance("cat", line), Some(Relevance::High));
        assert_eq!(edict_relevance("ねこ", line), Some(Relevance::High));
        assert_eq!(edict_relevance("猫", line), Some(Relevance::High));
        assert_eq!(edict_relevance("gei", line), Some(Relevance::Low));
        assert_eq!(edict_relevance("dog", line), None);

        let line = "子猫 [こねこ] /(n) kitten/";
        assert_eq!(edict_relevance("猫", line), Some(Relevance::Low));
        assert_eq!(edict_relevance("ねこ", line), Some(Relevance::Low));

        let line = "猫の手 [ねこのて] /(exp) extra help/";
        assert_eq!(edict_relevance("猫", line), Some(Relevance::Medium));
    }

    #[test]
    fn and_across_tokens() {
        let both = "犬猫 [いぬねこ] /cats and dogs/";
        let one = "猫 [ねこ] /cats/";
        assert_eq!(edict_relevance("cats&dogs", both), Some(Relevance::Medium));
        assert_eq!(edict_relevance("cats&dogs", one), None);
    }
}
