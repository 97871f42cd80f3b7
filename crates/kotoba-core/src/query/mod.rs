//! Query compilation: classify user text into typed tokens, widen them with
//! spelling variants and compile one matcher per token and relevance tier.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::dictionary::DictionaryFormat;
use crate::error::QueryError;
use crate::language::Deconjugator;

mod classify;
mod pattern;
mod range;
mod variants;

pub use classify::classify;
pub use pattern::{CompiledPattern, PLACEHOLDER};
pub use range::{Range, RangeKind, parse_range_token};
pub use variants::{MIN_BASE_FORM_CONFIDENCE, expand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenType {
    Kanji,
    Furigana,
    Romaji,
    Mix,
}

impl TokenType {
    pub const ALL: [TokenType; 4] = [
        TokenType::Kanji,
        TokenType::Furigana,
        TokenType::Romaji,
        TokenType::Mix,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Kanji => "kanji",
            TokenType::Furigana => "furigana",
            TokenType::Romaji => "romaji",
            TokenType::Mix => "mix",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match quality, strictest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relevance {
    High,
    Medium,
    Low,
}

impl Relevance {
    /// Strictest first
    pub const ALL: [Relevance; 3] = [Relevance::High, Relevance::Medium, Relevance::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Relevance::High => "high",
            Relevance::Medium => "medium",
            Relevance::Low => "low",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavior toggles for query compilation and searching
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryFlags(u8);

impl QueryFlags {
    pub const HIRAGANA_TO_KATAKANA: Self = Self(1);
    pub const KATAKANA_TO_HIRAGANA: Self = Self(1 << 1);
    pub const ROMAJI_TO_FURIGANA: Self = Self(1 << 2);
    /// Keep only high relevance matches
    pub const EXACT: Self = Self(1 << 3);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: Self, enabled: bool) {
        if enabled {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl Default for QueryFlags {
    fn default() -> Self {
        Self::HIRAGANA_TO_KATAKANA | Self::KATAKANA_TO_HIRAGANA | Self::ROMAJI_TO_FURIGANA
    }
}

impl BitOr for QueryFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for QueryFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for QueryFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::HIRAGANA_TO_KATAKANA, "HIRAGANA_TO_KATAKANA"),
            (Self::KATAKANA_TO_HIRAGANA, "KATAKANA_TO_HIRAGANA"),
            (Self::ROMAJI_TO_FURIGANA, "ROMAJI_TO_FURIGANA"),
            (Self::EXACT, "EXACT"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "QueryFlags({})", set.join(" | "))
    }
}

/// One classified unit of query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenType,
    pub text: String,
    /// User supplied OR alternatives (`a|b`)
    pub alternatives: Vec<String>,
    /// Derived spellings, filled in when the query is built
    pub variants: Vec<String>,
    /// Halves of a four-kanji compound, matched below high relevance
    pub fragments: Vec<String>,
    /// Type the token is compiled under
    pub match_type: TokenType,
}

impl Token {
    pub fn new(kind: TokenType, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            alternatives: Vec::new(),
            variants: Vec::new(),
            fragments: Vec::new(),
            match_type: kind,
        }
    }

    /// Every spelling tested at `relevance`, primary text first, deduplicated
    pub fn spellings(&self, relevance: Relevance) -> Vec<&str> {
        let mut out: Vec<&str> = vec![self.text.as_str()];
        let fragments = match relevance {
            Relevance::High => &[][..],
            Relevance::Medium | Relevance::Low => &self.fragments[..],
        };
        let rest = self
            .alternatives
            .iter()
            .chain(self.variants.iter())
            .chain(fragments.iter());
        for spelling in rest {
            if !spelling.is_empty() && !out.contains(&spelling.as_str()) {
                out.push(spelling);
            }
        }
        out
    }
}

/// A classified (and, once built, compiled) search query
#[derive(Debug, Clone)]
pub struct Query {
    raw_text: String,
    format: DictionaryFormat,
    flags: QueryFlags,
    tokens: BTreeMap<TokenType, Vec<Token>>,
    range_filters: BTreeMap<RangeKind, Range>,
    compiled: HashMap<(TokenType, Relevance), Vec<CompiledPattern>>,
    match_types: Vec<TokenType>,
    is_compiled: bool,
}

impl Query {
    pub(crate) fn from_parts(
        raw_text: String,
        format: DictionaryFormat,
        flags: QueryFlags,
        tokens: BTreeMap<TokenType, Vec<Token>>,
        range_filters: BTreeMap<RangeKind, Range>,
    ) -> Self {
        Self {
            raw_text,
            format,
            flags,
            tokens,
            range_filters,
            compiled: HashMap::new(),
            match_types: Vec::new(),
            is_compiled: false,
        }
    }

    /// Classify `text` for `format` without compiling any pattern
    pub fn parse(text: &str, format: DictionaryFormat, flags: QueryFlags) -> Result<Self, QueryError> {
        classify(text, format, flags)
    }

    /// Classify and compile in one step
    pub fn compile(
        text: &str,
        format: DictionaryFormat,
        flags: QueryFlags,
        deconjugator: Option<&dyn Deconjugator>,
    ) -> Result<Self, QueryError> {
        let mut query = Self::parse(text, format, flags)?;
        query.build(deconjugator)?;
        Ok(query)
    }

    /// Expand variants and compile every (type, relevance) matcher.
    ///
    /// Rebuilding yields the same patterns. On failure the query is left
    /// uncompiled.
    pub fn build(&mut self, deconjugator: Option<&dyn Deconjugator>) -> Result<(), QueryError> {
        self.compiled.clear();
        self.match_types.clear();
        self.is_compiled = false;

        let adapter = self.format.adapter();
        for tokens in self.tokens.values_mut() {
            for token in tokens.iter_mut() {
                expand(token, self.format, self.flags, deconjugator);
            }
        }

        let mut compiled: HashMap<(TokenType, Relevance), Vec<CompiledPattern>> = HashMap::new();
        let mut match_types = Vec::new();

        for kind in TokenType::ALL {
            let tokens: Vec<&Token> = self
                .tokens
                .values()
                .flatten()
                .filter(|token| token.match_type == kind)
                .collect();
            if tokens.is_empty() {
                continue;
            }
            match_types.push(kind);

            for relevance in Relevance::ALL {
                let Some(template) = adapter.template(kind, relevance) else {
                    continue;
                };
                let mut patterns = Vec::with_capacity(tokens.len());
                for token in &tokens {
                    let pattern = CompiledPattern::build(template, &token.spellings(relevance))
                        .map_err(|source| QueryError::PatternCompileFailed {
                            kind,
                            relevance,
                            source,
                        })?;
                    patterns.push(pattern);
                }
                compiled.insert((kind, relevance), patterns);
            }
        }

        tracing::debug!(
            query = %self.raw_text,
            format = self.format.as_str(),
            matchers = compiled.len(),
            "Compiled query"
        );

        self.compiled = compiled;
        self.match_types = match_types;
        self.is_compiled = true;
        Ok(())
    }

    pub fn is_compiled(&self) -> bool {
        self.is_compiled
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn format(&self) -> DictionaryFormat {
        self.format
    }

    pub fn flags(&self) -> QueryFlags {
        self.flags
    }

    /// Tokens classified as `kind`, in input order
    pub fn tokens(&self, kind: TokenType) -> &[Token] {
        self.tokens.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values().flatten()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.values().map(Vec::len).sum()
    }

    pub fn range_filters(&self) -> &BTreeMap<RangeKind, Range> {
        &self.range_filters
    }

    pub fn range(&self, kind: RangeKind) -> Option<&Range> {
        self.range_filters.get(&kind)
    }

    /// Types that have at least one token to match, after reclassification
    pub fn match_types(&self) -> &[TokenType] {
        &self.match_types
    }

    /// One matcher per token; `None` when the format has no template for the cell
    pub fn matchers(&self, kind: TokenType, relevance: Relevance) -> Option<&[CompiledPattern]> {
        self.compiled.get(&(kind, relevance)).map(Vec::as_slice)
    }

    /// Pattern sources of every compiled cell, ordered by type then relevance
    pub fn pattern_sources(&self) -> Vec<(TokenType, Relevance, Vec<String>)> {
        let mut out: Vec<_> = self
            .compiled
            .iter()
            .map(|((kind, relevance), patterns)| {
                let sources = patterns.iter().map(|p| p.as_str().to_string()).collect();
                (*kind, *relevance, sources)
            })
            .collect();
        out.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        out
    }

    /// Whether the query carries anything a record can be tested against
    pub fn has_content(&self) -> bool {
        self.token_count() > 0 || !self.range_filters.is_empty()
    }
}

/// Classify and compile `text` for dictionaries of `format`
pub fn compile_query(
    text: &str,
    format: DictionaryFormat,
    flags: QueryFlags,
) -> Result<Query, QueryError> {
    Query::compile(text, format, flags, None)
}
