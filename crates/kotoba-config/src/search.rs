use kotoba_core::QueryFlags;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RESULT_CAP: usize = 500;

fn default_cap() -> usize {
    DEFAULT_RESULT_CAP
}

fn default_enabled() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(default = "default_cap")]
    pub high_cap: usize,
    #[serde(default = "default_cap")]
    pub medium_cap: usize,
    #[serde(default = "default_cap")]
    pub low_cap: usize,

    #[serde(default = "default_enabled")]
    pub hiragana_to_katakana: bool,
    #[serde(default = "default_enabled")]
    pub katakana_to_hiragana: bool,
    #[serde(default = "default_enabled")]
    pub romaji_to_furigana: bool,
    /// Keep only high relevance results
    #[serde(default)]
    pub exact: bool,
    /// Widen queries with dictionary forms of conjugated words
    #[serde(default = "default_enabled")]
    pub morphology: bool,
}

impl SearchConfig {
    pub fn flags(&self) -> QueryFlags {
        let mut flags = QueryFlags::empty();
        flags.set(QueryFlags::HIRAGANA_TO_KATAKANA, self.hiragana_to_katakana);
        flags.set(QueryFlags::KATAKANA_TO_HIRAGANA, self.katakana_to_hiragana);
        flags.set(QueryFlags::ROMAJI_TO_FURIGANA, self.romaji_to_furigana);
        flags.set(QueryFlags::EXACT, self.exact);
        flags
    }

    /// High, medium and low caps
    pub fn caps(&self) -> [usize; 3] {
        [self.high_cap, self.medium_cap, self.low_cap]
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            high_cap: default_cap(),
            medium_cap: default_cap(),
            low_cap: default_cap(),
            hiragana_to_katakana: default_enabled(),
            katakana_to_hiragana: default_enabled(),
            romaji_to_furigana: default_enabled(),
            exact: false,
            morphology: default_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_match_query_defaults() {
        assert_eq!(SearchConfig::default().flags(), QueryFlags::default());
    }

    #[test]
    fn exact_sets_flag() {
        let config = SearchConfig {
            exact: true,
            romaji_to_furigana: false,
            ..SearchConfig::default()
        };
        let flags = config.flags();
        assert!(flags.contains(QueryFlags::EXACT));
        assert!(!flags.contains(QueryFlags::ROMAJI_TO_FURIGANA));
        assert_eq!(config.caps(), [500, 500, 500]);
    }
}
