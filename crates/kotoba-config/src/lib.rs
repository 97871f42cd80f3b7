use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use self::dictionary::DictionaryConfig;
use self::search::SearchConfig;

pub mod dictionary;
pub mod search;

fn default_delta_time() -> u64 {
    100
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub dictionaries: Vec<DictionaryConfig>,
    /// App main loop delta time, also the result polling period
    #[serde(default = "default_delta_time")]
    pub delta_time: u64,
}

impl Config {
    pub fn new() -> Self {
        let delta_time = env::var("KOTOBA_DELTA_TIME_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default_delta_time());

        let mut search = SearchConfig::default();
        if let Some(cap) = env::var("KOTOBA_RESULT_CAP").ok().and_then(|v| v.parse().ok()) {
            search.high_cap = cap;
            search.medium_cap = cap;
            search.low_cap = cap;
        }

        let dictionaries = env::var("KOTOBA_DICTIONARY_DIR")
            .map(|dir| DictionaryConfig::standard_set(&PathBuf::from(dir)))
            .unwrap_or_default();

        Config {
            search,
            dictionaries,
            delta_time,
        }
    }

    /// Dictionary by display name, ignoring case
    pub fn dictionary(&self, name: &str) -> Option<&DictionaryConfig> {
        self.dictionaries
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// First configured dictionary
    pub fn default_dictionary(&self) -> Option<&DictionaryConfig> {
        self.dictionaries.first()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
