use std::sync::Arc;

use kotoba_config::Config;
use kotoba_config::dictionary::DictionaryConfig;
use kotoba_lang_japanese::JapaneseDeconjugator;
use tokio::sync::RwLock;

/// Command line switches that outlive config reloads
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Scan on a blocking task and print everything at the end
    pub foreground: bool,
    /// Print results as JSON lines
    pub json: bool,
}

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    /// Name of the dictionary searches run against
    pub selected_dictionary: RwLock<Option<String>>,
    pub deconjugator: JapaneseDeconjugator,
    pub options: RunOptions,
}

impl AppState {
    pub fn new(config: Config, options: RunOptions) -> Self {
        let selected = config.default_dictionary().map(|d| d.name.clone());
        Self {
            config: Arc::new(RwLock::new(config)),
            selected_dictionary: RwLock::new(selected),
            deconjugator: JapaneseDeconjugator::new(),
            options,
        }
    }

    /// Config of the selected dictionary, if it still exists
    pub async fn dictionary(&self) -> Option<DictionaryConfig> {
        let selected = self.selected_dictionary.read().await.clone()?;
        self.config.read().await.dictionary(&selected).cloned()
    }
}
