use std::path::{Path, PathBuf};

use kotoba_core::{Dictionary, DictionaryFormat};
use serde::{Deserialize, Serialize};

/// One dictionary file; the format is detected from the name when omitted
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DictionaryConfig {
    pub name: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<DictionaryFormat>,
}

impl DictionaryConfig {
    /// The usual English, Kanji and Examples files under `dir`
    pub fn standard_set(dir: &Path) -> Vec<Self> {
        [
            ("English", "edict.utf8"),
            ("Kanji", "kanjidic.utf8"),
            ("Examples", "examples.utf8"),
        ]
        .into_iter()
        .map(|(name, file)| Self {
            name: name.to_string(),
            path: dir.join(file),
            format: None,
        })
        .collect()
    }

    pub fn dictionary(&self) -> Dictionary {
        match self.format {
            Some(format) => Dictionary::new(&self.name, &self.path, format),
            None => Dictionary::detect(&self.name, &self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_set_detects_formats() {
        let formats: Vec<DictionaryFormat> = DictionaryConfig::standard_set(Path::new("/dicts"))
            .iter()
            .map(|d| d.dictionary().format())
            .collect();
        assert_eq!(
            formats,
            vec![
                DictionaryFormat::EdictLike,
                DictionaryFormat::KanjiLike,
                DictionaryFormat::ExamplesLike
            ]
        );
    }

    #[test]
    fn explicit_format_wins() {
        let config = DictionaryConfig {
            name: "Kanji".to_string(),
            path: PathBuf::from("/dicts/kanji"),
            format: Some(DictionaryFormat::Unknown),
        };
        assert_eq!(config.dictionary().format(), DictionaryFormat::Unknown);
    }
}
