use crate::dictionary::DictionaryFormat;
use crate::kana::{
    hiragana_to_katakana, is_pure_hiragana, is_pure_katakana, katakana_to_hiragana,
    romaji_to_hiragana,
};
use crate::language::Deconjugator;

use super::{QueryFlags, Token, TokenType};

/// Base forms below this confidence are too speculative to widen a search
pub const MIN_BASE_FORM_CONFIDENCE: f32 = 0.8;

/// Recompute a token's variants and match type from its text.
///
/// Never fails: spellings that cannot be converted add nothing.
pub fn expand(
    token: &mut Token,
    format: DictionaryFormat,
    flags: QueryFlags,
    deconjugator: Option<&dyn Deconjugator>,
) {
    token.variants.clear();
    token.match_type = token.kind;

    let sources: Vec<String> = std::iter::once(token.text.clone())
        .chain(token.alternatives.iter().cloned())
        .collect();
    let mut variants = Vec::new();

    match token.kind {
        TokenType::Kanji => {
            for source in &sources {
                variants.extend(base_forms(deconjugator, source));
            }
        }
        TokenType::Furigana => {
            for source in &sources {
                variants.extend(script_shifts(source, flags));
                variants.extend(base_forms(deconjugator, source));
            }
        }
        TokenType::Romaji => {
            if flags.contains(QueryFlags::ROMAJI_TO_FURIGANA) {
                for source in &sources {
                    let Some(hiragana) = romaji_to_hiragana(source) else {
                        continue;
                    };
                    token.match_type = TokenType::Mix;
                    let katakana = flags
                        .contains(QueryFlags::HIRAGANA_TO_KATAKANA)
                        .then(|| hiragana_to_katakana(&hiragana));
                    let forms = base_forms(deconjugator, &hiragana);
                    variants.push(hiragana);
                    variants.extend(katakana);
                    variants.extend(forms);
                }
            }
        }
        TokenType::Mix => {}
    }

    variants.extend(format.adapter().extra_variants(token));

    for variant in variants {
        if variant.is_empty()
            || variant == token.text
            || token.alternatives.contains(&variant)
            || token.variants.contains(&variant)
        {
            continue;
        }
        token.variants.push(variant);
    }
}

fn script_shifts(text: &str, flags: QueryFlags) -> Option<String> {
    if flags.contains(QueryFlags::HIRAGANA_TO_KATAKANA) && is_pure_hiragana(text) {
        Some(hiragana_to_katakana(text))
    } else if flags.contains(QueryFlags::KATAKANA_TO_HIRAGANA) && is_pure_katakana(text) {
        Some(katakana_to_hiragana(text))
    } else {
        None
    }
}

fn base_forms(deconjugator: Option<&dyn Deconjugator>, word: &str) -> Vec<String> {
    deconjugator
        .map(|d| d.base_forms(word, MIN_BASE_FORM_CONFIDENCE))
        .unwrap_or_default()
}
