use kotoba_core::language::{DeconjugationResult, Deconjugator};

/// Replace a conjugated ending with a dictionary form ending
struct Rule {
    ending: &'static str,
    base: &'static str,
    kind: &'static str,
    confidence: f32,
}

const fn rule(ending: &'static str, base: &'static str, kind: &'static str, confidence: f32) -> Rule {
    Rule {
        ending,
        base,
        kind,
        confidence,
    }
}

#[rustfmt::skip]
const RULES: &[Rule] = &[
    // ichidan (食べる)
    rule("た", "る", "ichidan verb, past", 0.8),
    rule("て", "る", "ichidan verb, te-form", 0.8),
    rule("ない", "る", "ichidan verb, negative", 0.8),
    rule("ます", "る", "ichidan verb, polite", 0.8),
    rule("たい", "る", "ichidan verb, desire", 0.7),
    rule("られる", "る", "ichidan verb, passive", 0.7),
    rule("よう", "る", "ichidan verb, volitional", 0.7),

    // godan past and te-form
    rule("いた", "く", "godan verb, past", 0.8),
    rule("いて", "く", "godan verb, te-form", 0.8),
    rule("いだ", "ぐ", "godan verb, past", 0.9),
    rule("いで", "ぐ", "godan verb, te-form", 0.9),
    rule("した", "す", "godan verb, past", 0.8),
    rule("して", "す", "godan verb, te-form", 0.8),
    rule("った", "う", "godan verb, past", 0.6),
    rule("った", "つ", "godan verb, past", 0.6),
    rule("った", "る", "godan verb, past", 0.6),
    rule("って", "う", "godan verb, te-form", 0.6),
    rule("って", "つ", "godan verb, te-form", 0.6),
    rule("って", "る", "godan verb, te-form", 0.6),
    rule("んだ", "む", "godan verb, past", 0.7),
    rule("んだ", "ぶ", "godan verb, past", 0.6),
    rule("んだ", "ぬ", "godan verb, past", 0.5),
    rule("んで", "む", "godan verb, te-form", 0.7),
    rule("んで", "ぶ", "godan verb, te-form", 0.6),
    rule("んで", "ぬ", "godan verb, te-form", 0.5),

    // godan polite: i-row stem
    rule("きます", "く", "godan verb, polite", 0.8),
    rule("ぎます", "ぐ", "godan verb, polite", 0.8),
    rule("します", "す", "godan verb, polite", 0.8),
    rule("ちます", "つ", "godan verb, polite", 0.8),
    rule("にます", "ぬ", "godan verb, polite", 0.8),
    rule("びます", "ぶ", "godan verb, polite", 0.8),
    rule("みます", "む", "godan verb, polite", 0.8),
    rule("ります", "る", "godan verb, polite", 0.8),
    rule("います", "う", "godan verb, polite", 0.8),

    // godan negative: a-row stem
    rule("かない", "く", "godan verb, negative", 0.8),
    rule("がない", "ぐ", "godan verb, negative", 0.8),
    rule("さない", "す", "godan verb, negative", 0.8),
    rule("たない", "つ", "godan verb, negative", 0.8),
    rule("なない", "ぬ", "godan verb, negative", 0.8),
    rule("ばない", "ぶ", "godan verb, negative", 0.8),
    rule("まない", "む", "godan verb, negative", 0.8),
    rule("らない", "る", "godan verb, negative", 0.8),
    rule("わない", "う", "godan verb, negative", 0.9),

    // i-adjectives (高い)
    rule("くない", "い", "i-adjective, negative", 0.9),
    rule("かった", "い", "i-adjective, past", 0.9),
    rule("くて", "い", "i-adjective, te-form", 0.9),
    rule("ければ", "い", "i-adjective, conditional", 0.9),
    rule("く", "い", "i-adjective, adverbial", 0.6),
];

/// Whole-word forms of する and 来る
#[rustfmt::skip]
const IRREGULAR: &[(&str, &str, &str)] = &[
    ("した", "する", "irregular verb する, past"),
    ("して", "する", "irregular verb する, te-form"),
    ("します", "する", "irregular verb する, polite"),
    ("しない", "する", "irregular verb する, negative"),
    ("来た", "来る", "irregular verb 来る, past"),
    ("来て", "来る", "irregular verb 来る, te-form"),
    ("来ます", "来る", "irregular verb 来る, polite"),
    ("来ない", "来る", "irregular verb 来る, negative"),
    ("きた", "くる", "irregular verb 来る, past"),
    ("きて", "くる", "irregular verb 来る, te-form"),
    ("きます", "くる", "irregular verb 来る, polite"),
    ("こない", "くる", "irregular verb 来る, negative"),
];

/// Auxiliary endings peeled off before the rules run, e.g. 食べている → 食べて
#[rustfmt::skip]
const AUXILIARIES: &[(&str, &str, &str)] = &[
    ("ている", "て", "continuous"),
    ("でいる", "で", "continuous"),
    ("ていた", "て", "past continuous"),
    ("ました", "ます", "past"),
    ("ません", "ます", "negative"),
];

/// Rule based deconjugation for common verb and adjective endings
#[derive(Debug, Clone, Copy, Default)]
pub struct JapaneseDeconjugator;

impl JapaneseDeconjugator {
    pub fn new() -> Self {
        Self
    }

    fn apply_rules(&self, word: &str, results: &mut Vec<DeconjugationResult>) {
        for (form, base, kind) in IRREGULAR {
            if word == *form {
                results.push(DeconjugationResult {
                    base_form: base.to_string(),
                    conjugation_type: kind.to_string(),
                    confidence: 1.0,
                });
            }
        }

        for rule in RULES {
            let Some(stem) = word.strip_suffix(rule.ending) else {
                continue;
            };
            // no verb or adjective stem ends in a bare っ or ん
            if stem.is_empty() || stem.ends_with(['っ', 'ん']) {
                continue;
            }
            results.push(DeconjugationResult {
                base_form: format!("{stem}{}", rule.base),
                conjugation_type: rule.kind.to_string(),
                confidence: rule.confidence,
            });
        }
    }
}

impl Deconjugator for JapaneseDeconjugator {
    fn deconjugate(&self, word: &str) -> Vec<DeconjugationResult> {
        let mut results = Vec::new();
        self.apply_rules(word, &mut results);

        for (ending, replacement, aspect) in AUXILIARIES {
            let Some(stem) = word.strip_suffix(ending) else {
                continue;
            };
            if stem.is_empty() {
                continue;
            }
            let inner = format!("{stem}{replacement}");
            let mut nested = Vec::new();
            self.apply_rules(&inner, &mut nested);
            results.extend(nested.into_iter().map(|mut r| {
                r.conjugation_type = format!("{}, {aspect}", r.conjugation_type);
                r
            }));
        }

        tracing::trace!(word, candidates = results.len(), "Deconjugated");
        results
    }
}
