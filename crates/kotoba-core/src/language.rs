/// Optional morphology hook: maps conjugated words back to dictionary forms
pub trait Deconjugator: Send + Sync {
    /// Convert conjugated form to dictionary form(s)
    fn deconjugate(&self, word: &str) -> Vec<DeconjugationResult>;

    /// Dictionary forms at or above `min_confidence`, excluding the word itself
    fn base_forms(&self, word: &str, min_confidence: f32) -> Vec<String> {
        let mut forms: Vec<String> = Vec::new();
        for result in self.deconjugate(word) {
            if result.confidence < min_confidence
                || result.base_form.is_empty()
                || result.base_form == word
                || forms.contains(&result.base_form)
            {
                continue;
            }
            forms.push(result.base_form);
        }
        forms
    }
}

#[derive(Debug, Clone)]
pub struct DeconjugationResult {
    pub base_form: String,
    pub conjugation_type: String,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl Deconjugator for Fixed {
        fn deconjugate(&self, word: &str) -> Vec<DeconjugationResult> {
            let result = |base: &str, confidence| DeconjugationResult {
                base_form: base.to_string(),
                conjugation_type: "test".to_string(),
                confidence,
            };
            vec![
                result("食べる", 0.8),
                result("食べる", 1.0),
                result("食ぶ", 0.5),
                result(word, 1.0),
            ]
        }
    }

    #[test]
    fn base_forms_filters_and_dedups() {
        assert_eq!(Fixed.base_forms("食べた", 0.8), vec!["食べる".to_string()]);
        assert_eq!(Fixed.base_forms("食べた", 0.4).len(), 2);
    }
}
