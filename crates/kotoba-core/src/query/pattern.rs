use regex::Regex;

/// Marks where a template takes the token's spellings
pub const PLACEHOLDER: &str = "{}";

/// A template instantiated with one token's spellings
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

impl CompiledPattern {
    /// Replace the placeholder with a non-capturing alternation of the
    /// escaped spellings and compile the result
    pub fn build(template: &str, spellings: &[&str]) -> Result<Self, regex::Error> {
        let alternation = spellings
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        let source = template.replace(PLACEHOLDER, &format!("(?:{alternation})"));
        let regex = Regex::new(&source)?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for CompiledPattern {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_spellings() {
        let pattern = CompiledPattern::build("^{}$", &["a.b", "c+"]).unwrap();
        assert_eq!(pattern.as_str(), r"^(?:a\.b|c\+)$");
        assert!(pattern.is_match("a.b"));
        assert!(!pattern.is_match("axb"));
        assert!(pattern.is_match("c+"));
    }

    #[test]
    fn surfaces_invalid_templates() {
        assert!(CompiledPattern::build("({}", &["cat"]).is_err());
    }
}
