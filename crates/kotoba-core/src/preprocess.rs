use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor {
    // Default JP preprocessor
    fn process(&self, text: &str) -> String {
        let text = text.trim();

        if text.is_empty() {
            return String::new();
        }

        // Unicode normalization (NFKC) folds full-width ASCII and half-width kana
        let normalized: String = text.nfkc().collect();

        // Control characters go, any whitespace run becomes a single space
        let mut out = String::with_capacity(normalized.len());
        let mut pending_space = false;
        for c in normalized.chars() {
            if c.is_whitespace() {
                pending_space = true;
                continue;
            }
            if c.is_control() {
                continue;
            }
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }

        out
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}
