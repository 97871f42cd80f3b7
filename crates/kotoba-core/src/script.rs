//! Character script detection used by the query classifier.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Kanji,
    Hiragana,
    Katakana,
    /// ASCII letters and digits
    Latin,
    Other,
}

impl Script {
    pub fn of(c: char) -> Self {
        if is_kanji(c) {
            Script::Kanji
        } else if is_hiragana(c) {
            Script::Hiragana
        } else if is_katakana(c) {
            Script::Katakana
        } else if c.is_ascii_alphanumeric() {
            Script::Latin
        } else {
            Script::Other
        }
    }

    pub fn is_japanese(self) -> bool {
        matches!(self, Script::Kanji | Script::Hiragana | Script::Katakana)
    }
}

pub fn is_kanji(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2FA1F}'
        // 々 〆 〇
        | '\u{3005}'..='\u{3007}')
}

pub fn is_hiragana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{3096}' | '\u{309D}'..='\u{309F}')
}

/// Katakana, including the prolonged sound mark but not the middle dot
pub fn is_katakana(c: char) -> bool {
    matches!(c, '\u{30A1}'..='\u{30FA}' | '\u{30FC}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}')
}

pub fn is_kana(c: char) -> bool {
    is_hiragana(c) || is_katakana(c)
}

pub fn contains_kanji(text: &str) -> bool {
    text.chars().any(is_kanji)
}

pub fn is_all_kanji(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_kanji)
}

pub fn is_all_kana(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_kana)
}

/// ASCII letters, with apostrophes and hyphens allowed inside a word
pub fn is_romaji_word(text: &str) -> bool {
    let bytes = text.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    first.is_ascii_alphabetic()
        && last.is_ascii_alphabetic()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphabetic() || *b == b'\'' || *b == b'-')
}
