//! Kana transliteration: hiragana/katakana shifts and romaji to hiragana.

use crate::script::{is_hiragana, is_katakana};

const KANA_OFFSET: u32 = 0x60;

/// Shift every hiragana character into the katakana block
pub fn hiragana_to_katakana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{3041}'..='\u{3096}' | '\u{309D}'..='\u{309E}' => shift(c, KANA_OFFSET as i64),
            _ => c,
        })
        .collect()
}

/// Shift every katakana character that has a hiragana counterpart
pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{30A1}'..='\u{30F6}' | '\u{30FD}'..='\u{30FE}' => shift(c, -(KANA_OFFSET as i64)),
            _ => c,
        })
        .collect()
}

fn shift(c: char, by: i64) -> char {
    char::from_u32((c as i64 + by) as u32).unwrap_or(c)
}

/// Hiragana only (the prolonged sound mark is tolerated), at least one hiragana
pub fn is_pure_hiragana(text: &str) -> bool {
    text.chars().any(is_hiragana) && text.chars().all(|c| is_hiragana(c) || c == 'ー')
}

/// Katakana only, at least one character that is not the prolonged sound mark
pub fn is_pure_katakana(text: &str) -> bool {
    text.chars().any(|c| is_katakana(c) && c != 'ー') && text.chars().all(is_katakana)
}

/// Convert romaji to hiragana, or `None` when some part has no kana spelling.
///
/// Accepts Hepburn, Kunrei and common IME spellings: doubled consonants become
/// っ, `n` before a consonant (or `nn`, `n'`) becomes ん, `-` becomes ー.
pub fn romaji_to_hiragana(text: &str) -> Option<String> {
    if text.is_empty() || !text.is_ascii() {
        return None;
    }

    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut out = String::with_capacity(text.len() * 3);
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let next = bytes.get(i + 1).copied();

        match c {
            b'-' => {
                out.push('ー');
                i += 1;
                continue;
            }
            b'\'' => {
                i += 1;
                continue;
            }
            b'n' => match next {
                None => {
                    out.push('ん');
                    i += 1;
                    continue;
                }
                Some(b'\'') => {
                    out.push('ん');
                    i += 2;
                    continue;
                }
                Some(b'n') => {
                    out.push('ん');
                    // "nna" is ん + な, a bare "nn" is one ん
                    let followed_by_vowel =
                        bytes.get(i + 2).is_some_and(|b| is_vowel(*b) || *b == b'y');
                    i += if followed_by_vowel { 1 } else { 2 };
                    continue;
                }
                Some(b) if !is_vowel(b) && b != b'y' => {
                    out.push('ん');
                    i += 1;
                    continue;
                }
                _ => {}
            },
            _ => {}
        }

        // Sokuon: kk, tt, ss, tch ...
        if c.is_ascii_alphabetic() && !is_vowel(c) {
            if let Some(n) = next {
                let doubled = n == c && c != b'n';
                let tch = c == b't' && n == b'c' && bytes.get(i + 2) == Some(&b'h');
                if doubled || tch {
                    out.push('っ');
                    i += 1;
                    continue;
                }
            }
        }

        let mut matched = false;
        for len in (1..=3).rev() {
            let Some(chunk) = lower.get(i..i + len) else {
                continue;
            };
            if let Some(kana) = syllable(chunk) {
                out.push_str(kana);
                i += len;
                matched = true;
                break;
            }
        }

        if !matched {
            return None;
        }
    }

    Some(out)
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'i' | b'u' | b'e' | b'o')
}

#[rustfmt::skip]
fn syllable(romaji: &str) -> Option<&'static str> {
    let kana = match romaji {
        "a" => "あ", "i" => "い", "u" => "う", "e" => "え", "o" => "お",

        "ka" => "か", "ki" => "き", "ku" => "く", "ke" => "け", "ko" => "こ",
        "kya" => "きゃ", "kyu" => "きゅ", "kyo" => "きょ",
        "ga" => "が", "gi" => "ぎ", "gu" => "ぐ", "ge" => "げ", "go" => "ご",
        "gya" => "ぎゃ", "gyu" => "ぎゅ", "gyo" => "ぎょ",

        "sa" => "さ", "shi" => "し", "si" => "し", "su" => "す", "se" => "せ", "so" => "そ",
        "sha" => "しゃ", "shu" => "しゅ", "sho" => "しょ", "she" => "しぇ",
        "sya" => "しゃ", "syu" => "しゅ", "syo" => "しょ",
        "za" => "ざ", "ji" => "じ", "zi" => "じ", "zu" => "ず", "ze" => "ぜ", "zo" => "ぞ",
        "ja" => "じゃ", "ju" => "じゅ", "jo" => "じょ", "je" => "じぇ",
        "jya" => "じゃ", "jyu" => "じゅ", "jyo" => "じょ",
        "zya" => "じゃ", "zyu" => "じゅ", "zyo" => "じょ",

        "ta" => "た", "chi" => "ち", "ti" => "ち", "tsu" => "つ", "tu" => "つ",
        "te" => "て", "to" => "と",
        "cha" => "ちゃ", "chu" => "ちゅ", "cho" => "ちょ", "che" => "ちぇ",
        "tya" => "ちゃ", "tyu" => "ちゅ", "tyo" => "ちょ",
        "cya" => "ちゃ", "cyu" => "ちゅ", "cyo" => "ちょ",
        "da" => "だ", "di" => "ぢ", "du" => "づ", "de" => "で", "do" => "ど",
        "dya" => "ぢゃ", "dyu" => "ぢゅ", "dyo" => "ぢょ",

        "na" => "な", "ni" => "に", "nu" => "ぬ", "ne" => "ね", "no" => "の",
        "nya" => "にゃ", "nyu" => "にゅ", "nyo" => "にょ",

        "ha" => "は", "hi" => "ひ", "fu" => "ふ", "hu" => "ふ", "he" => "へ", "ho" => "ほ",
        "hya" => "ひゃ", "hyu" => "ひゅ", "hyo" => "ひょ",
        "fa" => "ふぁ", "fi" => "ふぃ", "fe" => "ふぇ", "fo" => "ふぉ",
        "ba" => "ば", "bi" => "び", "bu" => "ぶ", "be" => "べ", "bo" => "ぼ",
        "bya" => "びゃ", "byu" => "びゅ", "byo" => "びょ",
        "pa" => "ぱ", "pi" => "ぴ", "pu" => "ぷ", "pe" => "ぺ", "po" => "ぽ",
        "pya" => "ぴゃ", "pyu" => "ぴゅ", "pyo" => "ぴょ",

        "ma" => "ま", "mi" => "み", "mu" => "む", "me" => "め", "mo" => "も",
        "mya" => "みゃ", "myu" => "みゅ", "myo" => "みょ",

        "ya" => "や", "yu" => "ゆ", "yo" => "よ",

        "ra" => "ら", "ri" => "り", "ru" => "る", "re" => "れ", "ro" => "ろ",
        "rya" => "りゃ", "ryu" => "りゅ", "ryo" => "りょ",

        "wa" => "わ", "wi" => "うぃ", "we" => "うぇ", "wo" => "を",

        "va" => "ゔぁ", "vi" => "ゔぃ", "vu" => "ゔ", "ve" => "ゔぇ", "vo" => "ゔぉ",

        "xa" => "ぁ", "xi" => "ぃ", "xu" => "ぅ", "xe" => "ぇ", "xo" => "ぉ",
        "xya" => "ゃ", "xyu" => "ゅ", "xyo" => "ょ", "xtu" => "っ", "xwa" => "ゎ",

        _ => return None,
    };
    Some(kana)
}
