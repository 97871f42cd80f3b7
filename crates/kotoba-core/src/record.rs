//! Parsed dictionary lines.
//!
//! A `Record<'a>` borrows its fields from the line it was parsed from; the
//! search executor turns the few records it keeps into `Record<'static>`
//! with [`Record::into_owned`].

use std::borrow::Cow;
use std::fmt;

use crate::dictionary::DictionaryFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record<'a> {
    Edict(EdictEntry<'a>),
    Kanji(KanjiEntry<'a>),
    Example(ExampleEntry<'a>),
    Unknown(UnknownEntry<'a>),
}

/// `HEADWORD [READING] /gloss/gloss/.../`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdictEntry<'a> {
    pub raw: Cow<'a, str>,
    pub headword: Cow<'a, str>,
    pub reading: Option<Cow<'a, str>>,
    /// Part-of-speech tags leading the first gloss, e.g. `(n)`
    pub classification: Option<Cow<'a, str>>,
    pub definitions: Vec<Definition<'a>>,
    /// `(P)`: common word
    pub important: bool,
    pub entry_id: Option<Cow<'a, str>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition<'a> {
    /// Sense number such as `(1)`
    pub marker: Option<Cow<'a, str>>,
    pub text: Cow<'a, str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanjiEntry<'a> {
    pub raw: Cow<'a, str>,
    pub character: Cow<'a, str>,
    pub radicals: Option<Cow<'a, str>>,
    pub strokes: Option<u32>,
    pub frequency: Option<u32>,
    pub grade: Option<u32>,
    pub jlpt: Option<u32>,
    /// Readings, then name readings (`T1`), then radical names (`T2`)
    pub readings: [Vec<Cow<'a, str>>; 3],
    pub meanings: Vec<Cow<'a, str>>,
}

/// `A: japanese<TAB>english#ID=...:B: breakdown`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleEntry<'a> {
    pub raw: Cow<'a, str>,
    pub japanese: Cow<'a, str>,
    pub english: Cow<'a, str>,
    pub breakdown: Option<Cow<'a, str>>,
    pub id: Option<Cow<'a, str>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntry<'a> {
    pub raw: Cow<'a, str>,
}

fn owned(field: Cow<'_, str>) -> Cow<'static, str> {
    Cow::Owned(field.into_owned())
}

fn owned_opt(field: Option<Cow<'_, str>>) -> Option<Cow<'static, str>> {
    field.map(owned)
}

fn owned_vec(fields: Vec<Cow<'_, str>>) -> Vec<Cow<'static, str>> {
    fields.into_iter().map(owned).collect()
}

/// Strip trailing tags like `(P)` or `(iK)` from a headword or reading
fn strip_tags(text: &str) -> &str {
    let mut text = text.trim();
    while text.ends_with(')') {
        match text.rfind('(') {
            Some(open) if open > 0 => text = text[..open].trim_end(),
            _ => break,
        }
    }
    text
}

impl<'a> Record<'a> {
    pub fn format(&self) -> DictionaryFormat {
        match self {
            Record::Edict(_) => DictionaryFormat::EdictLike,
            Record::Kanji(_) => DictionaryFormat::KanjiLike,
            Record::Example(_) => DictionaryFormat::ExamplesLike,
            Record::Unknown(_) => DictionaryFormat::Unknown,
        }
    }

    pub fn raw_line(&self) -> &str {
        match self {
            Record::Edict(e) => &e.raw,
            Record::Kanji(k) => &k.raw,
            Record::Example(x) => &x.raw,
            Record::Unknown(u) => &u.raw,
        }
    }

    /// The field a list of results is keyed by
    pub fn headline(&self) -> &str {
        match self {
            Record::Edict(e) => &e.headword,
            Record::Kanji(k) => &k.character,
            Record::Example(x) => &x.japanese,
            Record::Unknown(u) => &u.raw,
        }
    }

    pub fn is_important(&self) -> bool {
        matches!(self, Record::Edict(e) if e.important)
    }

    pub fn into_owned(self) -> Record<'static> {
        match self {
            Record::Edict(e) => Record::Edict(e.into_owned()),
            Record::Kanji(k) => Record::Kanji(k.into_owned()),
            Record::Example(x) => Record::Example(x.into_owned()),
            Record::Unknown(u) => Record::Unknown(UnknownEntry { raw: owned(u.raw) }),
        }
    }
}

impl<'a> EdictEntry<'a> {
    /// EDICT2 lists several headwords separated by `;`
    pub fn headwords(&self) -> impl Iterator<Item = &str> {
        self.headword.split(';').map(strip_tags).filter(|h| !h.is_empty())
    }

    pub fn readings(&self) -> impl Iterator<Item = &str> {
        self.reading
            .as_deref()
            .into_iter()
            .flat_map(|r| r.split(';'))
            .map(strip_tags)
            .filter(|r| !r.is_empty())
    }

    pub fn glosses(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.text.as_ref())
    }

    pub fn into_owned(self) -> EdictEntry<'static> {
        EdictEntry {
            raw: owned(self.raw),
            headword: owned(self.headword),
            reading: owned_opt(self.reading),
            classification: owned_opt(self.classification),
            definitions: self
                .definitions
                .into_iter()
                .map(|d| Definition {
                    marker: owned_opt(d.marker),
                    text: owned(d.text),
                })
                .collect(),
            important: self.important,
            entry_id: owned_opt(self.entry_id),
        }
    }
}

impl<'a> KanjiEntry<'a> {
    /// All readings of every group, okurigana dots removed
    pub fn plain_readings(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.readings.iter().flatten().map(|r| {
            if r.contains('.') {
                Cow::Owned(r.replace('.', ""))
            } else {
                Cow::Borrowed(r.as_ref())
            }
        })
    }

    pub fn into_owned(self) -> KanjiEntry<'static> {
        let [on_kun, names, radical_names] = self.readings;
        KanjiEntry {
            raw: owned(self.raw),
            character: owned(self.character),
            radicals: owned_opt(self.radicals),
            strokes: self.strokes,
            frequency: self.frequency,
            grade: self.grade,
            jlpt: self.jlpt,
            readings: [owned_vec(on_kun), owned_vec(names), owned_vec(radical_names)],
            meanings: owned_vec(self.meanings),
        }
    }
}

impl<'a> ExampleEntry<'a> {
    pub fn into_owned(self) -> ExampleEntry<'static> {
        ExampleEntry {
            raw: owned(self.raw),
            japanese: owned(self.japanese),
            english: owned(self.english),
            breakdown: owned_opt(self.breakdown),
            id: owned_opt(self.id),
        }
    }
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Edict(e) => {
                write!(f, "{}", e.headword)?;
                if let Some(reading) = &e.reading {
                    write!(f, " [{reading}]")?;
                }
                if let Some(classification) = &e.classification {
                    write!(f, " {classification}")?;
                }
                for definition in &e.definitions {
                    match &definition.marker {
                        Some(marker) => write!(f, " {marker} {}", definition.text)?,
                        None => write!(f, " / {}", definition.text)?,
                    }
                }
                if e.important {
                    write!(f, " (P)")?;
                }
                Ok(())
            }
            Record::Kanji(k) => {
                write!(f, "{}", k.character)?;
                if let Some(radicals) = &k.radicals {
                    write!(f, " [{radicals}]")?;
                }
                if let Some(strokes) = k.strokes {
                    write!(f, " strokes:{strokes}")?;
                }
                if let Some(grade) = k.grade {
                    write!(f, " grade:{grade}")?;
                }
                if let Some(jlpt) = k.jlpt {
                    write!(f, " jlpt:{jlpt}")?;
                }
                if let Some(frequency) = k.frequency {
                    write!(f, " freq:{frequency}")?;
                }
                let readings: Vec<&str> = k.readings[0].iter().map(AsRef::as_ref).collect();
                if !readings.is_empty() {
                    write!(f, " {}", readings.join(" "))?;
                }
                let meanings: Vec<&str> = k.meanings.iter().map(AsRef::as_ref).collect();
                if !meanings.is_empty() {
                    write!(f, " {{{}}}", meanings.join("; "))?;
                }
                Ok(())
            }
            Record::Example(x) => write!(f, "{} / {}", x.japanese, x.english),
            Record::Unknown(u) => f.write_str(&u.raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edict_entry(line: &str) -> EdictEntry<'_> {
        EdictEntry {
            raw: Cow::Borrowed(line),
            headword: Cow::Borrowed("日本;日本国(P)"),
            reading: Some(Cow::Borrowed("にほん(P);にっぽん")),
            classification: Some(Cow::Borrowed("(n)")),
            definitions: vec![Definition {
                marker: None,
                text: Cow::Borrowed("Japan"),
            }],
            important: true,
            entry_id: None,
        }
    }

    #[test]
    fn alternatives_strip_tags() {
        let entry = edict_entry("raw");
        assert_eq!(entry.headwords().collect::<Vec<_>>(), vec!["日本", "日本国"]);
        assert_eq!(entry.readings().collect::<Vec<_>>(), vec!["にほん", "にっぽん"]);
    }

    #[test]
    fn owned_copy_outlives_line() {
        let owned = {
            let line = String::from("日本 [にほん] /(n) Japan/(P)/");
            Record::Edict(edict_entry(&line)).into_owned()
        };
        assert_eq!(owned.headline(), "日本;日本国(P)");
        assert!(owned.is_important());
        assert_eq!(owned.format(), DictionaryFormat::EdictLike);
    }

    #[test]
    fn plain_readings_drop_okurigana_dots() {
        let entry = KanjiEntry {
            raw: Cow::Borrowed(""),
            character: Cow::Borrowed("亜"),
            radicals: None,
            strokes: Some(7),
            frequency: None,
            grade: None,
            jlpt: None,
            readings: [
                vec![Cow::Borrowed("ア"), Cow::Borrowed("つ.ぐ")],
                vec![Cow::Borrowed("や")],
                Vec::new(),
            ],
            meanings: vec![Cow::Borrowed("Asia")],
        };
        let readings: Vec<String> = entry.plain_readings().map(Cow::into_owned).collect();
        assert_eq!(readings, vec!["ア", "つぐ", "や"]);
        assert_eq!(Record::Kanji(entry).to_string(), "亜 strokes:7 ア つ.ぐ {Asia}");
    }
}
