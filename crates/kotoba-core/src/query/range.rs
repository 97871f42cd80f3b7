use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric kanji attributes a query can constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RangeKind {
    Strokes,
    Frequency,
    Grade,
    Jlpt,
}

impl RangeKind {
    /// Compact prefix letter: S, F, G, J
    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            'S' => Some(RangeKind::Strokes),
            'F' => Some(RangeKind::Frequency),
            'G' => Some(RangeKind::Grade),
            'J' => Some(RangeKind::Jlpt),
            _ => None,
        }
    }
}

/// Sorted, disjoint, inclusive spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    spans: Vec<(u32, u32)>,
}

impl Range {
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            spans: vec![(min.min(max), min.max(max))],
        }
    }

    /// Parse `5`, `5-10` or a comma list such as `1,3,5-6`
    pub fn parse(body: &str) -> Option<Self> {
        if body.is_empty() {
            return None;
        }

        let mut spans = Vec::new();
        for part in body.split(',') {
            let (min, max) = match part.split_once('-') {
                Some((lo, hi)) => (parse_number(lo)?, parse_number(hi)?),
                None => {
                    let value = parse_number(part)?;
                    (value, value)
                }
            };
            if min > max {
                return None;
            }
            spans.push((min, max));
        }

        spans.sort_unstable();
        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(spans.len());
        for (min, max) in spans {
            match merged.last_mut() {
                Some(last) if min <= last.1.saturating_add(1) => last.1 = last.1.max(max),
                _ => merged.push((min, max)),
            }
        }

        Some(Self { spans: merged })
    }

    pub fn contains(&self, value: u32) -> bool {
        self.spans
            .iter()
            .any(|(min, max)| (*min..=*max).contains(&value))
    }

    pub fn spans(&self) -> &[(u32, u32)] {
        &self.spans
    }
}

fn parse_number(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (min, max)) in self.spans.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if min == max {
                write!(f, "{min}")?;
            } else {
                write!(f, "{min}-{max}")?;
            }
        }
        Ok(())
    }
}

/// Recognise a compact range word such as `S5`, `G1-3` or `J2,4`
pub fn parse_range_token(word: &str) -> Option<(RangeKind, Range)> {
    let mut chars = word.chars();
    let kind = RangeKind::from_prefix(chars.next()?)?;
    let range = Range::parse(chars.as_str())?;
    Some((kind, range))
}
