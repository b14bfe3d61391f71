use super::value::TypedValue;
use crate::errors::{Result, SimstatError};
use crate::simstat::profiles::DumpFormat;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Separator between a key and its value on one dump line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `  num cache accesses |  20839` (Sniper)
    Pipe,
    /// `   hGETS: 1234 # GETS hits` (zsim)
    Colon,
    /// `simInsts   148455   # Number of instructions simulated` (gem5)
    Whitespace,
}

impl Delimiter {
    /// Splits a line into exactly two parts, or nothing.
    #[inline]
    pub fn split<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        match self {
            Delimiter::Pipe => split_once_exact(line, '|'),
            Delimiter::Colon => split_once_exact(line, ':'),
            Delimiter::Whitespace => {
                let mut parts = line.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(key), Some(value), None) => Some((key, value)),
                    _ => None,
                }
            }
        }
    }
}

#[inline]
fn split_once_exact(line: &str, c: char) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(c)?;
    match value.contains(c) {
        true => None,
        false => Some((key, value)),
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Pipe => f.write_str("'|'"),
            Delimiter::Colon => f.write_str("':'"),
            Delimiter::Whitespace => f.write_str("whitespace"),
        }
    }
}

/// A key made unique within one ingestion pass.
///
/// A key whose rendered text is still free has no ordinal. Otherwise it takes
/// the next value of the pass-wide counter that renders to a free key, so a
/// raw `hGETS0` following two `hGETS` lines becomes `hGETS01`. The bare key is
/// kept as is, so stripping the suffix is exact even for keys that end in digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisambiguatedKey {
    bare: String,
    ordinal: Option<u64>,
}

impl DisambiguatedKey {
    pub fn new(bare: impl Into<String>, ordinal: Option<u64>) -> Self {
        Self {
            bare: bare.into(),
            ordinal,
        }
    }

    #[inline]
    pub fn bare(&self) -> &str {
        &self.bare
    }

    #[inline]
    pub fn ordinal(&self) -> Option<u64> {
        self.ordinal
    }
}

impl fmt::Display for DisambiguatedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ordinal {
            Some(n) => write!(f, "{}{}", self.bare, n),
            None => f.write_str(&self.bare),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestedToken {
    pub key: DisambiguatedKey,
    /// Leading whitespace characters of the untrimmed key.
    pub indent: usize,
    pub value: TypedValue,
    /// 1-based line number in the source dump.
    pub line: usize,
}

pub struct LineIngester<'a> {
    format: &'a DumpFormat,
}

impl<'a> LineIngester<'a> {
    pub fn new(format: &'a DumpFormat) -> Self {
        Self { format }
    }

    /// Tokenizes a dump, preserving line order.
    ///
    /// Lines that are empty after comment stripping, that match the header
    /// marker or that do not split into exactly two parts are skipped. A
    /// value that cannot be parsed aborts the whole pass.
    pub fn ingest<I, S>(&self, lines: I) -> Result<Vec<IngestedToken>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens: Vec<IngestedToken> = vec![];
        let mut taken: HashSet<String> = HashSet::new();
        let mut counter: u64 = 0;
        let mut duplicates: usize = 0;
        let mut skipped: usize = 0;

        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            if let Some(marker) = self.format.header_marker {
                if line.contains(marker) {
                    skipped += 1;
                    continue;
                }
            }

            let mut text = match self.format.delimiter {
                Delimiter::Whitespace => line.trim(),
                _ => line,
            };
            if let Some(marker) = self.format.comment_marker {
                if let Some(pos) = text.find(marker) {
                    text = &text[..pos];
                }
            }
            if text.trim().is_empty() {
                continue;
            }

            let Some((raw_key, raw_value)) = self.format.delimiter.split(text) else {
                skipped += 1;
                continue;
            };
            let bare = raw_key.trim();
            if bare.is_empty() {
                skipped += 1;
                continue;
            }

            let value = TypedValue::coerce(raw_value.trim()).map_err(|source| {
                SimstatError::Value {
                    key: bare.to_owned(),
                    line: idx + 1,
                    source,
                }
            })?;

            let ordinal = match taken.insert(bare.to_owned()) {
                true => None,
                false => {
                    duplicates += 1;
                    loop {
                        let n = counter;
                        counter += 1;
                        if taken.insert(format!("{bare}{n}")) {
                            break Some(n);
                        }
                    }
                }
            };

            tokens.push(IngestedToken {
                key: DisambiguatedKey::new(bare, ordinal),
                indent: raw_key.chars().take_while(|c| c.is_whitespace()).count(),
                value,
                line: idx + 1,
            });
        }

        debug!(
            tokens = tokens.len(),
            skipped,
            duplicates,
            delimiter = %self.format.delimiter,
            "ingested statistics dump"
        );
        Ok(tokens)
    }
}
