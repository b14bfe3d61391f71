use super::hierarchy::{HierarchyBuilder, Leaf, StatTree};
use super::line_ingester::{IngestedToken, LineIngester};
use crate::errors::{Result, SimstatError};
use crate::simstat::profiles::DumpFormat;
use std::collections::HashMap;
use std::path::Path;

/// Anything a mapping table can look source key paths up in.
pub trait StatsSource {
    fn resolve(&self, path: &str) -> Option<&Leaf>;
}

impl StatsSource for StatTree {
    #[inline]
    fn resolve(&self, path: &str) -> Option<&Leaf> {
        self.leaf(path)
    }
}

/// Dumps whose keys are already fully dotted paths (gem5).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatStats {
    values: HashMap<String, Leaf>,
}

impl FlatStats {
    pub fn from_tokens(tokens: &[IngestedToken]) -> Self {
        let mut values: HashMap<String, Leaf> = HashMap::with_capacity(tokens.len());
        for token in tokens {
            match values.get_mut(token.key.bare()) {
                Some(leaf) => leaf.push(token.value.clone()),
                None => {
                    values.insert(token.key.bare().to_owned(), Leaf::new(token.value.clone()));
                }
            }
        }
        Self { values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl StatsSource for FlatStats {
    #[inline]
    fn resolve(&self, path: &str) -> Option<&Leaf> {
        self.values.get(path)
    }
}

/// A dump after ingestion, shaped by its format.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStats {
    Tree(StatTree),
    Flat(FlatStats),
}

impl ParsedStats {
    /// Ingests lines and, for indented formats, rebuilds the hierarchy.
    pub fn parse<I, S>(format: &DumpFormat, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = LineIngester::new(format).ingest(lines)?;
        Ok(match format.indent {
            Some(policy) => ParsedStats::Tree(HierarchyBuilder::new(policy).build(&tokens)),
            None => ParsedStats::Flat(FlatStats::from_tokens(&tokens)),
        })
    }
}

impl StatsSource for ParsedStats {
    #[inline]
    fn resolve(&self, path: &str) -> Option<&Leaf> {
        match self {
            ParsedStats::Tree(tree) => tree.resolve(path),
            ParsedStats::Flat(flat) => flat.resolve(path),
        }
    }
}

/// Reads a whole statistics dump into memory.
///
/// Simulator dumps are small; invalid UTF-8 is replaced rather than rejected
/// since only keys and numbers matter.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|source| SimstatError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_owned)
        .collect())
}
