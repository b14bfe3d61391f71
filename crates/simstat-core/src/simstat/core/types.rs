#![allow(non_snake_case)]

use crate::simstat::parsers::value::TypedValue;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Top-level names of the canonical vocabulary.
#[derive(Debug)]
pub struct CanonicalKeys<'a> {
    pub INSTRUCTIONS: &'a str,
    pub CYCLES: &'a str,
    pub IPC: &'a str,
    pub TIME_NS: &'a str,
    pub HOST_NANOSECONDS: &'a str,
    pub CACHE_SUMMARY: &'a str,
}

impl CanonicalKeys<'static> {
    pub const fn new() -> Self {
        let INSTRUCTIONS = "Instructions";
        let CYCLES = "Cycles";
        let IPC = "IPC";
        let TIME_NS = "Time (ns)";
        let HOST_NANOSECONDS = "HostNanoseconds";
        let CACHE_SUMMARY = "Cache Summary";
        Self {
            INSTRUCTIONS,
            CYCLES,
            IPC,
            TIME_NS,
            HOST_NANOSECONDS,
            CACHE_SUMMARY,
        }
    }
}

impl Default for CanonicalKeys<'static> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache levels reported under `Cache Summary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheLevel {
    L1I,
    L1D,
    L2,
}

impl CacheLevel {
    pub const ALL: [CacheLevel; 3] = [CacheLevel::L1I, CacheLevel::L1D, CacheLevel::L2];

    pub const fn accesses(&self) -> &'static str {
        match self {
            CacheLevel::L1I => "Cache Summary.Cache L1-I.num cache accesses",
            CacheLevel::L1D => "Cache Summary.Cache L1-D.num cache accesses",
            CacheLevel::L2 => "Cache Summary.Cache L2.num cache accesses",
        }
    }

    pub const fn misses(&self) -> &'static str {
        match self {
            CacheLevel::L1I => "Cache Summary.Cache L1-I.num cache misses",
            CacheLevel::L1D => "Cache Summary.Cache L1-D.num cache misses",
            CacheLevel::L2 => "Cache Summary.Cache L2.num cache misses",
        }
    }

    pub const fn miss_rate(&self) -> &'static str {
        match self {
            CacheLevel::L1I => "Cache Summary.Cache L1-I.miss rate",
            CacheLevel::L1D => "Cache Summary.Cache L1-D.miss rate",
            CacheLevel::L2 => "Cache Summary.Cache L2.miss rate",
        }
    }

    pub const fn mpki(&self) -> &'static str {
        match self {
            CacheLevel::L1I => "Cache Summary.Cache L1-I.mpki",
            CacheLevel::L1D => "Cache Summary.Cache L1-D.mpki",
            CacheLevel::L2 => "Cache Summary.Cache L2.mpki",
        }
    }
}

/// Flat result of one normalization, keyed by dotted canonical path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalDocument {
    values: BTreeMap<String, TypedValue>,
}

impl CanonicalDocument {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        self.values.get(key)
    }

    /// Numeric view of a key; absent and `Null` keys have none.
    #[inline]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(TypedValue::as_f64)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: TypedValue) -> Option<TypedValue> {
        self.values.insert(key.into(), value)
    }

    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<TypedValue> {
        self.values.remove(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
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

impl FromIterator<(String, TypedValue)> for CanonicalDocument {
    fn from_iter<T: IntoIterator<Item = (String, TypedValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub source: Cow<'static, str>,
    pub canonical: Cow<'static, str>,
}

/// Simulator-specific projection of source key paths onto canonical keys.
///
/// The relation may map several sources onto one canonical key; such keys
/// must be listed as aggregation targets so their contributions are summed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
    aggregation_targets: Vec<Cow<'static, str>>,
    rescales: Vec<(Cow<'static, str>, f64)>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(
        mut self,
        source: impl Into<Cow<'static, str>>,
        canonical: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.entries.push(MappingEntry {
            source: source.into(),
            canonical: canonical.into(),
        });
        self
    }

    /// Maps every source onto the same canonical key and marks it for summing.
    pub fn aggregate<I, S>(mut self, canonical: &'static str, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        for source in sources {
            self = self.map(source, canonical);
        }
        self.aggregation_target(canonical)
    }

    pub fn aggregation_target(mut self, canonical: impl Into<Cow<'static, str>>) -> Self {
        let canonical = canonical.into();
        if !self.aggregation_targets.contains(&canonical) {
            self.aggregation_targets.push(canonical);
        }
        self
    }

    /// Multiplies a canonical key by `factor` before serialization.
    pub fn rescale(mut self, canonical: impl Into<Cow<'static, str>>, factor: f64) -> Self {
        self.rescales.push((canonical.into(), factor));
        self
    }

    #[inline]
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    #[inline]
    pub fn aggregation_targets(&self) -> impl Iterator<Item = &str> {
        self.aggregation_targets.iter().map(|t| t.as_ref())
    }

    #[inline]
    pub fn is_aggregation_target(&self, canonical: &str) -> bool {
        self.aggregation_targets.iter().any(|t| t == canonical)
    }

    pub fn sources_for<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.canonical == canonical)
            .map(|e| e.source.as_ref())
    }

    pub fn rescales(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rescales.iter().map(|(k, f)| (k.as_ref(), *f))
    }
}

impl fmt::Display for MappingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .entries
            .iter()
            .map(|e| e.source.len())
            .max()
            .unwrap_or(0);
        for entry in &self.entries {
            let marker = match self.is_aggregation_target(&entry.canonical) {
                true => " (sum)",
                false => "",
            };
            writeln!(
                f,
                "{:<width$}  ->  {}{}",
                entry.source, entry.canonical, marker
            )?;
        }
        for (key, factor) in self.rescales() {
            writeln!(f, "rescale {key} by {factor:e}")?;
        }
        Ok(())
    }
}
