use super::types::{CanonicalDocument, MappingTable};
use crate::errors::{Result, SimstatError};
use crate::simstat::parsers::value::TypedValue;
use crate::simstat::profiles::SimulatorProfile;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

lazy_static! {
    static ref EXTRA_RE: Regex = Regex::new(r#"^\s*"(?P<key>[^"]+)"\s*:\s*(?P<value>.+?)\s*$"#).unwrap();
}

/// Parses an orchestrator scalar such as `"HostNanoseconds" : 123`.
pub fn parse_extra(raw: &str) -> Result<(String, TypedValue)> {
    let caps = EXTRA_RE
        .captures(raw)
        .ok_or_else(|| SimstatError::InvalidExtra(raw.to_owned()))?;
    let value = TypedValue::coerce(&caps["value"])
        .map_err(|_| SimstatError::InvalidExtra(raw.to_owned()))?;
    Ok((caps["key"].to_owned(), value))
}

/// Shape of the serialized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputLayout {
    /// Dotted canonical keys become nested objects (`"Cache Summary": {..}`).
    #[default]
    Nested,
    /// One object keyed by the dotted canonical paths.
    Flat,
}

pub struct StatisticsAssembler<'a> {
    table: &'a MappingTable,
    extras: Vec<(String, TypedValue)>,
    layout: OutputLayout,
}

impl<'a> StatisticsAssembler<'a> {
    pub fn new(profile: &'a SimulatorProfile) -> Self {
        Self {
            table: &profile.table,
            extras: vec![],
            layout: OutputLayout::default(),
        }
    }

    pub fn extra(mut self, key: impl Into<String>, value: TypedValue) -> Self {
        self.extras.push((key.into(), value));
        self
    }

    pub fn extras<I>(mut self, extras: I) -> Self
    where
        I: IntoIterator<Item = (String, TypedValue)>,
    {
        self.extras.extend(extras);
        self
    }

    pub fn layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Applies the profile's rescales, then merges the extras over the result.
    ///
    /// Extras are taken as already expressed in the canonical unit, so they are
    /// never rescaled; a later extra overrides an earlier one.
    pub fn finish(&self, mut doc: CanonicalDocument) -> CanonicalDocument {
        for (key, factor) in self.table.rescales() {
            let scaled = match doc.get(key) {
                Some(TypedValue::Integer(v)) => TypedValue::Float(*v as f64 * factor),
                Some(TypedValue::Float(v)) => TypedValue::Float(v * factor),
                Some(TypedValue::Percent(v)) => TypedValue::Percent(v * factor),
                Some(TypedValue::Null) | None => continue,
            };
            debug!(key, factor, "rescaled canonical value");
            doc.insert(key, scaled);
        }
        for (key, value) in &self.extras {
            if let Some(previous) = doc.insert(key.as_str(), value.clone()) {
                warn!(key = %key, %previous, new = %value, "extra scalar overrides a parsed value");
            }
        }
        doc
    }

    /// Produces the indented JSON text of a finished document, keys sorted.
    pub fn assemble(&self, doc: CanonicalDocument) -> Result<String> {
        let doc = self.finish(doc);
        let text = match self.layout {
            OutputLayout::Flat => serde_json::to_string_pretty(&doc)?,
            OutputLayout::Nested => serde_json::to_string_pretty(&nest(&doc)?)?,
        };
        Ok(text)
    }
}

/// Splits dotted canonical keys into nested objects.
fn nest(doc: &CanonicalDocument) -> Result<Value> {
    let mut root = Map::new();
    for (key, value) in doc.iter() {
        let mut segments: Vec<&str> = key.split('.').collect();
        let leaf = segments.pop().unwrap_or(key);

        let mut curr = &mut root;
        for segment in segments {
            let child = curr
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()));
            curr = match child {
                Value::Object(map) => map,
                _ => return Err(SimstatError::LayoutConflict(key.to_owned())),
            };
        }
        if curr.contains_key(leaf) {
            return Err(SimstatError::LayoutConflict(key.to_owned()));
        }
        curr.insert(leaf.to_owned(), serde_json::to_value(value)?);
    }
    Ok(Value::Object(root))
}
