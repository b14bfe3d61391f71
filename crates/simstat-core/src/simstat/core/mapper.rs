use super::types::{CanonicalDocument, MappingTable};
use crate::simstat::parsers::stats_file::StatsSource;
use crate::simstat::parsers::value::TypedValue;
use tracing::{debug, warn};

/// Adds counter contributions, clamping to the `i64` range.
/// The flag is set when any step had to be clamped.
fn saturating_sum(values: impl IntoIterator<Item = i64>) -> (i64, bool) {
    values
        .into_iter()
        .fold((0, false), |(sum, clamped), v| match sum.checked_add(v) {
            Some(next) => (next, clamped),
            None => (sum.saturating_add(v), true),
        })
}

pub trait CanonicalMapper {
    /// Projects source key paths onto canonical keys.
    ///
    /// Plain entries copy the latest value of their source; `Null` never
    /// reaches the document. Aggregation targets hold the sum of the integer
    /// value of every source instance that resolves, and are left out when
    /// none does. A sum beyond the `i64` range is clamped to it. Missing
    /// sources are never an error.
    fn map(&self, table: &MappingTable) -> CanonicalDocument;
}

impl<T: StatsSource + ?Sized> CanonicalMapper for T {
    fn map(&self, table: &MappingTable) -> CanonicalDocument {
        let mut doc = CanonicalDocument::new();
        let mut missing: usize = 0;

        for entry in table.entries() {
            if table.is_aggregation_target(&entry.canonical) {
                continue;
            }
            match self.resolve(&entry.source).map(|leaf| leaf.latest()) {
                Some(TypedValue::Null) | None => missing += 1,
                Some(value) => {
                    doc.insert(entry.canonical.as_ref(), value.clone());
                }
            }
        }

        for target in table.aggregation_targets() {
            let mut resolved: usize = 0;
            let (sum, clamped) = saturating_sum(
                table
                    .sources_for(target)
                    .filter_map(|source| self.resolve(source))
                    .inspect(|_| resolved += 1)
                    .flat_map(|leaf| leaf.instances().iter().map(TypedValue::as_integer)),
            );
            if clamped {
                warn!(key = target, sum, "aggregated counter exceeds the i64 range, clamped");
            }
            match resolved {
                0 => missing += 1,
                _ => {
                    doc.insert(target, TypedValue::Integer(sum));
                }
            }
        }

        debug!(mapped = doc.len(), missing, "mapped statistics onto canonical keys");
        doc
    }
}
