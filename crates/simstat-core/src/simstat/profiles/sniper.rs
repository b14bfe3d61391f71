#![allow(non_upper_case_globals)]

use super::{DumpFormat, SimulatorKind, SimulatorProfile};
use crate::simstat::core::types::{CacheLevel, CanonicalKeys, MappingTable};
use crate::simstat::parsers::hierarchy::IndentPolicy;
use crate::simstat::parsers::line_ingester::Delimiter;

static ck: CanonicalKeys = CanonicalKeys::new();

/// `sim.out`: already in canonical vocabulary, derived metrics included.
pub fn profile() -> SimulatorProfile {
    let mut table = MappingTable::new();
    for key in [ck.INSTRUCTIONS, ck.CYCLES, ck.IPC, ck.TIME_NS] {
        table = table.map(key, key);
    }
    for level in [CacheLevel::L1I, CacheLevel::L1D, CacheLevel::L2] {
        for key in [level.accesses(), level.misses(), level.miss_rate(), level.mpki()] {
            table = table.map(key, key);
        }
    }

    SimulatorProfile {
        kind: SimulatorKind::Sniper,
        format: DumpFormat {
            delimiter: Delimiter::Pipe,
            comment_marker: None,
            header_marker: Some("Core 0"),
            indent: Some(IndentPolicy::new(2, 2)),
        },
        table,
        derivations: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_mapping_only() {
        let profile = profile();
        assert!(profile
            .table
            .entries()
            .iter()
            .all(|e| e.source == e.canonical));
        assert_eq!(profile.table.entries().len(), 16);
        assert_eq!(profile.table.aggregation_targets().count(), 0);
        assert!(profile.derivations.is_empty());
    }
}
