#![allow(non_upper_case_globals)]

use super::{DumpFormat, SimulatorKind, SimulatorProfile};
use crate::simstat::core::metric_deriver::Derivation;
use crate::simstat::core::types::{CacheLevel, CanonicalKeys, MappingTable};
use crate::simstat::parsers::line_ingester::Delimiter;

static ck: CanonicalKeys = CanonicalKeys::new();

const RUBY: &str = "board.cache_hierarchy.ruby_system";
const NANOSECONDS_IN_SECOND: f64 = 1e9;

/// `stats.txt`: flat dotted keys, values in seconds.
pub fn profile() -> SimulatorProfile {
    let mut table = MappingTable::new()
        .map("simInsts", ck.INSTRUCTIONS)
        .map("board.processor.start0.core.numCycles", ck.CYCLES)
        .map("simSeconds", ck.TIME_NS)
        .map("hostSeconds", ck.HOST_NANOSECONDS);

    for (level, cache) in [(CacheLevel::L1I, "L1Icache"), (CacheLevel::L1D, "L1Dcache")] {
        let controllers = |counter: &'static str| {
            (0..2).map(move |i| format!("{RUBY}.l1_controllers{i}.{cache}.{counter}"))
        };
        table = table
            .aggregate(level.accesses(), controllers("m_demand_accesses"))
            .aggregate(level.misses(), controllers("m_demand_misses"));
    }
    table = table
        .aggregate(
            CacheLevel::L2.accesses(),
            [format!("{RUBY}.l2_controllers.L2cache.m_demand_accesses")],
        )
        .aggregate(
            CacheLevel::L2.misses(),
            [format!("{RUBY}.l2_controllers.L2cache.m_demand_misses")],
        )
        .rescale(ck.TIME_NS, NANOSECONDS_IN_SECOND)
        .rescale(ck.HOST_NANOSECONDS, NANOSECONDS_IN_SECOND);

    SimulatorProfile {
        kind: SimulatorKind::Gem5,
        format: DumpFormat {
            delimiter: Delimiter::Whitespace,
            comment_marker: Some('#'),
            header_marker: None,
            indent: None,
        },
        table,
        derivations: Derivation::cache_set(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_l1_controllers_feed_one_counter() {
        let table = profile().table;
        let sources: Vec<&str> = table.sources_for(CacheLevel::L1D.misses()).collect();
        assert_eq!(
            sources,
            vec![
                "board.cache_hierarchy.ruby_system.l1_controllers0.L1Dcache.m_demand_misses",
                "board.cache_hierarchy.ruby_system.l1_controllers1.L1Dcache.m_demand_misses",
            ]
        );
        assert_eq!(table.aggregation_targets().count(), 6);
        assert_eq!(table.rescales().count(), 2);
    }
}
