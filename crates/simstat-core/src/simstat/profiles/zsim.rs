#![allow(non_upper_case_globals)]

use super::{DumpFormat, SimulatorKind, SimulatorProfile};
use crate::simstat::core::metric_deriver::Derivation;
use crate::simstat::core::types::{CacheLevel, CanonicalKeys, MappingTable};
use crate::simstat::parsers::hierarchy::IndentPolicy;
use crate::simstat::parsers::line_ingester::Delimiter;

static ck: CanonicalKeys = CanonicalKeys::new();

const L1_ACCESSES: [&str; 7] = ["fhGETS", "fhGETX", "hGETS", "hGETX", "mGETS", "mGETXIM", "mGETXSM"];
const L2_ACCESSES: [&str; 5] = ["hGETS", "hGETX", "mGETS", "mGETXIM", "mGETXSM"];
const MISSES: [&str; 3] = ["mGETS", "mGETXIM", "mGETXSM"];

fn counters<'a>(instance: &'a str, names: &'a [&str]) -> impl Iterator<Item = String> + 'a {
    names.iter().map(move |name| format!("{instance}.{name}"))
}

/// `zsim.out`: one space per level, `root` → group → instance → counter.
pub fn profile() -> SimulatorProfile {
    let mut table = MappingTable::new()
        .map("root.skylake.skylake-0.instrs", ck.INSTRUCTIONS)
        .map("root.skylake.skylake-0.cycles", ck.CYCLES)
        .map("root.contention.domain-0.time", ck.TIME_NS)
        .aggregate(
            ck.HOST_NANOSECONDS,
            ["root.time.init", "root.time.bound", "root.time.weave"],
        );

    for (level, instance, accesses) in [
        (CacheLevel::L1D, "root.l1d.l1d-0", &L1_ACCESSES[..]),
        (CacheLevel::L1I, "root.l1i.l1i-0", &L1_ACCESSES[..]),
        (CacheLevel::L2, "root.l2.l2-0", &L2_ACCESSES[..]),
    ] {
        table = table
            .aggregate(level.accesses(), counters(instance, accesses))
            .aggregate(level.misses(), counters(instance, &MISSES));
    }

    SimulatorProfile {
        kind: SimulatorKind::Zsim,
        format: DumpFormat {
            delimiter: Delimiter::Colon,
            comment_marker: Some('#'),
            header_marker: None,
            indent: Some(IndentPolicy::new(1, 3)),
        },
        table,
        derivations: Derivation::cache_set(),
    }
}
