pub mod gem5;
pub mod sniper;
pub mod zsim;

use crate::errors::SimstatError;
use crate::simstat::core::metric_deriver::Derivation;
use crate::simstat::core::types::MappingTable;
use crate::simstat::parsers::hierarchy::IndentPolicy;
use crate::simstat::parsers::line_ingester::Delimiter;
use lazy_static::lazy_static;
use std::fmt;
use std::str::FromStr;

/// Text layout of one simulator's statistics dump.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpFormat {
    pub delimiter: Delimiter,
    /// Everything from this character on is a comment.
    pub comment_marker: Option<char>,
    /// Lines containing this text are column headers, not statistics.
    pub header_marker: Option<&'static str>,
    /// `None` for dumps whose keys are already dotted paths.
    pub indent: Option<IndentPolicy>,
}

/// Everything the engine needs to know about one simulator.
#[derive(Debug, Clone)]
pub struct SimulatorProfile {
    pub kind: SimulatorKind,
    pub format: DumpFormat,
    pub table: MappingTable,
    pub derivations: Vec<Derivation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulatorKind {
    Gem5,
    Zsim,
    Sniper,
}

lazy_static! {
    static ref GEM5: SimulatorProfile = gem5::profile();
    static ref ZSIM: SimulatorProfile = zsim::profile();
    static ref SNIPER: SimulatorProfile = sniper::profile();
}

impl SimulatorKind {
    pub const ALL: [SimulatorKind; 3] = [SimulatorKind::Gem5, SimulatorKind::Zsim, SimulatorKind::Sniper];

    /// Process-wide, read-only profile of this simulator.
    pub fn profile(&self) -> &'static SimulatorProfile {
        match self {
            SimulatorKind::Gem5 => &GEM5,
            SimulatorKind::Zsim => &ZSIM,
            SimulatorKind::Sniper => &SNIPER,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            SimulatorKind::Gem5 => "gem5",
            SimulatorKind::Zsim => "zsim",
            SimulatorKind::Sniper => "sniper",
        }
    }

    /// File name the statistics of a single run are saved under.
    pub fn output_file_name(&self) -> String {
        let title = match self {
            SimulatorKind::Gem5 => "Gem5",
            SimulatorKind::Zsim => "Zsim",
            SimulatorKind::Sniper => "Sniper",
        };
        format!("generatestatsOutput{title}.json")
    }
}

impl fmt::Display for SimulatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimulatorKind {
    type Err = SimstatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SimulatorKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SimstatError::UnknownSimulator(s.to_owned()))
    }
}
