pub mod assembler;
pub mod mapper;
pub mod metric_deriver;
pub mod types;

use crate::errors::Result;
use crate::simstat::parsers::stats_file::{read_lines, ParsedStats};
use crate::simstat::profiles::SimulatorProfile;
use mapper::CanonicalMapper;
use metric_deriver::MetricDerive;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;
use types::CanonicalDocument;

/// Rounds to two decimals, never returning `-0.0`.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0 + 0.0
}

/// Parses, maps and derives one in-memory dump.
pub fn normalize_lines<I, S>(profile: &SimulatorProfile, lines: I) -> Result<CanonicalDocument>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stats = ParsedStats::parse(&profile.format, lines)?;
    let mut doc = stats.map(&profile.table);
    doc.apply(&profile.derivations);
    Ok(doc)
}

pub fn normalize_file(profile: &SimulatorProfile, path: &Path) -> Result<CanonicalDocument> {
    let lines = read_lines(path)?;
    let doc = normalize_lines(profile, &lines)?;
    info!(
        simulator = %profile.kind,
        path = %path.display(),
        lines = lines.len(),
        keys = doc.len(),
        "normalized statistics"
    );
    Ok(doc)
}

/// Normalizes independent dumps in parallel; one failure does not affect the others.
pub fn normalize_files(
    profile: &SimulatorProfile,
    paths: &[PathBuf],
) -> Vec<Result<CanonicalDocument>> {
    paths
        .par_iter()
        .map(|path| normalize_file(profile, path))
        .collect()
}
