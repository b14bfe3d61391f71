#![allow(non_upper_case_globals)]

use super::round2;
use super::types::{CacheLevel, CanonicalDocument, CanonicalKeys};
use crate::simstat::parsers::value::TypedValue;
use std::borrow::Cow;

static ck: CanonicalKeys = CanonicalKeys::new();

/// A metric computed from canonical counters already in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Derivation {
    /// `round2(100 * numerator / denominator)`, written as a percentage.
    Rate {
        numerator: Cow<'static, str>,
        denominator: Cow<'static, str>,
        output: Cow<'static, str>,
    },
    /// `round2(1000 * misses / instructions)`
    Mpki {
        instructions: Cow<'static, str>,
        misses: Cow<'static, str>,
        output: Cow<'static, str>,
    },
    /// `round2(instructions / cycles)`, written to `IPC`.
    Ipc {
        instructions: Cow<'static, str>,
        cycles: Cow<'static, str>,
    },
}

impl Derivation {
    /// Miss rate and MPKI for every cache level, then IPC.
    pub fn cache_set() -> Vec<Derivation> {
        let levels = [CacheLevel::L2, CacheLevel::L1D, CacheLevel::L1I];
        let rates = levels.iter().map(|level| Derivation::Rate {
            numerator: level.misses().into(),
            denominator: level.accesses().into(),
            output: level.miss_rate().into(),
        });
        let mpkis = levels.iter().map(|level| Derivation::Mpki {
            instructions: ck.INSTRUCTIONS.into(),
            misses: level.misses().into(),
            output: level.mpki().into(),
        });
        rates
            .chain(mpkis)
            .chain(std::iter::once(Derivation::Ipc {
                instructions: ck.INSTRUCTIONS.into(),
                cycles: ck.CYCLES.into(),
            }))
            .collect()
    }
}

pub trait MetricDerive {
    /// Writes `round2(100 * numerator / denominator)` as a percentage to `output_key`.
    fn derive_rate(&mut self, numerator_key: &str, denominator_key: &str, output_key: &str);

    /// Writes misses per thousand instructions to `output_key`.
    fn derive_mpki(&mut self, instructions_key: &str, misses_key: &str, output_key: &str);

    /// Writes instructions per cycle to `IPC`.
    fn derive_ipc(&mut self, instructions_key: &str, cycles_key: &str);

    /// Runs every derivation; each one only reads counters, so order is irrelevant.
    fn apply(&mut self, derivations: &[Derivation]) {
        for derivation in derivations {
            match derivation {
                Derivation::Rate {
                    numerator,
                    denominator,
                    output,
                } => self.derive_rate(numerator, denominator, output),
                Derivation::Mpki {
                    instructions,
                    misses,
                    output,
                } => self.derive_mpki(instructions, misses, output),
                Derivation::Ipc {
                    instructions,
                    cycles,
                } => self.derive_ipc(instructions, cycles),
            }
        }
    }
}

impl CanonicalDocument {
    /// `numerator / denominator`, or 0 when the denominator is absent or zero.
    /// An absent numerator counts as 0 and a non-finite result collapses to 0.
    fn guarded_ratio(&self, numerator_key: &str, denominator_key: &str) -> f64 {
        let numerator = self.number(numerator_key).unwrap_or(0.0);
        match self.number(denominator_key) {
            Some(denominator) if denominator != 0.0 => {
                let ratio = numerator / denominator;
                match ratio.is_finite() {
                    true => ratio,
                    false => 0.0,
                }
            }
            _ => 0.0,
        }
    }
}

impl MetricDerive for CanonicalDocument {
    fn derive_rate(&mut self, numerator_key: &str, denominator_key: &str, output_key: &str) {
        let rate = round2(100.0 * self.guarded_ratio(numerator_key, denominator_key));
        self.insert(output_key, TypedValue::Percent(rate));
    }

    fn derive_mpki(&mut self, instructions_key: &str, misses_key: &str, output_key: &str) {
        let mpki = round2(1000.0 * self.guarded_ratio(misses_key, instructions_key));
        self.insert(output_key, TypedValue::Float(mpki));
    }

    fn derive_ipc(&mut self, instructions_key: &str, cycles_key: &str) {
        let ipc = round2(self.guarded_ratio(instructions_key, cycles_key));
        self.insert(ck.IPC, TypedValue::Float(ipc));
    }
}
