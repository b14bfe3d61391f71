pub mod cli;
pub mod errors;
pub mod simstat;

pub use errors::{Result, SimstatError};
pub use simstat::core::assembler::{parse_extra, OutputLayout, StatisticsAssembler};
pub use simstat::core::types::CanonicalDocument;
pub use simstat::core::{normalize_file, normalize_files, normalize_lines};
pub use simstat::parsers::value::TypedValue;
pub use simstat::profiles::{SimulatorKind, SimulatorProfile};
