use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::simstat::parsers::value::ParseValueError;

pub type Result<T> = std::result::Result<T, SimstatError>;

/// Failures surfaced while turning a raw statistics dump into a canonical document.
#[derive(Debug, Error)]
pub enum SimstatError {
    #[error("failed to read statistics file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: key {key:?} carries an unusable value: {source}")]
    Value {
        key: String,
        line: usize,
        #[source]
        source: ParseValueError,
    },
    #[error("invalid extra scalar {0:?}, expected `\"Key\" : value`")]
    InvalidExtra(String),
    #[error("canonical key {0:?} is both a value and a group in the nested layout")]
    LayoutConflict(String),
    #[error("unknown simulator {0:?}, expected one of gem5, zsim, sniper")]
    UnknownSimulator(String),
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
