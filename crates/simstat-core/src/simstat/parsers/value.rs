use serde::{Serialize, Serializer};
use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Numeric branch selected for a raw value before parsing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Float,
    Percent,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Integer => f.write_str("integer"),
            ValueKind::Float => f.write_str("float"),
            ValueKind::Percent => f.write_str("percentage"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error(transparent)]
    Int(#[from] ParseIntError),
    #[error(transparent)]
    Float(#[from] ParseFloatError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{raw:?} is not a valid {expected}: {cause}")]
pub struct ParseValueError {
    pub raw: String,
    pub expected: ValueKind,
    #[source]
    pub cause: NumberError,
}

/// A scalar read from a statistics dump.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Integer(i64),
    Float(f64),
    /// Numeric part of a value written with a trailing `%`.
    Percent(f64),
}

impl TypedValue {
    /// Classifies and parses one trimmed raw value.
    ///
    /// Empty is `Null`, a trailing `%` is `Percent`, anything with a `.` is
    /// `Float` and everything else must be an `Integer`. gem5 writes
    /// non-finite results as `nan`/`inf`, those are accepted as `Float`.
    pub fn coerce(raw: &str) -> Result<Self, ParseValueError> {
        let fail = |expected: ValueKind, cause: NumberError| ParseValueError {
            raw: raw.to_owned(),
            expected,
            cause,
        };

        if raw.is_empty() {
            Ok(TypedValue::Null)
        } else if let Some(number) = raw.strip_suffix('%') {
            number
                .trim()
                .parse::<f64>()
                .map(TypedValue::Percent)
                .map_err(|e| fail(ValueKind::Percent, e.into()))
        } else if raw.contains('.') || is_non_finite(raw) {
            raw.parse::<f64>()
                .map(TypedValue::Float)
                .map_err(|e| fail(ValueKind::Float, e.into()))
        } else {
            raw.parse::<i64>()
                .map(TypedValue::Integer)
                .map_err(|e| fail(ValueKind::Integer, e.into()))
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    /// Numeric view used by the derivations; `Null` has none.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Null => None,
            TypedValue::Integer(v) => Some(*v as f64),
            TypedValue::Float(v) | TypedValue::Percent(v) => Some(*v),
        }
    }

    /// Integer contribution to an aggregated counter. Fractions are truncated
    /// and `Null` or non-finite values contribute nothing.
    #[inline]
    pub fn as_integer(&self) -> i64 {
        match self {
            TypedValue::Integer(v) => *v,
            TypedValue::Float(v) | TypedValue::Percent(v) if v.is_finite() => *v as i64,
            _ => 0,
        }
    }
}

fn is_non_finite(raw: &str) -> bool {
    let unsigned = raw.trim_start_matches(['-', '+']);
    ["nan", "inf", "infinity"]
        .iter()
        .any(|literal| unsigned.eq_ignore_ascii_case(literal))
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Null => f.write_str("null"),
            TypedValue::Integer(v) => write!(f, "{v}"),
            TypedValue::Float(v) => write!(f, "{v}"),
            TypedValue::Percent(v) => write!(f, "{v:.2}%"),
        }
    }
}

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypedValue::Null => serializer.serialize_unit(),
            TypedValue::Integer(v) => serializer.serialize_i64(*v),
            TypedValue::Float(v) => serializer.serialize_f64(*v),
            TypedValue::Percent(_) => serializer.collect_str(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_branch() {
        assert_eq!(TypedValue::coerce("").unwrap(), TypedValue::Null);
        assert_eq!(TypedValue::coerce("42").unwrap(), TypedValue::Integer(42));
        assert_eq!(TypedValue::coerce("-7").unwrap(), TypedValue::Integer(-7));
        assert_eq!(TypedValue::coerce("0.95").unwrap(), TypedValue::Float(0.95));
        assert_eq!(TypedValue::coerce("12.27%").unwrap(), TypedValue::Percent(12.27));
    }

    #[test]
    fn percent_is_distinct_from_float() {
        let percent = TypedValue::coerce("3.25%").unwrap();
        let float = TypedValue::coerce("3.25").unwrap();
        assert_eq!(percent, TypedValue::Percent(3.25));
        assert_eq!(float, TypedValue::Float(3.25));
        assert_ne!(percent, float);
    }

    #[test]
    fn gem5_non_finite_literals_are_floats() {
        assert!(matches!(TypedValue::coerce("nan").unwrap(), TypedValue::Float(v) if v.is_nan()));
        assert_eq!(
            TypedValue::coerce("-inf").unwrap(),
            TypedValue::Float(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn unparsable_values_report_the_selected_branch() {
        let err = TypedValue::coerce("Core 0").unwrap_err();
        assert_eq!(err.expected, ValueKind::Integer);
        assert_eq!(err.raw, "Core 0");

        let err = TypedValue::coerce("1.2.3").unwrap_err();
        assert_eq!(err.expected, ValueKind::Float);

        let err = TypedValue::coerce("n/a%").unwrap_err();
        assert_eq!(err.expected, ValueKind::Percent);
    }

    #[test]
    fn integer_contribution_truncates() {
        assert_eq!(TypedValue::Float(3.9).as_integer(), 3);
        assert_eq!(TypedValue::Float(f64::NAN).as_integer(), 0);
        assert_eq!(TypedValue::Null.as_integer(), 0);
    }

    #[test]
    fn serializes_percent_as_text() {
        let json = serde_json::to_string(&TypedValue::Percent(1.5)).unwrap();
        assert_eq!(json, "\"1.50%\"");
        let json = serde_json::to_string(&TypedValue::Integer(3)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn parsed_percent_is_rendered_with_two_decimals() {
        let value = TypedValue::coerce("1.9%").unwrap();
        assert_eq!(value, TypedValue::Percent(1.9));
        assert_eq!(value.to_string(), "1.90%");
        assert_eq!(TypedValue::coerce("12.346%").unwrap().to_string(), "12.35%");
    }
}
