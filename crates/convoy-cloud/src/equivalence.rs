//! Desired-versus-remote field comparison
//!
//! Each entity type builds an ordered list of [`FieldCheck`]s; [`compare`]
//! walks it and reports the first field that differs. A desired value that is
//! empty or zero means "don't care" and is skipped. Floats compare within
//! [`FLOAT_TOLERANCE`].
//!
//! The rule is asymmetric: only the desired side decides what is skipped, so
//! it must not be used to compare two remote records.

use std::fmt;

/// Absolute tolerance for float fields (provider-side rounding).
pub const FLOAT_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    /// Empty text and zero numbers.
    pub fn is_unset(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Integer(i) => *i == 0,
            FieldValue::Float(f) => *f == 0.0,
        }
    }

    fn matches(&self, remote: &FieldValue) -> bool {
        match (self, remote) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => (a - b).abs() <= FLOAT_TOLERANCE,
            (FieldValue::Integer(a), FieldValue::Float(b))
            | (FieldValue::Float(b), FieldValue::Integer(a)) => {
                (*a as f64 - b).abs() <= FLOAT_TOLERANCE
            }
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
        }
    }
}

/// One field of the desired projection against the remote record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCheck {
    pub field: &'static str,
    pub desired: FieldValue,
    pub remote: FieldValue,
}

impl FieldCheck {
    pub fn text(field: &'static str, desired: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            field,
            desired: FieldValue::Text(desired.into()),
            remote: FieldValue::Text(remote.into()),
        }
    }

    pub fn integer(field: &'static str, desired: i64, remote: i64) -> Self {
        Self {
            field,
            desired: FieldValue::Integer(desired),
            remote: FieldValue::Integer(remote),
        }
    }

    pub fn float(field: &'static str, desired: f64, remote: f64) -> Self {
        Self {
            field,
            desired: FieldValue::Float(desired),
            remote: FieldValue::Float(remote),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Equivalence {
    Equivalent,
    Differs {
        field: &'static str,
        desired: FieldValue,
        remote: FieldValue,
    },
}

impl Equivalence {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, Equivalence::Equivalent)
    }
}

impl fmt::Display for Equivalence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Equivalence::Equivalent => write!(f, "equivalent"),
            Equivalence::Differs {
                field,
                desired,
                remote,
            } => write!(f, "{} differs (want {}, have {})", field, desired, remote),
        }
    }
}

pub fn compare(checks: &[FieldCheck]) -> Equivalence {
    checks
        .iter()
        .filter(|check| !check.desired.is_unset())
        .find(|check| !check.desired.matches(&check.remote))
        .map(|check| Equivalence::Differs {
            field: check.field,
            desired: check.desired.clone(),
            remote: check.remote.clone(),
        })
        .unwrap_or(Equivalence::Equivalent)
}
