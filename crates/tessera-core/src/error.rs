//! # Error Hierarchy
//!
//! Structured validation errors for every Tessera value object, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! The taxonomy is deliberately small. Every construction-time invariant
//! violation maps onto exactly one variant:
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | [`ValidationError::Required`] | a mandatory input was absent |
//! | [`ValidationError::Empty`] | an input was present but empty or blank |
//! | [`ValidationError::OutOfRange`] | a length, frequency or magnitude left its bounds |
//! | [`ValidationError::InvalidState`] | fields of a composite value contradict each other |
//! | [`ValidationError::Malformed`] | canonical text could not be parsed |
//!
//! ## Security Invariant
//!
//! Messages name parameters and bounds, never the validated value itself.
//! The single exception is the character-frequency check, which reports the
//! set of distinct characters so that operators can see why a value was
//! judged too repetitive.

use thiserror::Error;

/// Coarse classification of a [`ValidationError`], for callers that branch
/// on the failure class rather than on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A mandatory input was absent.
    Required,
    /// An input was empty or consisted only of white-space.
    Empty,
    /// A value fell outside its permitted bounds.
    OutOfRange,
    /// A composite value was internally inconsistent.
    InvalidState,
    /// Text did not match the expected canonical form.
    Malformed,
}

/// Validation errors raised while constructing Tessera value objects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A mandatory input was absent.
    #[error("{param} is required")]
    Required {
        /// Name of the missing parameter.
        param: &'static str,
    },

    /// An input was present but empty or blank.
    #[error("{param} cannot be empty or consist only of white-space characters")]
    Empty {
        /// Name of the offending parameter.
        param: &'static str,
    },

    /// A value fell outside its permitted bounds.
    #[error("{message} (parameter '{param}', actual value: {actual})")]
    OutOfRange {
        /// Name of the offending parameter.
        param: &'static str,
        /// The offending value, or the comparison that failed (e.g. `31 < 32`).
        actual: String,
        /// Description of the violated bound.
        message: String,
    },

    /// Fields of a composite value contradict each other.
    #[error("{type_name} is not in a valid state (expression '{expression}')")]
    InvalidState {
        /// The composite type that was rejected.
        type_name: &'static str,
        /// The condition that held and made the state invalid.
        expression: &'static str,
    },

    /// Text did not match the canonical form of the target type.
    #[error("malformed {kind}: {reason}")]
    Malformed {
        /// The type the text was parsed as.
        kind: &'static str,
        /// Why parsing failed.
        reason: String,
    },
}

impl ValidationError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Required { .. } => ErrorKind::Required,
            Self::Empty { .. } => ErrorKind::Empty,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::Malformed { .. } => ErrorKind::Malformed,
        }
    }

    /// The actual value carried by an [`OutOfRange`](Self::OutOfRange) error.
    pub fn actual_value(&self) -> Option<&str> {
        match self {
            Self::OutOfRange { actual, .. } => Some(actual),
            _ => None,
        }
    }

    pub(crate) fn out_of_range(
        param: &'static str,
        actual: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::OutOfRange {
            param,
            actual: actual.into(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            kind,
            reason: reason.into(),
        }
    }
}
