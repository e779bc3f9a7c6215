//! # Access Key Options
//!
//! Configuration for an [`AccessKey`](crate::AccessKey) window. Every field
//! is optional so that host configuration can be partial: a missing field
//! takes its default, while an explicit `null` leaves the field unset and is
//! reported by [`AccessKeyOptions::validate`].

use serde::{Deserialize, Serialize};
use tessera_core::{ClockSkew, UtcInstant, ValidationError};

/// The validated form of an options value.
pub(crate) struct Window {
    pub(crate) valid_from: UtcInstant,
    pub(crate) expires: UtcInstant,
    pub(crate) desired_tolerance: ClockSkew,
}

/// Validity window and tolerance of an access key.
///
/// Defaults to a window that is always open: from
/// [`UtcInstant::min_value()`] to [`UtcInstant::max_value()`] with the
/// default thirty-second [`ClockSkew`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessKeyOptions {
    /// First instant at which the key is valid.
    pub valid_from: Option<UtcInstant>,
    /// Last instant at which the key is valid, before tolerance.
    pub expires: Option<UtcInstant>,
    /// Grace period past `expires`.
    pub desired_tolerance: Option<ClockSkew>,
}

impl Default for AccessKeyOptions {
    fn default() -> Self {
        Self {
            valid_from: Some(UtcInstant::min_value()),
            expires: Some(UtcInstant::max_value()),
            desired_tolerance: Some(ClockSkew::default()),
        }
    }
}

impl AccessKeyOptions {
    /// Set the start of the window.
    pub fn with_valid_from(mut self, valid_from: UtcInstant) -> Self {
        self.valid_from = Some(valid_from);
        self
    }

    /// Set the end of the window.
    pub fn with_expires(mut self, expires: UtcInstant) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Set the tolerance applied past the end of the window.
    pub fn with_desired_tolerance(mut self, desired_tolerance: ClockSkew) -> Self {
        self.desired_tolerance = Some(desired_tolerance);
        self
    }

    /// Check that every field is set and the window is ordered.
    ///
    /// Checks run in the order `valid_from`, `expires`, `desired_tolerance`,
    /// then ordering; the first failure is reported.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidState`] naming the failing expression.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.resolve().map(|_| ())
    }

    pub(crate) fn resolve(&self) -> Result<Window, ValidationError> {
        let window = self.check().map_err(|err| {
            tracing::debug!(
                type_name = "AccessKeyOptions",
                kind = ?err.kind(),
                "rejected access key options"
            );
            err
        })?;
        Ok(window)
    }

    fn check(&self) -> Result<Window, ValidationError> {
        let valid_from = self.valid_from.ok_or(invalid("valid_from is none"))?;
        let expires = self.expires.ok_or(invalid("expires is none"))?;
        let desired_tolerance = self
            .desired_tolerance
            .ok_or(invalid("desired_tolerance is none"))?;
        if valid_from > expires {
            return Err(invalid("valid_from > expires"));
        }
        Ok(Window {
            valid_from,
            expires,
            desired_tolerance,
        })
    }
}

fn invalid(expression: &'static str) -> ValidationError {
    ValidationError::InvalidState {
        type_name: "AccessKeyOptions",
        expression,
    }
}
