//! # Tokens: Length- and Entropy-Validated Opaque Strings
//!
//! A [`Token`] is an opaque string identity that passed the token-integrity
//! checks once, at construction, and is immutable afterwards.
//!
//! ## Validation Order
//!
//! Checks run in a fixed order so that the reported error is deterministic:
//!
//! 1. absent → [`ValidationError::Required`]
//! 2. empty or only white-space → [`ValidationError::Empty`]
//! 3. shorter than the minimum length → [`ValidationError::OutOfRange`]
//! 4. longer than the maximum length → [`ValidationError::OutOfRange`]
//! 5. white-space anywhere inside → [`ValidationError::OutOfRange`]
//! 6. too few distinct characters → [`ValidationError::OutOfRange`]
//!
//! Length is measured in Unicode scalar values and white-space is the
//! Unicode `White_Space` property. A length bound of `0` disables that side.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Parameters of the token-integrity checks.
///
/// An immutable configuration value. Missing fields take their defaults when
/// deserialized, so partial host configuration is accepted.
///
/// The character-frequency bound never exceeds the minimum length: a value
/// configured higher is lowered to the minimum length when read. With a
/// minimum length of `0` the frequency check is therefore disabled too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenOptions {
    minimum_length: u8,
    maximum_length: u8,
    maximum_character_frequency: u8,
}

impl TokenOptions {
    /// Default minimum length.
    pub const DEFAULT_MINIMUM_LENGTH: u8 = 32;
    /// Default maximum length.
    pub const DEFAULT_MAXIMUM_LENGTH: u8 = 128;
    /// Default character-frequency bound.
    pub const DEFAULT_MAXIMUM_CHARACTER_FREQUENCY: u8 = 4;

    /// The fixed parameters of secrets and correlation identifiers:
    /// 32 to 128 characters, more than one distinct character.
    pub const IDENTITY: TokenOptions = TokenOptions::new().with_maximum_character_frequency(1);

    /// Options with the default bounds (32, 128, 4).
    pub const fn new() -> Self {
        Self {
            minimum_length: Self::DEFAULT_MINIMUM_LENGTH,
            maximum_length: Self::DEFAULT_MAXIMUM_LENGTH,
            maximum_character_frequency: Self::DEFAULT_MAXIMUM_CHARACTER_FREQUENCY,
        }
    }

    /// Set the minimum length; `0` disables the lower bound.
    pub const fn with_minimum_length(self, minimum_length: u8) -> Self {
        Self {
            minimum_length,
            ..self
        }
    }

    /// Set the maximum length; `0` disables the upper bound.
    pub const fn with_maximum_length(self, maximum_length: u8) -> Self {
        Self {
            maximum_length,
            ..self
        }
    }

    /// Set the character-frequency bound; `0` disables the check.
    pub const fn with_maximum_character_frequency(self, maximum_character_frequency: u8) -> Self {
        Self {
            maximum_character_frequency,
            ..self
        }
    }

    /// Minimum number of characters.
    pub const fn minimum_length(&self) -> u8 {
        self.minimum_length
    }

    /// Maximum number of characters.
    pub const fn maximum_length(&self) -> u8 {
        self.maximum_length
    }

    /// Character-frequency bound, clamped to [`minimum_length`](Self::minimum_length).
    pub const fn maximum_character_frequency(&self) -> u8 {
        if self.maximum_character_frequency > self.minimum_length {
            self.minimum_length
        } else {
            self.maximum_character_frequency
        }
    }
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the token-integrity checks against `value`.
///
/// # Errors
///
/// The first failing check, in the order listed in the module docs.
pub fn validate_token(value: Option<&str>, options: &TokenOptions) -> Result<(), ValidationError> {
    check(value, options).map_err(|err| {
        tracing::debug!(param = "value", kind = ?err.kind(), "rejected token");
        err
    })
}

fn check(value: Option<&str>, options: &TokenOptions) -> Result<(), ValidationError> {
    let value = value.ok_or(ValidationError::Required { param: "value" })?;
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { param: "value" });
    }

    let length = value.chars().count();
    let minimum = usize::from(options.minimum_length());
    if minimum != 0 && length < minimum {
        return Err(ValidationError::out_of_range(
            "value",
            format!("{length} < {minimum}"),
            format!("the minimum length of value was not met; {minimum} characters are required"),
        ));
    }
    let maximum = usize::from(options.maximum_length());
    if maximum != 0 && length > maximum {
        return Err(ValidationError::out_of_range(
            "value",
            format!("{length} > {maximum}"),
            format!("the maximum length of value was exceeded; {maximum} characters are allowed"),
        ));
    }

    if let Some(position) = value.chars().position(char::is_whitespace) {
        return Err(ValidationError::out_of_range(
            "value",
            format!("white-space at position {position}"),
            "white-space characters are not allowed inside value",
        ));
    }

    let frequency = usize::from(options.maximum_character_frequency());
    if frequency > 0 {
        let distinct: BTreeSet<char> = value.chars().collect();
        if distinct.len() <= frequency {
            let set = distinct
                .iter()
                .map(char::to_string)
                .collect::<Vec<_>>()
                .join(",");
            return Err(ValidationError::out_of_range(
                "value",
                set,
                format!(
                    "value suggests too high a frequency of repeated characters; \
                     at least {frequency} distinct characters are required"
                ),
            ));
        }
    }

    Ok(())
}

/// A validated opaque string identity.
///
/// Serializes as the raw string. Deserialization applies the default
/// [`TokenOptions`]; a JSON `null` is a [`ValidationError::Required`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Validate `value` against the default options.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_options(value, &TokenOptions::default())
    }

    /// Validate `value` against `options`.
    pub fn with_options(
        value: impl Into<String>,
        options: &TokenOptions,
    ) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_token(Some(&value), options)?;
        Ok(Self(value))
    }

    /// Validate a possibly absent value against `options`.
    pub fn from_option(
        value: Option<String>,
        options: &TokenOptions,
    ) -> Result<Self, ValidationError> {
        validate_token(value.as_deref(), options)?;
        // Present, because validation rejects `None`.
        Ok(Self(value.unwrap_or_default()))
    }

    /// Wrap a value the caller has already proven valid.
    pub(crate) fn from_trusted(value: String) -> Self {
        Self(value)
    }

    /// Access the token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the token, returning its text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Token {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Token {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Token {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Self::from_option(raw, &TokenOptions::default()).map_err(serde::de::Error::custom)
    }
}
