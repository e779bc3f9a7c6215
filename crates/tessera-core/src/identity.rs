//! # Identity Newtypes
//!
//! Fixed-configuration specializations of [`Token`]. Each is a distinct
//! type: you cannot pass a [`Secret`] where a [`CorrelationId`] is expected.
//!
//! Both validate against [`TokenOptions::IDENTITY`] (32 to 128 characters,
//! at least two distinct characters), so any single-character repetition is
//! rejected while otherwise any composition is accepted.
//!
//! ## UUIDs
//!
//! Both accept a UUID and use its 32-character simple hex form. The nil
//! UUID is rejected by the frequency check, reporting `"0"` as the distinct
//! set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::token::{Token, TokenOptions};

/// Helper macro for the construction and conversion surface shared by the
/// identity newtypes. Deserialization routes through validation so that
/// invalid values are rejected at deserialization time, not silently accepted.
macro_rules! identity_token {
    ($ty:ident) => {
        impl $ty {
            /// Validate `value` against the identity options.
            ///
            /// # Errors
            ///
            /// The first failing token-integrity check.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                Token::with_options(value, &TokenOptions::IDENTITY).map(Self)
            }

            /// Use the 32-character simple hex form of `uuid`.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::OutOfRange`] for the nil UUID.
            pub fn from_uuid(uuid: Uuid) -> Result<Self, ValidationError> {
                Self::new(uuid.simple().to_string())
            }

            /// Generate a fresh random value from a v4 UUID.
            pub fn generate() -> Self {
                // A v4 UUID carries the version nibble `4` and a variant nibble
                // in `8..=b`, so its hex form always has two distinct characters.
                Self(Token::from_trusted(Uuid::new_v4().simple().to_string()))
            }

            /// Consume the value, returning its text.
            pub fn into_inner(self) -> String {
                self.0.into_inner()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $ty {
            type Error = ValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<Uuid> for $ty {
            type Error = ValidationError;

            fn try_from(value: Uuid) -> Result<Self, Self::Error> {
                Self::from_uuid(value)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = Option::<String>::deserialize(deserializer)?;
                Token::from_option(raw, &TokenOptions::IDENTITY)
                    .map(Self)
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

/// A credential secret.
///
/// The value is kept out of `Debug` output so that a secret embedded in a
/// larger structure does not end up in logs. [`Secret::expose`] and the
/// `Display` impl (the canonical text form) give explicit access.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Secret(Token);

identity_token!(Secret);

impl Secret {
    /// Access the secret text.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// The secret as UTF-8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_str().as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Identifier correlating the messages and operations of one logical flow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CorrelationId(Token);

identity_token!(CorrelationId);

impl CorrelationId {
    /// Access the identifier text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
