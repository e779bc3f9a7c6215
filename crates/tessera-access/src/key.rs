//! # Access Keys
//!
//! An [`AccessKey`] binds a [`Secret`] to a UTC validity window. The window
//! is checked once at construction (`valid_from <= expires`) and the key is
//! immutable afterwards.
//!
//! ## Wire Form
//!
//! A JSON object with fields in the order `secret`, `validFrom`, `expires`,
//! `desiredTolerance`. Deserialization re-runs every construction check, so
//! a reversed or incomplete window cannot be materialized from text.

use serde::{Deserialize, Serialize};
use tessera_core::{Clock, ClockSkew, Secret, SystemClock, TimeToLive, UtcInstant, ValidationError};

use crate::options::{AccessKeyOptions, Window};

/// A secret with a validity window and a clock-skew tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AccessKeyRepr")]
pub struct AccessKey {
    pub(crate) secret: Secret,
    pub(crate) valid_from: UtcInstant,
    pub(crate) expires: UtcInstant,
    pub(crate) desired_tolerance: ClockSkew,
}

impl AccessKey {
    /// Create a key from `secret` and a window described by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidState`] if `options` is incomplete
    /// or its window is reversed.
    pub fn new(secret: Secret, options: AccessKeyOptions) -> Result<Self, ValidationError> {
        let Window {
            valid_from,
            expires,
            desired_tolerance,
        } = options.resolve()?;
        Ok(Self {
            secret,
            valid_from,
            expires,
            desired_tolerance,
        })
    }

    /// Issue a key valid from now for `lifespan`.
    ///
    /// Without a lifespan the key gets the default window and never
    /// expires.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] if now plus `lifespan` is not
    /// a representable instant.
    pub fn issue(secret: Secret, lifespan: Option<TimeToLive>) -> Result<Self, ValidationError> {
        Self::issue_with(secret, lifespan, &SystemClock)
    }

    /// Issue a key valid from `clock.now()` for `lifespan`.
    ///
    /// # Errors
    ///
    /// See [`AccessKey::issue`].
    pub fn issue_with(
        secret: Secret,
        lifespan: Option<TimeToLive>,
        clock: &dyn Clock,
    ) -> Result<Self, ValidationError> {
        let Some(lifespan) = lifespan else {
            return Self::new(secret, AccessKeyOptions::default());
        };
        let now = clock.now();
        let expires = now.checked_add(lifespan.into()).ok_or_else(|| {
            tracing::debug!(param = "lifespan", "rejected lifespan past the representable range");
            ValidationError::OutOfRange {
                param: "lifespan",
                actual: lifespan.to_string(),
                message: "the lifespan ends after the largest representable instant".to_owned(),
            }
        })?;
        Self::new(
            secret,
            AccessKeyOptions::default()
                .with_valid_from(now)
                .with_expires(expires),
        )
    }

    /// The secret this key carries.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// First instant at which the key is valid.
    pub fn valid_from(&self) -> UtcInstant {
        self.valid_from
    }

    /// Last instant at which the key is valid, before tolerance.
    pub fn expires(&self) -> UtcInstant {
        self.expires
    }

    /// Grace period past [`expires`](Self::expires).
    pub fn desired_tolerance(&self) -> ClockSkew {
        self.desired_tolerance
    }

    /// The options that reproduce this key's window.
    pub fn options(&self) -> AccessKeyOptions {
        AccessKeyOptions::default()
            .with_valid_from(self.valid_from)
            .with_expires(self.expires)
            .with_desired_tolerance(self.desired_tolerance)
    }
}

/// Unvalidated wire form. Absent or `null` time fields surface as state
/// errors from [`AccessKeyOptions::validate`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessKeyRepr {
    secret: Secret,
    #[serde(default)]
    valid_from: Option<UtcInstant>,
    #[serde(default)]
    expires: Option<UtcInstant>,
    #[serde(default)]
    desired_tolerance: Option<ClockSkew>,
}

impl TryFrom<AccessKeyRepr> for AccessKey {
    type Error = ValidationError;

    fn try_from(repr: AccessKeyRepr) -> Result<Self, Self::Error> {
        let options = AccessKeyOptions {
            valid_from: repr.valid_from,
            expires: repr.expires,
            desired_tolerance: repr.desired_tolerance,
        };
        Self::new(repr.secret, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use tessera_core::{ErrorKind, FixedClock};

    const HEX: &str = "1acb4e4928a64206b22b2392ffd4e605";

    fn secret() -> Secret {
        Secret::new(HEX).unwrap()
    }

    fn instant(s: &str) -> UtcInstant {
        s.parse().unwrap()
    }

    #[test]
    fn new_with_default_options() {
        let key = AccessKey::new(secret(), AccessKeyOptions::default()).unwrap();
        assert_eq!(key.secret(), &secret());
        assert_eq!(key.valid_from(), UtcInstant::min_value());
        assert_eq!(key.expires(), UtcInstant::max_value());
        assert_eq!(key.desired_tolerance(), ClockSkew::default());
    }

    #[test]
    fn new_rejects_reversed_window() {
        let options = AccessKeyOptions::default()
            .with_valid_from(instant("2024-06-01T00:00:00Z"))
            .with_expires(instant("2024-05-01T00:00:00Z"));
        let err = AccessKey::new(secret(), options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn issue_without_lifespan_never_expires() {
        let key = AccessKey::issue(secret(), None).unwrap();
        assert_eq!(key.valid_from(), UtcInstant::min_value());
        assert_eq!(key.expires(), UtcInstant::max_value());
    }

    #[test]
    fn issue_with_lifespan_starts_now() {
        let now = instant("2024-03-17T07:27:30Z");
        let lifespan = TimeToLive::from_hours_at(now, 2.0).unwrap();
        let key = AccessKey::issue_with(secret(), Some(lifespan), &FixedClock::new(now)).unwrap();
        assert_eq!(key.valid_from(), now);
        assert_eq!(key.expires(), instant("2024-03-17T09:27:30Z"));
        assert_eq!(key.desired_tolerance(), ClockSkew::default());
    }

    #[test]
    fn issue_with_zero_lifespan() {
        let now = instant("2024-03-17T07:27:30Z");
        let clock = FixedClock::new(now);
        let key = AccessKey::issue_with(secret(), Some(TimeToLive::zero()), &clock).unwrap();
        assert_eq!(key.valid_from(), key.expires());
    }

    #[test]
    fn issue_rejects_lifespan_past_max() {
        let now = instant("2024-03-17T07:27:30Z");
        let clock = FixedClock::new(now);
        let err = AccessKey::issue_with(secret(), Some(TimeToLive::maximum()), &clock).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn options_round_trip() {
        let options = AccessKeyOptions::default()
            .with_valid_from(instant("2024-01-01T00:00:00Z"))
            .with_expires(instant("2025-01-01T00:00:00Z"))
            .with_desired_tolerance(ClockSkew::new(TimeDelta::minutes(2)).unwrap());
        let key = AccessKey::new(secret(), options).unwrap();
        assert_eq!(key.options(), options);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let key = AccessKey::new(secret(), AccessKeyOptions::default()).unwrap();
        assert!(!format!("{key:?}").contains(HEX));
    }

    #[test]
    fn serialize_field_order() {
        let key = AccessKey::new(secret(), AccessKeyOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            r#"{"secret":"1acb4e4928a64206b22b2392ffd4e605","validFrom":"0001-01-01T00:00:00.0000000Z","expires":"9999-12-31T22:59:59.9999999Z","desiredTolerance":"00:00:30"}"#
        );
    }

    #[test]
    fn deserialize_revalidates_window() {
        let json = r#"{"secret":"1acb4e4928a64206b22b2392ffd4e605","validFrom":"2025-01-01T00:00:00.0000000Z","expires":"2024-01-01T00:00:00.0000000Z","desiredTolerance":"00:00:30"}"#;
        let err = serde_json::from_str::<AccessKey>(json).unwrap_err();
        assert!(err.to_string().contains("valid_from > expires"));
    }

    #[test]
    fn deserialize_rejects_missing_time_field() {
        let json = r#"{"secret":"1acb4e4928a64206b22b2392ffd4e605","validFrom":"2024-01-01T00:00:00.0000000Z","desiredTolerance":"00:00:30"}"#;
        let err = serde_json::from_str::<AccessKey>(json).unwrap_err();
        assert!(err.to_string().contains("expires is none"));
    }

    #[test]
    fn deserialize_rejects_invalid_secret() {
        let json = r#"{"secret":"00000000000000000000000000000000","validFrom":"2024-01-01T00:00:00.0000000Z","expires":"2025-01-01T00:00:00.0000000Z","desiredTolerance":"00:00:30"}"#;
        assert!(serde_json::from_str::<AccessKey>(json).is_err());
    }
}
