//! # Bounded Durations
//!
//! Range-checked wrappers over `chrono::TimeDelta`. Each concrete type fixes
//! its own `[min, max]` bounds; a value outside them cannot be constructed.
//!
//! | Type | Bounds |
//! |------|--------|
//! | [`ClockSkew`] | `[0, 4h]` |
//! | [`TimeToLive`] | `[0, i64::MAX ticks]` (`10675199.02:48:05.4775807`) |
//!
//! ## Anchored Factories
//!
//! Named factories (`from_minutes`, `from_years`, ...) do not multiply a
//! fixed unit length. They take an anchor instant, apply the unit-add
//! operation, and subtract the anchor again. For calendar units this makes
//! the result depend on the anchor: one month from January 31st is 29 days
//! in a leap year. Every factory has an `_at` twin that takes the anchor
//! explicitly; the plain form anchors to [`UtcInstant::now()`].
//!
//! ## Canonical Text
//!
//! The constant duration pattern `[-][d.]hh:mm:ss[.fffffff]`: days only when
//! non-zero, the fraction only when non-zero and then always seven digits
//! (`00:00:30`, `365.00:00:00`, `00:00:00.0000001`).

use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::temporal::{
    delta_from_ticks, delta_to_ticks, UtcInstant, TICKS_PER_DAY, TICKS_PER_HOUR,
    TICKS_PER_MINUTE, TICKS_PER_SECOND,
};

/// Behaviour shared by every range-checked duration.
pub trait BoundedDuration: Sized + Copy + Ord {
    /// Human-readable name of the type, used in diagnostics.
    const NAME: &'static str;

    /// Smallest permitted value.
    fn min_value() -> TimeDelta;

    /// Largest permitted value.
    fn max_value() -> TimeDelta;

    /// The wrapped duration.
    fn value(&self) -> TimeDelta;

    /// Whether `value` lies within `[min_value(), max_value()]`.
    fn contains(value: TimeDelta) -> bool {
        Self::min_value() <= value && value <= Self::max_value()
    }
}

/// Render ticks in the constant duration pattern.
pub fn format_ticks(ticks: i64) -> String {
    let magnitude = ticks.unsigned_abs();
    let per_day = TICKS_PER_DAY as u64;
    let per_hour = TICKS_PER_HOUR as u64;
    let per_minute = TICKS_PER_MINUTE as u64;
    let per_second = TICKS_PER_SECOND as u64;

    let days = magnitude / per_day;
    let rest = magnitude % per_day;
    let hours = rest / per_hour;
    let minutes = rest % per_hour / per_minute;
    let seconds = rest % per_minute / per_second;
    let fraction = rest % per_second;

    let mut out = String::with_capacity(26);
    if ticks < 0 {
        out.push('-');
    }
    if days > 0 {
        let _ = write!(out, "{days}.");
    }
    let _ = write!(out, "{hours:02}:{minutes:02}:{seconds:02}");
    if fraction > 0 {
        let _ = write!(out, ".{fraction:07}");
    }
    out
}

/// Parse the constant duration pattern into ticks.
///
/// # Errors
///
/// Returns [`ValidationError::Malformed`] if the text does not match
/// `[-][d.]hh:mm:ss[.fffffff]` or the total does not fit in an `i64`.
pub fn parse_ticks(text: &str) -> Result<i64, ValidationError> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let parts: Vec<&str> = body.split(':').collect();
    let [head, minutes, tail] = parts.as_slice() else {
        return Err(malformed(text, "expected hh:mm:ss"));
    };

    let (days, hours) = match head.split_once('.') {
        Some((d, h)) => (digits(text, d, "days")?, digits(text, h, "hours")?),
        None => (0, digits(text, head, "hours")?),
    };
    let minutes = digits(text, minutes, "minutes")?;
    let (seconds, fraction) = match tail.split_once('.') {
        Some((s, f)) => {
            if f.len() > 7 {
                return Err(malformed(text, "fraction has more than 7 digits"));
            }
            let scale = 10u64.pow(7 - f.len() as u32);
            (digits(text, s, "seconds")?, digits(text, f, "fraction")? * scale)
        }
        None => (digits(text, tail, "seconds")?, 0),
    };

    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(malformed(text, "component out of range"));
    }

    let magnitude = days
        .checked_mul(TICKS_PER_DAY as u64)
        .and_then(|t| t.checked_add(hours * TICKS_PER_HOUR as u64))
        .and_then(|t| t.checked_add(minutes * TICKS_PER_MINUTE as u64))
        .and_then(|t| t.checked_add(seconds * TICKS_PER_SECOND as u64))
        .and_then(|t| t.checked_add(fraction))
        .and_then(|t| i64::try_from(t).ok())
        .ok_or_else(|| malformed(text, "duration overflows 64-bit ticks"))?;

    Ok(if negative { -magnitude } else { magnitude })
}

fn digits(text: &str, field: &str, what: &str) -> Result<u64, ValidationError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(text, format!("{what} must be decimal digits")));
    }
    field
        .parse()
        .map_err(|_| malformed(text, format!("{what} overflows")))
}

fn malformed(text: &str, reason: impl fmt::Display) -> ValidationError {
    ValidationError::malformed("duration", format!("{text:?}: {reason}"))
}

/// Convert a fractional unit count to ticks the way calendar arithmetic does:
/// integral and fractional parts are scaled separately and truncated.
fn fractional_ticks(value: f64, ticks_per_unit: i64) -> Result<i64, ValidationError> {
    let out_of_range = || {
        ValidationError::out_of_range(
            "value",
            value.to_string(),
            "value cannot be represented as a duration",
        )
    };
    if !value.is_finite() {
        return Err(out_of_range());
    }
    let integral = value.trunc();
    let fraction = value - integral;
    if integral.abs() > (i64::MAX / ticks_per_unit) as f64 {
        return Err(out_of_range());
    }
    (integral as i64)
        .checked_mul(ticks_per_unit)
        .and_then(|t| t.checked_add((fraction * ticks_per_unit as f64) as i64))
        .ok_or_else(out_of_range)
}

/// Render a delta for diagnostics: the constant pattern when it is a whole
/// number of ticks, chrono's ISO 8601 form otherwise.
fn describe_delta(delta: TimeDelta) -> String {
    match delta_to_ticks(delta) {
        Some(ticks) if delta_from_ticks(ticks) == delta => format_ticks(ticks),
        _ => delta.to_string(),
    }
}

/// Delta between `anchor` and the instant produced by shifting it.
fn anchored_delta(
    anchor: UtcInstant,
    shifted: Option<UtcInstant>,
    actual: impl fmt::Display,
) -> Result<TimeDelta, ValidationError> {
    shifted
        .map(|end| end.duration_since(&anchor))
        .ok_or_else(|| {
            ValidationError::out_of_range(
                "value",
                actual.to_string(),
                "the anchored result is not a representable instant",
            )
        })
}

/// Defines a bounded duration newtype with its validating constructor,
/// canonical text form and serde support.
macro_rules! bounded_duration {
    (
        $(#[$meta:meta])*
        $ty:ident, below: $below:literal, above: $above:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $ty(TimeDelta);

        impl $ty {
            /// Create a value. The bounds are checked on the exact input; an
            /// in-range value is then truncated to tick precision.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::OutOfRange`] if the value lies
            /// outside this type's bounds.
            pub fn new(value: TimeDelta) -> Result<Self, ValidationError> {
                let min = <Self as BoundedDuration>::min_value();
                let max = <Self as BoundedDuration>::max_value();
                if value < min {
                    tracing::debug!(kind = Self::NAME, "rejected duration below minimum");
                    return Err(ValidationError::out_of_range(
                        "value",
                        format!("{} < {}", describe_delta(value), describe_delta(min)),
                        $below,
                    ));
                }
                if value > max {
                    tracing::debug!(kind = Self::NAME, "rejected duration above maximum");
                    return Err(ValidationError::out_of_range(
                        "value",
                        format!("{} > {}", describe_delta(value), describe_delta(max)),
                        $above,
                    ));
                }
                // Bounds lie within the i64 tick range, so an in-range value converts.
                let Some(ticks) = delta_to_ticks(value) else {
                    tracing::debug!(kind = Self::NAME, "rejected duration beyond tick range");
                    return Err(ValidationError::out_of_range("value", value.to_string(), $above));
                };
                Ok(Self(delta_from_ticks(ticks)))
            }

            /// Whole ticks (100 ns intervals) in this duration.
            pub fn ticks(&self) -> i64 {
                // Bounds are within the i64 tick range, checked at construction.
                delta_to_ticks(self.0).unwrap_or(i64::MAX)
            }

            /// Render the canonical constant-pattern text form.
            pub fn to_canonical_string(&self) -> String {
                format_ticks(self.ticks())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_canonical_string())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(delta_from_ticks(parse_ticks(s)?))
            }
        }

        impl TryFrom<TimeDelta> for $ty {
            type Error = ValidationError;

            fn try_from(value: TimeDelta) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$ty> for TimeDelta {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_canonical_string())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

bounded_duration!(
    /// Tolerated deviation between distributed clocks, at most four hours.
    ///
    /// Widens an acceptance window at its expiry side only. The default is
    /// thirty seconds.
    ClockSkew,
    below: "value for clock skew cannot be negative",
    above: "value for clock skew was exceeded"
);

bounded_duration!(
    /// How long a value remains valid from issuance.
    TimeToLive,
    below: "value for lifespan cannot be negative",
    above: "value for lifespan was exceeded"
);

impl BoundedDuration for ClockSkew {
    const NAME: &'static str = "clock skew";

    fn min_value() -> TimeDelta {
        TimeDelta::zero()
    }

    fn max_value() -> TimeDelta {
        delta_from_ticks(4 * TICKS_PER_HOUR)
    }

    fn value(&self) -> TimeDelta {
        self.0
    }
}

impl BoundedDuration for TimeToLive {
    const NAME: &'static str = "time-to-live";

    fn min_value() -> TimeDelta {
        TimeDelta::zero()
    }

    fn max_value() -> TimeDelta {
        delta_from_ticks(i64::MAX)
    }

    fn value(&self) -> TimeDelta {
        self.0
    }
}

impl Default for ClockSkew {
    fn default() -> Self {
        Self(delta_from_ticks(30 * TICKS_PER_SECOND))
    }
}

impl ClockSkew {
    /// The largest permitted skew.
    pub fn maximum() -> Self {
        Self(<Self as BoundedDuration>::max_value())
    }

    /// No skew at all.
    pub fn zero() -> Self {
        Self(TimeDelta::zero())
    }

    /// A skew of `minutes` minutes, anchored to now.
    pub fn from_minutes(minutes: u8) -> Result<Self, ValidationError> {
        Self::from_minutes_at(UtcInstant::now(), minutes)
    }

    /// A skew of `minutes` minutes, anchored to `anchor`.
    pub fn from_minutes_at(anchor: UtcInstant, minutes: u8) -> Result<Self, ValidationError> {
        let step = delta_from_ticks(i64::from(minutes) * TICKS_PER_MINUTE);
        Self::new(anchored_delta(anchor, anchor.checked_add(step), minutes)?)
    }

    /// A skew of `seconds` seconds, anchored to now.
    pub fn from_seconds(seconds: u16) -> Result<Self, ValidationError> {
        Self::from_seconds_at(UtcInstant::now(), seconds)
    }

    /// A skew of `seconds` seconds, anchored to `anchor`.
    pub fn from_seconds_at(anchor: UtcInstant, seconds: u16) -> Result<Self, ValidationError> {
        let step = delta_from_ticks(i64::from(seconds) * TICKS_PER_SECOND);
        Self::new(anchored_delta(anchor, anchor.checked_add(step), seconds)?)
    }
}

impl TimeToLive {
    /// The largest permitted lifespan.
    pub fn maximum() -> Self {
        Self(<Self as BoundedDuration>::max_value())
    }

    /// A zero lifespan.
    pub fn zero() -> Self {
        Self(TimeDelta::zero())
    }

    /// A lifespan of `minutes` minutes, anchored to now.
    pub fn from_minutes(minutes: f64) -> Result<Self, ValidationError> {
        Self::from_minutes_at(UtcInstant::now(), minutes)
    }

    /// A lifespan of `minutes` minutes, anchored to `anchor`.
    pub fn from_minutes_at(anchor: UtcInstant, minutes: f64) -> Result<Self, ValidationError> {
        Self::fixed_unit(anchor, minutes, TICKS_PER_MINUTE)
    }

    /// A lifespan of `hours` hours, anchored to now.
    pub fn from_hours(hours: f64) -> Result<Self, ValidationError> {
        Self::from_hours_at(UtcInstant::now(), hours)
    }

    /// A lifespan of `hours` hours, anchored to `anchor`.
    pub fn from_hours_at(anchor: UtcInstant, hours: f64) -> Result<Self, ValidationError> {
        Self::fixed_unit(anchor, hours, TICKS_PER_HOUR)
    }

    /// A lifespan of `days` days, anchored to now.
    pub fn from_days(days: f64) -> Result<Self, ValidationError> {
        Self::from_days_at(UtcInstant::now(), days)
    }

    /// A lifespan of `days` days, anchored to `anchor`.
    pub fn from_days_at(anchor: UtcInstant, days: f64) -> Result<Self, ValidationError> {
        Self::fixed_unit(anchor, days, TICKS_PER_DAY)
    }

    /// A lifespan of `months` calendar months, anchored to now.
    pub fn from_months(months: i32) -> Result<Self, ValidationError> {
        Self::from_months_at(UtcInstant::now(), months)
    }

    /// A lifespan of `months` calendar months, anchored to `anchor`.
    ///
    /// The length depends on the anchor: the day of month is clamped to the
    /// end of the target month.
    pub fn from_months_at(anchor: UtcInstant, months: i32) -> Result<Self, ValidationError> {
        Self::new(anchored_delta(anchor, anchor.checked_add_months(months), months)?)
    }

    /// A lifespan of `years` calendar years, anchored to now.
    pub fn from_years(years: i32) -> Result<Self, ValidationError> {
        Self::from_years_at(UtcInstant::now(), years)
    }

    /// A lifespan of `years` calendar years, anchored to `anchor`.
    ///
    /// One year from a date in a leap year's January is 366 days; from a
    /// February 29th it ends on February 28th.
    pub fn from_years_at(anchor: UtcInstant, years: i32) -> Result<Self, ValidationError> {
        let shifted = years
            .checked_mul(12)
            .and_then(|months| anchor.checked_add_months(months));
        Self::new(anchored_delta(anchor, shifted, years)?)
    }

    fn fixed_unit(
        anchor: UtcInstant,
        value: f64,
        ticks_per_unit: i64,
    ) -> Result<Self, ValidationError> {
        let step = delta_from_ticks(fractional_ticks(value, ticks_per_unit)?);
        Self::new(anchored_delta(anchor, anchor.checked_add(step), value)?)
    }
}
