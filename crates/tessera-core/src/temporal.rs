//! # Temporal Types: UTC-Only Instants
//!
//! Defines [`UtcInstant`], a UTC-only timestamp with tick (100 ns)
//! precision, and the [`Clock`] seam through which every time-reading
//! operation in Tessera obtains "now".
//!
//! ## Invariants
//!
//! - An instant is always UTC. Zone-aware inputs are normalized to UTC on
//!   the way in; zone-less inputs are rejected with
//!   [`ValidationError::InvalidState`] rather than guessed at.
//! - Precision is one tick. Sub-tick nanoseconds are truncated at
//!   construction so that the canonical text form round-trips exactly.
//! - The representable range is `0001-01-01T00:00:00.0000000Z` through
//!   `9999-12-31T23:59:59.9999999Z`, the range a four-digit canonical year
//!   can express.
//!
//! ## Canonical Text
//!
//! `YYYY-MM-DDTHH:MM:SS.fffffffZ`: always seven fractional digits, always
//! the `Z` designator (e.g. `2024-03-17T07:27:30.0000000Z`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Number of ticks (100 ns intervals) in one second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;
/// Number of ticks in one minute.
pub const TICKS_PER_MINUTE: i64 = 60 * TICKS_PER_SECOND;
/// Number of ticks in one hour.
pub const TICKS_PER_HOUR: i64 = 60 * TICKS_PER_MINUTE;
/// Number of ticks in one day.
pub const TICKS_PER_DAY: i64 = 24 * TICKS_PER_HOUR;

const NANOS_PER_TICK: u32 = 100;

/// Seconds between `0001-01-01T00:00:00Z` and the Unix epoch.
const EPOCH_OFFSET_SECS: i64 = 62_135_596_800;

/// Unix seconds of `9999-12-31T23:59:59Z`.
const ABSOLUTE_MAX_UNIX_SECS: i64 = 253_402_300_799;

/// Unix seconds of `9999-12-31T22:59:59Z`, one hour below the absolute maximum.
const PORTABLE_MAX_UNIX_SECS: i64 = 253_402_297_199;

const LAST_TICK_NANOS: u32 = 999_999_900;

/// Date-time layouts that carry no zone designator.
const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Convert a `TimeDelta` to whole ticks, truncating toward zero.
///
/// Returns `None` if the tick count does not fit in an `i64`.
pub fn delta_to_ticks(delta: TimeDelta) -> Option<i64> {
    let whole = delta.num_seconds().checked_mul(TICKS_PER_SECOND)?;
    whole.checked_add(i64::from(delta.subsec_nanos() / NANOS_PER_TICK as i32))
}

/// Convert a tick count to a `TimeDelta`.
pub fn delta_from_ticks(ticks: i64) -> TimeDelta {
    TimeDelta::microseconds(ticks / 10) + TimeDelta::nanoseconds((ticks % 10) * 100)
}

/// A UTC-only instant with tick precision.
///
/// # Construction
///
/// - [`UtcInstant::now()`]: current UTC time from [`SystemClock`].
/// - [`UtcInstant::new()`]: from a `DateTime<Utc>`, range-checked.
/// - `TryFrom<DateTime<Tz>>`: any zone-aware timestamp, normalized to UTC.
/// - [`UtcInstant::from_string()`] / `FromStr`: adjust-to-universal parsing.
/// - [`UtcInstant::from_ticks()`]: from ticks since `0001-01-01T00:00:00Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcInstant(DateTime<Utc>);

impl UtcInstant {
    /// The smallest representable instant, `0001-01-01T00:00:00.0000000Z`.
    pub fn min_value() -> Self {
        Self(DateTime::from_timestamp(-EPOCH_OFFSET_SECS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    /// The largest instant that round-trips identically on every host,
    /// `9999-12-31T22:59:59.9999999Z`.
    ///
    /// This sits one hour below [`UtcInstant::absolute_max_value()`]. The
    /// absolute maximum, once pushed through a local-time conversion on some
    /// platforms, lands on a different wall-clock value than on others; the
    /// portable maximum never does. Use it for "never expires" windows.
    pub fn max_value() -> Self {
        Self(
            DateTime::from_timestamp(PORTABLE_MAX_UNIX_SECS, LAST_TICK_NANOS)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    }

    /// The largest representable instant, `9999-12-31T23:59:59.9999999Z`.
    pub fn absolute_max_value() -> Self {
        Self(
            DateTime::from_timestamp(ABSOLUTE_MAX_UNIX_SECS, LAST_TICK_NANOS)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    }

    /// The current UTC instant.
    pub fn now() -> Self {
        SystemClock.now()
    }

    /// Create an instant from a `DateTime<Utc>`, truncating to tick precision.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] if the value lies outside
    /// `0001-01-01` through `9999-12-31`.
    pub fn new(value: DateTime<Utc>) -> Result<Self, ValidationError> {
        let candidate = Self(truncate_to_tick(value));
        if candidate < Self::min_value() || candidate > Self::absolute_max_value() {
            tracing::debug!(param = "value", "rejected instant outside representable range");
            return Err(ValidationError::out_of_range(
                "value",
                candidate.0.to_rfc3339(),
                "instant must lie between 0001-01-01T00:00:00Z and 9999-12-31T23:59:59.9999999Z",
            ));
        }
        Ok(candidate)
    }

    /// Create an instant from ticks (100 ns intervals) since
    /// `0001-01-01T00:00:00Z`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] if `ticks` is negative or
    /// beyond the largest representable instant.
    pub fn from_ticks(ticks: i64) -> Result<Self, ValidationError> {
        let max_ticks = Self::absolute_max_value().ticks();
        if !(0..=max_ticks).contains(&ticks) {
            return Err(ValidationError::out_of_range(
                "ticks",
                ticks.to_string(),
                format!("ticks must lie between 0 and {max_ticks}"),
            ));
        }
        let secs = ticks / TICKS_PER_SECOND - EPOCH_OFFSET_SECS;
        // `ticks % TICKS_PER_SECOND` is in 0..10_000_000, so the nanos fit in u32.
        let nanos = (ticks % TICKS_PER_SECOND) as u32 * NANOS_PER_TICK;
        DateTime::from_timestamp(secs, nanos).map(Self).ok_or_else(|| {
            ValidationError::out_of_range("ticks", ticks.to_string(), "ticks overflowed")
        })
    }

    /// Parse an instant with adjust-to-universal semantics.
    ///
    /// Any explicit zone designator (`Z`, `+hh:mm`, `-hh:mm`) is accepted and
    /// the result is normalized to UTC. Text without a designator is
    /// ambiguous local time and is rejected, never defaulted.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidState`] if the text is a date or date-time
    ///   without a zone designator.
    /// - [`ValidationError::Malformed`] if the text is not a date-time.
    /// - [`ValidationError::OutOfRange`] if the instant is not representable.
    pub fn from_string(text: &str) -> Result<Self, ValidationError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Self::new(dt.with_timezone(&Utc));
        }
        let zone_less = NAIVE_DATE_TIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
            || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok();
        if zone_less {
            tracing::debug!(param = "value", "rejected instant without zone designator");
            return Err(not_utc());
        }
        Err(ValidationError::malformed(
            "instant",
            format!("{text:?} is not an ISO 8601 date-time"),
        ))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Ticks (100 ns intervals) elapsed since `0001-01-01T00:00:00Z`.
    pub fn ticks(&self) -> i64 {
        (self.0.timestamp() + EPOCH_OFFSET_SECS) * TICKS_PER_SECOND
            + i64::from(self.0.timestamp_subsec_nanos() / NANOS_PER_TICK)
    }

    /// Add a duration, returning `None` if the result is not representable.
    pub fn checked_add(&self, delta: TimeDelta) -> Option<Self> {
        self.0
            .checked_add_signed(delta)
            .and_then(|dt| Self::new(dt).ok())
    }

    /// Subtract a duration, returning `None` if the result is not representable.
    pub fn checked_sub(&self, delta: TimeDelta) -> Option<Self> {
        self.0
            .checked_sub_signed(delta)
            .and_then(|dt| Self::new(dt).ok())
    }

    /// Add calendar months (negative values subtract), clamping the day to
    /// the end of the target month. Returns `None` if the result is not
    /// representable.
    pub fn checked_add_months(&self, months: i32) -> Option<Self> {
        let span = Months::new(months.unsigned_abs());
        let shifted = if months >= 0 {
            self.0.checked_add_months(span)
        } else {
            self.0.checked_sub_months(span)
        };
        shifted.and_then(|dt| Self::new(dt).ok())
    }

    /// Signed duration from `earlier` to `self`.
    pub fn duration_since(&self, earlier: &UtcInstant) -> TimeDelta {
        self.0.signed_duration_since(earlier.0)
    }

    /// Render the canonical text form, e.g. `2024-03-17T07:27:30.0000000Z`.
    pub fn to_canonical_string(&self) -> String {
        format!(
            "{}.{:07}Z",
            self.0.format("%Y-%m-%dT%H:%M:%S"),
            self.0.timestamp_subsec_nanos() / NANOS_PER_TICK
        )
    }
}

fn not_utc() -> ValidationError {
    ValidationError::InvalidState {
        type_name: "UtcInstant",
        expression: "timezone designation is not UTC",
    }
}

/// Truncate to tick precision. Leap-second representations fold into the
/// last tick of the preceding second.
fn truncate_to_tick(dt: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = dt.timestamp_subsec_nanos().min(LAST_TICK_NANOS + 99);
    let nanos = nanos - nanos % NANOS_PER_TICK;
    DateTime::from_timestamp(dt.timestamp(), nanos).unwrap_or(dt)
}

impl fmt::Display for UtcInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl FromStr for UtcInstant {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl<Tz: TimeZone> TryFrom<DateTime<Tz>> for UtcInstant {
    type Error = ValidationError;

    fn try_from(value: DateTime<Tz>) -> Result<Self, Self::Error> {
        Self::new(value.with_timezone(&Utc))
    }
}

/// A naive timestamp carries no zone designation and cannot be an instant.
impl TryFrom<NaiveDateTime> for UtcInstant {
    type Error = ValidationError;

    fn try_from(_value: NaiveDateTime) -> Result<Self, Self::Error> {
        Err(not_utc())
    }
}

impl From<UtcInstant> for DateTime<Utc> {
    fn from(value: UtcInstant) -> Self {
        value.0
    }
}

impl Serialize for UtcInstant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for UtcInstant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_string(&raw).map_err(serde::de::Error::custom)
    }
}

/// Source of the current UTC instant.
///
/// Operations that read the wall clock have a variant accepting a `Clock`
/// (or an explicit instant) so callers can substitute a deterministic source.
pub trait Clock: Send + Sync {
    /// The current instant according to this clock.
    fn now(&self) -> UtcInstant;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UtcInstant {
        // The system clock always reports a year between 1 and 9999.
        UtcInstant(truncate_to_tick(Utc::now()))
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(UtcInstant);

impl FixedClock {
    /// Create a clock that always reports `instant`.
    pub fn new(instant: UtcInstant) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> UtcInstant {
        self.0
    }
}
