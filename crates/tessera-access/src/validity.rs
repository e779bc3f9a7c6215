//! Evaluation of an access key's validity window.
//!
//! A key is valid at `now` iff `valid_from <= now <= expires + tolerance`.
//! Tolerance widens the window at the expiry side only. When
//! `expires + tolerance` is past the largest representable instant the
//! upper bound is unbounded.

use chrono::TimeDelta;
use tessera_core::{Clock, UtcInstant};

use crate::key::AccessKey;

impl AccessKey {
    /// `expires` plus the desired tolerance, or `None` when that sum is not
    /// representable and the window has no upper bound.
    pub fn effective_expiry(&self) -> Option<UtcInstant> {
        self.expires.checked_add(self.desired_tolerance.into())
    }

    /// Whether the key is valid at `now`, defaulting to the current instant.
    pub fn is_valid(&self, now: Option<UtcInstant>) -> bool {
        self.is_valid_at(now.unwrap_or_else(UtcInstant::now))
    }

    /// Whether the key is valid at the instant reported by `clock`.
    pub fn is_valid_with(&self, clock: &dyn Clock) -> bool {
        self.is_valid_at(clock.now())
    }

    /// Whether the key is valid at `now`.
    pub fn is_valid_at(&self, now: UtcInstant) -> bool {
        let effective_expiry = self.effective_expiry();
        let valid = now >= self.valid_from && effective_expiry.map_or(true, |end| now <= end);
        tracing::trace!(
            valid_from = %self.valid_from,
            effective_expiry = ?effective_expiry.map(|end| end.to_string()),
            now = %now,
            valid,
            "evaluated access key window"
        );
        valid
    }

    /// Time left until the effective expiry, measured from `now`.
    ///
    /// Zero once the key has expired; `None` when the window is unbounded.
    /// A key that is not yet valid reports the full time to its expiry.
    pub fn remaining(&self, now: UtcInstant) -> Option<TimeDelta> {
        let end = self.effective_expiry()?;
        Some(end.duration_since(&now).max(TimeDelta::zero()))
    }
}

#[cfg(test)]
mod tests {
    use tessera_core::temporal::delta_from_ticks;
    use tessera_core::{ClockSkew, FixedClock, Secret};

    use super::*;
    use crate::AccessKeyOptions;

    fn instant(s: &str) -> UtcInstant {
        s.parse().unwrap()
    }

    fn key(from: &str, until: &str, tolerance: ClockSkew) -> AccessKey {
        let options = AccessKeyOptions::default()
            .with_valid_from(instant(from))
            .with_expires(instant(until))
            .with_desired_tolerance(tolerance);
        AccessKey::new(Secret::generate(), options).unwrap()
    }

    fn tick() -> TimeDelta {
        delta_from_ticks(1)
    }

    #[test]
    fn valid_on_closed_interval() {
        let key = key("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z", ClockSkew::zero());
        let from = key.valid_from();
        let until = key.expires();
        assert!(key.is_valid_at(from));
        assert!(key.is_valid_at(until));
        assert!(key.is_valid_at(instant("2024-01-01T12:00:00Z")));
        assert!(!key.is_valid_at(from.checked_sub(tick()).unwrap()));
        assert!(!key.is_valid_at(until.checked_add(tick()).unwrap()));
    }

    #[test]
    fn tolerance_extends_only_the_end() {
        let key = key(
            "2024-01-01T00:00:00Z",
            "2024-01-02T00:00:00Z",
            ClockSkew::default(),
        );
        let end = instant("2024-01-02T00:00:30Z");
        assert_eq!(key.effective_expiry(), Some(end));
        assert!(key.is_valid_at(end));
        assert!(!key.is_valid_at(end.checked_add(tick()).unwrap()));
        assert!(!key.is_valid_at(instant("2023-12-31T23:59:45Z")));
    }

    #[test]
    fn default_window_is_valid_now() {
        let key = AccessKey::new(Secret::generate(), AccessKeyOptions::default()).unwrap();
        assert!(key.is_valid(None));
        assert!(key.is_valid_at(UtcInstant::min_value()));
        assert!(key.is_valid_at(UtcInstant::max_value()));
    }

    #[test]
    fn overflowing_tolerance_is_unbounded() {
        let options = AccessKeyOptions::default()
            .with_expires(UtcInstant::absolute_max_value())
            .with_desired_tolerance(ClockSkew::maximum());
        let key = AccessKey::new(Secret::generate(), options).unwrap();
        assert_eq!(key.effective_expiry(), None);
        assert!(key.is_valid_at(UtcInstant::absolute_max_value()));
        assert_eq!(key.remaining(UtcInstant::absolute_max_value()), None);
    }

    #[test]
    fn clock_injection() {
        let key = key("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z", ClockSkew::zero());
        assert!(key.is_valid_with(&FixedClock::new(instant("2024-01-01T06:00:00Z"))));
        assert!(!key.is_valid_with(&FixedClock::new(instant("2024-01-03T00:00:00Z"))));
        assert!(key.is_valid(Some(instant("2024-01-01T06:00:00Z"))));
    }

    #[test]
    fn remaining_time() {
        let key = key("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z", ClockSkew::default());
        assert_eq!(
            key.remaining(instant("2024-01-01T23:00:00Z")),
            Some(TimeDelta::seconds(3630))
        );
        assert_eq!(
            key.remaining(instant("2024-01-05T00:00:00Z")),
            Some(TimeDelta::zero())
        );
    }
}
