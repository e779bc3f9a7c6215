//! Property tests spanning both crates.

use proptest::prelude::*;
use tessera_access::{AccessKey, AccessKeyOptions};
use tessera_core::temporal::delta_from_ticks;
use tessera_core::{ClockSkew, Secret, UtcInstant};

/// Ticks between `0001-01-01` and `9999-12-31T22:59:59.9999999Z`.
fn instant_ticks() -> impl Strategy<Value = i64> {
    0..=UtcInstant::max_value().ticks()
}

fn skew_ticks() -> impl Strategy<Value = i64> {
    0..=ClockSkew::maximum().ticks()
}

proptest! {
    #[test]
    fn window_membership_matches_bounds(
        a in instant_ticks(),
        b in instant_ticks(),
        probe in instant_ticks(),
        skew in skew_ticks(),
    ) {
        let (from, until) = if a <= b { (a, b) } else { (b, a) };
        let options = AccessKeyOptions::default()
            .with_valid_from(UtcInstant::from_ticks(from).unwrap())
            .with_expires(UtcInstant::from_ticks(until).unwrap())
            .with_desired_tolerance(ClockSkew::new(delta_from_ticks(skew)).unwrap());
        let key = AccessKey::new(Secret::generate(), options).unwrap();

        let upper = until.saturating_add(skew);
        let expected = probe >= from
            && (upper > UtcInstant::absolute_max_value().ticks() || probe <= upper);
        prop_assert_eq!(key.is_valid_at(UtcInstant::from_ticks(probe).unwrap()), expected);
    }

    #[test]
    fn reversed_windows_are_rejected(a in instant_ticks(), b in instant_ticks()) {
        prop_assume!(a != b);
        let (from, until) = if a > b { (a, b) } else { (b, a) };
        let options = AccessKeyOptions::default()
            .with_valid_from(UtcInstant::from_ticks(from).unwrap())
            .with_expires(UtcInstant::from_ticks(until).unwrap());
        prop_assert!(AccessKey::new(Secret::generate(), options).is_err());
    }

    #[test]
    fn access_key_json_round_trip(
        a in instant_ticks(),
        b in instant_ticks(),
        skew in skew_ticks(),
    ) {
        let (from, until) = if a <= b { (a, b) } else { (b, a) };
        let options = AccessKeyOptions::default()
            .with_valid_from(UtcInstant::from_ticks(from).unwrap())
            .with_expires(UtcInstant::from_ticks(until).unwrap())
            .with_desired_tolerance(ClockSkew::new(delta_from_ticks(skew)).unwrap());
        let key = AccessKey::new(Secret::generate(), options).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        let back: AccessKey = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, key);
    }
}
