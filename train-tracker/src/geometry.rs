//! Distance and time-window helpers.
//!
//! Uses the Haversine formula for distances on the Earth's surface.

use chrono::{Duration, NaiveDateTime};
use geo::{HaversineDistance, Point};

/// Great-circle distance in meters between two (latitude, longitude) pairs.
pub fn haversine_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    Point::new(lng1, lat1).haversine_distance(&Point::new(lng2, lat2))
}

/// Convert meters to statute miles.
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / 1_609.344
}

/// Fraction of the window `[start, end]` that has elapsed at `now`.
///
/// Clamped to `[0.0, 1.0]`. A degenerate window counts as complete once
/// `now` reaches its end.
pub fn time_range_progress(start: NaiveDateTime, end: NaiveDateTime, now: NaiveDateTime) -> f64 {
    let length = (end - start).num_milliseconds();
    if length <= 0 {
        return if now >= end { 1.0 } else { 0.0 };
    }
    let elapsed = (now - start).num_milliseconds();
    (elapsed as f64 / length as f64).clamp(0.0, 1.0)
}

/// Time left until `end`, never negative.
pub fn remaining_until(end: NaiveDateTime, now: NaiveDateTime) -> Duration {
    (end - now).max(Duration::zero())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Progress is always within [0, 1]
        #[test]
        fn progress_bounded(start in 0i64..100_000, len in -1_000i64..100_000, now in -10_000i64..200_000) {
            let base = chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
            let s = base + Duration::seconds(start);
            let e = s + Duration::seconds(len);
            let n = base + Duration::seconds(now);
            let p = time_range_progress(s, e, n);
            prop_assert!((0.0..=1.0).contains(&p));
        }

        /// Distance is never negative
        #[test]
        fn distance_non_negative(
            lat1 in -80.0f64..80.0, lng1 in -179.0f64..179.0,
            lat2 in -80.0f64..80.0, lng2 in -179.0f64..179.0
        ) {
            prop_assert!(haversine_meters(lat1, lng1, lat2, lng2) >= 0.0);
        }
    }
}
