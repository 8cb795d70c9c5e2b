//! Segment duration estimation from timetable data.
//!
//! A segment's travel time is the mean, over every trip that serves both
//! endpoints, of the gap between the two departures less the dwell at
//! the later station.

use chrono::{Duration, NaiveDateTime};
use tracing::trace;

use crate::domain::{StationAbbr, TripSchedule, dwell_time};

use super::error::TopologyError;

/// What to do when a segment has no qualifying timetable samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationPolicy {
    /// Fail the topology build with `InsufficientScheduleData`.
    #[default]
    Strict,
    /// Use a fixed duration instead.
    Fallback(Duration),
}

/// One travel-time sample from a trip serving both `a` and `b`.
///
/// Departures on different calendar days are not compared.
fn sample(a: NaiveDateTime, b: NaiveDateTime) -> Option<Duration> {
    if a.date() != b.date() {
        return None;
    }
    let gap = if a > b { a - b } else { b - a };
    let delta = gap - dwell_time();
    Some(delta.max(Duration::zero()))
}

/// Estimate the travel time between two adjacent stations.
///
/// Scans every trip given; the result is independent of their order.
pub fn estimate_segment_duration<'a>(
    trips: impl IntoIterator<Item = &'a TripSchedule>,
    a: StationAbbr,
    b: StationAbbr,
) -> Result<Duration, TopologyError> {
    let mut total_ms: i64 = 0;
    let mut count: i64 = 0;

    for trip in trips {
        let (Some(dep_a), Some(dep_b)) = (trip.departure(&a), trip.departure(&b)) else {
            continue;
        };
        if let Some(delta) = sample(dep_a, dep_b) {
            total_ms += delta.num_milliseconds();
            count += 1;
        }
    }

    if count == 0 {
        return Err(TopologyError::InsufficientScheduleData(a, b));
    }

    trace!(%a, %b, samples = count, "Estimated segment duration");
    Ok(Duration::milliseconds(total_ms / count))
}
