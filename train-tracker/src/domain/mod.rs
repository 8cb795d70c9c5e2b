//! Domain types for the train tracker.
//!
//! This module contains the validated value types shared by the feed
//! adapter, the network topology and the position estimator. All types
//! enforce their invariants at construction time, so code that receives
//! them can trust their validity.

mod direction;
mod live;
mod schedule;
mod station;
mod time;

pub use direction::{Direction, InvalidDirection};
pub use live::{LiveDepartures, LiveEstimate};
pub use schedule::{RouteSchedule, TripIndex, TripSchedule};
pub use station::{InvalidStationAbbr, StationAbbr};
pub use time::{
    DWELL_SECS, MATCH_TOLERANCE_SECS, TimeError, dwell_time, match_tolerance, parse_clock,
    parse_feed_date, parse_service_time, resolve_service_time, schedule_context,
    service_day_cutoff,
};
