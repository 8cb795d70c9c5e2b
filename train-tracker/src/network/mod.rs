//! Network topology.
//!
//! Stations, shared north/south segments and directional routes, built
//! once at startup from the feed's topology and timetable. Segment travel
//! times are estimated from the timetable itself.

mod builder;
mod error;
mod estimator;
mod graph;
mod route;
mod segment;
mod station;

#[cfg(test)]
pub(crate) mod fixtures;

pub use builder::build_network;
pub use error::TopologyError;
pub use estimator::{DurationPolicy, estimate_segment_duration};
pub use graph::Network;
pub use route::{Route, RouteId};
pub use segment::{Segment, SegmentId, SegmentKey};
pub use station::Station;
