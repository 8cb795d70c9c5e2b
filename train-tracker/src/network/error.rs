//! Topology build error types.
//!
//! These errors come from building the station/segment/route graph. They
//! are distinct from feed I/O errors.

use crate::domain::StationAbbr;

/// Errors raised while building the network topology.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// Two adjacent stations share a latitude, so the segment between them
    /// has no north/south orientation. Fatal for the whole build.
    #[error("stations {0} and {1} share a latitude; segment orientation is undefined")]
    EqualLatitude(StationAbbr, StationAbbr),

    /// No trip in any timetable serves both stations on the same day.
    #[error("no usable timetable samples for segment {0}-{1}")]
    InsufficientScheduleData(StationAbbr, StationAbbr),

    /// A station was referenced that is not part of the network.
    #[error("unknown station {0}")]
    UnknownStation(StationAbbr),
}
