//! Segments: track edges between adjacent stations.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::Duration;

use crate::domain::{Direction, StationAbbr};
use crate::geometry::meters_to_miles;

use super::error::TopologyError;
use super::station::Station;

/// Index of a segment within the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub usize);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical identity of a segment: its (north, south) station pair.
///
/// Two routes that walk the same pair of stations in opposite directions
/// produce the same key, so they share one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentKey {
    pub north: StationAbbr,
    pub south: StationAbbr,
}

impl SegmentKey {
    /// Orient a pair of stations by latitude.
    ///
    /// The station with the greater latitude is the north end. Equal
    /// latitudes leave the orientation undefined and are rejected.
    pub fn orient(a: &Station, b: &Station) -> Result<Self, TopologyError> {
        if a.lat > b.lat {
            Ok(Self {
                north: a.abbr,
                south: b.abbr,
            })
        } else if b.lat > a.lat {
            Ok(Self {
                north: b.abbr,
                south: a.abbr,
            })
        } else {
            Err(TopologyError::EqualLatitude(a.abbr, b.abbr))
        }
    }
}

/// A track edge between two adjacent stations, canonicalized north/south.
///
/// Invariant: the north station's latitude is strictly greater than the
/// south station's. Equality and hashing use only the station pair.
#[derive(Debug, Clone)]
pub struct Segment {
    id: SegmentId,
    key: SegmentKey,
    duration: Duration,
    length_m: f64,
}

impl Segment {
    /// Create a segment between two stations, in either order.
    pub fn new(
        id: SegmentId,
        a: &Station,
        b: &Station,
        duration: Duration,
    ) -> Result<Self, TopologyError> {
        let key = SegmentKey::orient(a, b)?;
        Ok(Self {
            id,
            key,
            duration,
            length_m: a.distance_to(b),
        })
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn key(&self) -> SegmentKey {
        self.key
    }

    /// The northern endpoint.
    pub fn north(&self) -> StationAbbr {
        self.key.north
    }

    /// The southern endpoint.
    pub fn south(&self) -> StationAbbr {
        self.key.south
    }

    /// Estimated time to traverse the segment, excluding dwell.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Great-circle length in meters.
    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    /// Great-circle length in miles.
    pub fn length_miles(&self) -> f64 {
        meters_to_miles(self.length_m)
    }

    /// Direction of travel when moving along this segment towards `station`.
    pub fn direction_towards(&self, station: &StationAbbr) -> Option<Direction> {
        if self.key.north == *station {
            Some(Direction::North)
        } else if self.key.south == *station {
            Some(Direction::South)
        } else {
            None
        }
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N {} - S {}", self.key.north, self.key.south)
    }
}
