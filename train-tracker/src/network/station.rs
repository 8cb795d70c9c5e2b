//! Stations: the nodes of the network.

use crate::domain::StationAbbr;
use crate::feed::StationRecord;
use crate::geometry::haversine_meters;

/// A station, shared by every route that passes through it.
///
/// Stations are immutable once the network is built. The segments that
/// touch a station are kept in the network's adjacency index rather than
/// on the station itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Unique abbreviation (primary key)
    pub abbr: StationAbbr,
    /// Display name
    pub name: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

impl Station {
    /// Create a station.
    pub fn new(abbr: StationAbbr, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            abbr,
            name: name.into(),
            lat,
            lng,
        }
    }

    /// Great-circle distance to another station in meters.
    pub fn distance_to(&self, other: &Station) -> f64 {
        haversine_meters(self.lat, self.lng, other.lat, other.lng)
    }
}

impl From<StationRecord> for Station {
    fn from(record: StationRecord) -> Self {
        Self::new(record.abbr, record.name, record.lat, record.lng)
    }
}
