//! Routes: directional station sequences with their timetables.

use std::collections::HashMap;
use std::fmt;

use crate::domain::{Direction, RouteSchedule, StationAbbr, TripIndex, TripSchedule};
use crate::feed::RouteRecord;

use super::segment::SegmentId;

/// Index of a route within the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub usize);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One direction of a physical line.
///
/// Holds the ordered stations from origin to destination, the parallel
/// list of segments between them (one fewer than stations), and the
/// timetable of every trip that runs on it.
#[derive(Debug, Clone)]
pub struct Route {
    id: RouteId,
    number: u32,
    long_id: String,
    abbr: String,
    name: String,
    color: Option<String>,
    direction: Option<Direction>,
    stations: Vec<StationAbbr>,
    positions: HashMap<StationAbbr, usize>,
    segments: Vec<SegmentId>,
    trips: RouteSchedule,
}

impl Route {
    /// Create a route skeleton; segments are attached by the topology build.
    pub fn new(id: RouteId, record: RouteRecord, trips: RouteSchedule) -> Self {
        let mut positions = HashMap::with_capacity(record.stations.len());
        for (idx, station) in record.stations.iter().enumerate() {
            positions.entry(*station).or_insert(idx);
        }

        Self {
            id,
            number: record.number,
            long_id: record.id,
            abbr: record.abbr,
            name: record.name,
            color: record.color,
            direction: record.direction,
            stations: record.stations,
            positions,
            segments: Vec::new(),
            trips,
        }
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Long identifier, e.g. "ROUTE 1".
    pub fn long_id(&self) -> &str {
        &self.long_id
    }

    pub fn abbr(&self) -> &str {
        &self.abbr
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Stations in travel order.
    pub fn stations(&self) -> &[StationAbbr] {
        &self.stations
    }

    /// Segments in travel order; `segments()[i]` joins `stations()[i]`
    /// and `stations()[i + 1]`.
    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    /// Every trip's timetable, by trip index.
    pub fn trips(&self) -> &RouteSchedule {
        &self.trips
    }

    /// One trip's timetable.
    pub fn trip(&self, index: TripIndex) -> Option<&TripSchedule> {
        self.trips.get(&index)
    }

    /// Position of `station` in the station list.
    pub fn position(&self, station: &StationAbbr) -> Option<usize> {
        self.positions.get(station).copied()
    }

    /// The segments travelled going from `from` to a later station `to`.
    ///
    /// Returns `None` if either station is off the route or `to` does not
    /// come after `from`.
    pub fn segments_between(&self, from: &StationAbbr, to: &StationAbbr) -> Option<&[SegmentId]> {
        let start = self.position(from)?;
        let end = self.position(to)?;
        if start >= end {
            return None;
        }
        self.segments.get(start..end)
    }

    /// The stations a trip serves, in route order.
    ///
    /// This is the trip's own stop list: short-turn and skip-stop trips
    /// leave out stations the route otherwise includes.
    pub fn trip_stops(&self, trip: &TripSchedule) -> Vec<StationAbbr> {
        self.stations
            .iter()
            .enumerate()
            .filter(|(idx, s)| trip.serves(s) && self.positions.get(*s) == Some(idx))
            .map(|(_, s)| *s)
            .collect()
    }

    pub(super) fn push_segment(&mut self, segment: SegmentId) {
        self.segments.push(segment);
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(dir) => write!(f, "{} - {}", self.abbr, dir),
            None => f.write_str(&self.abbr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn abbr(s: &str) -> StationAbbr {
        StationAbbr::parse(s).unwrap()
    }

    fn record(stations: &[&str]) -> RouteRecord {
        RouteRecord {
            number: 1,
            id: "ROUTE 1".into(),
            abbr: "AAAA-DDDD".into(),
            name: "A - D".into(),
            color: Some("YELLOW".into()),
            direction: Some(Direction::South),
            stations: stations.iter().map(|s| abbr(s)).collect(),
        }
    }

    fn trip(stations: &[&str]) -> TripSchedule {
        let base = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        stations
            .iter()
            .enumerate()
            .map(|(i, s)| (abbr(s), base + chrono::Duration::minutes(5 * i as i64)))
            .collect()
    }

    #[test]
    fn positions_and_display() {
        let route = Route::new(RouteId(0), record(&["AAAA", "BBBB", "CCCC"]), RouteSchedule::new());
        assert_eq!(route.position(&abbr("BBBB")), Some(1));
        assert_eq!(route.position(&abbr("ZZZZ")), None);
        assert_eq!(route.to_string(), "AAAA-DDDD - South");
    }

    #[test]
    fn segments_between_uses_route_order() {
        let mut route = Route::new(RouteId(0), record(&["AAAA", "BBBB", "CCCC", "DDDD"]), RouteSchedule::new());
        for i in 0..3 {
            route.push_segment(SegmentId(i));
        }

        assert_eq!(
            route.segments_between(&abbr("BBBB"), &abbr("DDDD")),
            Some(&[SegmentId(1), SegmentId(2)][..])
        );
        assert_eq!(route.segments_between(&abbr("DDDD"), &abbr("BBBB")), None);
        assert_eq!(route.segments_between(&abbr("BBBB"), &abbr("BBBB")), None);
        assert_eq!(route.segments_between(&abbr("AAAA"), &abbr("ZZZZ")), None);
    }

    #[test]
    fn trip_stops_skip_unserved_stations() {
        let route = Route::new(RouteId(0), record(&["AAAA", "BBBB", "CCCC", "DDDD"]), RouteSchedule::new());

        let short_turn = trip(&["AAAA", "BBBB", "DDDD"]);
        assert_eq!(
            route.trip_stops(&short_turn),
            vec![abbr("AAAA"), abbr("BBBB"), abbr("DDDD")]
        );

        // Stations outside the route are ignored
        let with_extra = trip(&["ZZZZ", "CCCC", "DDDD"]);
        assert_eq!(route.trip_stops(&with_extra), vec![abbr("CCCC"), abbr("DDDD")]);
    }

    #[test]
    fn trip_lookup() {
        let mut trips = RouteSchedule::new();
        trips.insert(TripIndex(3), trip(&["AAAA", "BBBB"]));
        let route = Route::new(RouteId(0), record(&["AAAA", "BBBB"]), trips);
        assert!(route.trip(TripIndex(3)).is_some());
        assert!(route.trip(TripIndex(4)).is_none());
        assert_eq!(route.trips().len(), 1);
    }
}
