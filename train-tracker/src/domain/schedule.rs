//! Timetable types: one trip's scheduled departures per station.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDateTime;

use super::StationAbbr;

/// Index of a trip within its route's timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripIndex(pub u32);

impl fmt::Display for TripIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scheduled departure instants for every station one trip serves.
///
/// Stations the trip does not serve are simply absent. Order is not
/// stored here; it comes from the route the trip runs on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripSchedule {
    departures: HashMap<StationAbbr, NaiveDateTime>,
}

impl TripSchedule {
    /// Create an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the departure from `station`, replacing any earlier entry.
    pub fn insert(&mut self, station: StationAbbr, departure: NaiveDateTime) {
        self.departures.insert(station, departure);
    }

    /// Scheduled departure from `station`, if the trip serves it.
    pub fn departure(&self, station: &StationAbbr) -> Option<NaiveDateTime> {
        self.departures.get(station).copied()
    }

    /// Whether the trip serves `station`.
    pub fn serves(&self, station: &StationAbbr) -> bool {
        self.departures.contains_key(station)
    }

    /// Number of stations served.
    pub fn len(&self) -> usize {
        self.departures.len()
    }

    /// Whether the trip serves no station at all.
    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }

    /// Iterate over (station, departure) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&StationAbbr, &NaiveDateTime)> {
        self.departures.iter()
    }
}

impl FromIterator<(StationAbbr, NaiveDateTime)> for TripSchedule {
    fn from_iter<I: IntoIterator<Item = (StationAbbr, NaiveDateTime)>>(iter: I) -> Self {
        Self {
            departures: iter.into_iter().collect(),
        }
    }
}

/// A route's full timetable: trip index to that trip's schedule.
pub type RouteSchedule = BTreeMap<TripIndex, TripSchedule>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn lookup_served_and_unserved() {
        let a = StationAbbr::parse("MONT").unwrap();
        let b = StationAbbr::parse("POWL").unwrap();
        let schedule: TripSchedule = [(a, at(8, 0))].into_iter().collect();

        assert!(schedule.serves(&a));
        assert!(!schedule.serves(&b));
        assert_eq!(schedule.departure(&a), Some(at(8, 0)));
        assert_eq!(schedule.departure(&b), None);
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn insert_replaces() {
        let a = StationAbbr::parse("MONT").unwrap();
        let mut schedule = TripSchedule::new();
        assert!(schedule.is_empty());
        schedule.insert(a, at(8, 0));
        schedule.insert(a, at(8, 1));
        assert_eq!(schedule.departure(&a), Some(at(8, 1)));
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn trip_index_orders_numerically() {
        let mut schedule = RouteSchedule::new();
        schedule.insert(TripIndex(10), TripSchedule::new());
        schedule.insert(TripIndex(2), TripSchedule::new());
        let keys: Vec<_> = schedule.keys().copied().collect();
        assert_eq!(keys, vec![TripIndex(2), TripIndex(10)]);
        assert_eq!(TripIndex(7).to_string(), "7");
    }
}
