//! Shared test network: a four-station north/south line.
//!
//! Stations AAAA, BBBB, CCCC, DDDD run from north to south. Route 1 runs
//! southbound with a full trip (0) and a short-turn trip (1) that skips
//! CCCC; route 2 runs northbound with one trip (0).

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{Direction, RouteSchedule, StationAbbr, TripIndex, TripSchedule};
use crate::feed::{MockFeed, RouteRecord, StationRecord};

use super::builder::build_network;
use super::estimator::DurationPolicy;
use super::graph::Network;
use super::station::Station;

pub(crate) fn abbr(s: &str) -> StationAbbr {
    StationAbbr::parse(s).unwrap()
}

pub(crate) fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub(crate) fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    date().and_hms_opt(h, m, s).unwrap()
}

pub(crate) fn trip(stops: &[(&str, NaiveDateTime)]) -> TripSchedule {
    stops.iter().map(|(s, t)| (abbr(s), *t)).collect()
}

pub(crate) fn station_records() -> Vec<StationRecord> {
    [
        ("AAAA", "Alpha", 38.0),
        ("BBBB", "Bravo", 37.9),
        ("CCCC", "Charlie", 37.8),
        ("DDDD", "Delta", 37.7),
    ]
    .into_iter()
    .map(|(a, name, lat)| StationRecord {
        abbr: abbr(a),
        name: name.to_string(),
        lat,
        lng: -122.2,
    })
    .collect()
}

pub(crate) fn stations() -> Vec<Station> {
    station_records().into_iter().map(Station::from).collect()
}

pub(crate) fn route_record(number: u32, stations: &[&str], direction: Direction) -> RouteRecord {
    RouteRecord {
        number,
        id: format!("ROUTE {number}"),
        abbr: format!("{}-{}", stations[0], stations[stations.len() - 1]),
        name: format!("{} - {}", stations[0], stations[stations.len() - 1]),
        color: Some("YELLOW".to_string()),
        direction: Some(direction),
        stations: stations.iter().map(|s| abbr(s)).collect(),
    }
}

pub(crate) fn southbound() -> (RouteRecord, RouteSchedule) {
    let record = route_record(1, &["AAAA", "BBBB", "CCCC", "DDDD"], Direction::South);
    let mut trips = RouteSchedule::new();
    trips.insert(
        TripIndex(0),
        trip(&[
            ("AAAA", at(8, 0, 0)),
            ("BBBB", at(8, 5, 0)),
            ("CCCC", at(8, 11, 0)),
            ("DDDD", at(8, 16, 0)),
        ]),
    );
    trips.insert(
        TripIndex(1),
        trip(&[
            ("AAAA", at(8, 30, 0)),
            ("BBBB", at(8, 35, 0)),
            ("DDDD", at(8, 46, 0)),
        ]),
    );
    (record, trips)
}

pub(crate) fn northbound() -> (RouteRecord, RouteSchedule) {
    let record = route_record(2, &["DDDD", "CCCC", "BBBB", "AAAA"], Direction::North);
    let mut trips = RouteSchedule::new();
    trips.insert(
        TripIndex(0),
        trip(&[
            ("DDDD", at(9, 0, 0)),
            ("CCCC", at(9, 5, 0)),
            ("BBBB", at(9, 11, 0)),
            ("AAAA", at(9, 16, 0)),
        ]),
    );
    (record, trips)
}

/// Both routes built with a strict duration policy.
///
/// Segment durations: AAAA-BBBB 270s, BBBB-CCCC 330s, CCCC-DDDD 270s.
pub(crate) fn line_network() -> Network {
    build_network(stations(), vec![southbound(), northbound()], DurationPolicy::Strict).unwrap()
}

pub(crate) fn mock_feed() -> MockFeed {
    let (south, south_trips) = southbound();
    let (north, north_trips) = northbound();
    let schedules = HashMap::from([(1, south_trips), (2, north_trips)]);
    MockFeed::new(station_records(), vec![south, north], schedules)
}
