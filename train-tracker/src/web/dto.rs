//! Data transfer objects for web requests and responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Direction;
use crate::network::{Network, Route, Segment, Station};
use crate::system::TickSummary;
use crate::train::{Position, Train, TrainState};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn format_timestamp(t: NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Query for the train list.
#[derive(Debug, Default, Deserialize)]
pub struct TrainsQuery {
    /// Only trains between their first and last dwell windows
    pub active: Option<bool>,
}

/// Filter for the route list.
#[derive(Debug, Default, Deserialize)]
pub struct RoutesQuery {
    /// Long route identifier, e.g. "ROUTE 7"
    pub id: Option<String>,
}

/// Filter for the segment list: the segment joining two stations.
#[derive(Debug, Default, Deserialize)]
pub struct SegmentsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Query for transfer stations between two routes.
#[derive(Debug, Deserialize)]
pub struct TransfersQuery {
    /// Route number boarded at `origin`
    pub origin_route: u32,
    pub origin: String,
    /// Route number ridden to `dest`
    pub dest_route: u32,
    pub dest: String,
}

/// Query for trains on a segment.
#[derive(Debug, Default, Deserialize)]
pub struct SegmentTrainsQuery {
    /// "north" or "south"
    pub direction: Option<String>,
}

/// Service status.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub stations: usize,
    pub routes: usize,
    pub segments: usize,
    pub track_miles: f64,
    pub trains: usize,
    pub active_trains: usize,
    pub last_tick: Option<TickResult>,
}

/// Outcome of the latest refresh tick.
#[derive(Debug, Serialize)]
pub struct TickResult {
    pub at: String,
    pub feed_available: bool,
    pub active: usize,
    pub matched: usize,
}

impl TickResult {
    pub fn from_summary(summary: &TickSummary) -> Self {
        Self {
            at: format_timestamp(summary.at),
            feed_available: summary.feed_available,
            active: summary.active,
            matched: summary.matched,
        }
    }
}

/// A station.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub abbr: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Segments touching this station
    pub segments: Vec<usize>,
}

impl StationResult {
    pub fn from_station(station: &Station, network: &Network) -> Self {
        Self {
            abbr: station.abbr.to_string(),
            name: station.name.clone(),
            lat: station.lat,
            lng: station.lng,
            segments: network
                .segments_at(&station.abbr)
                .map(|s| s.id().0)
                .collect(),
        }
    }
}

/// A directional route.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    pub number: u32,
    pub id: String,
    pub abbr: String,
    pub name: String,
    pub color: Option<String>,
    pub direction: Option<Direction>,
    pub stations: Vec<String>,
    pub segments: Vec<usize>,
    pub trips: usize,
}

impl RouteResult {
    pub fn from_route(route: &Route) -> Self {
        Self {
            number: route.number(),
            id: route.long_id().to_string(),
            abbr: route.abbr().to_string(),
            name: route.name().to_string(),
            color: route.color().map(str::to_string),
            direction: route.direction(),
            stations: route.stations().iter().map(|s| s.to_string()).collect(),
            segments: route.segments().iter().map(|s| s.0).collect(),
            trips: route.trips().len(),
        }
    }
}

/// A segment between two adjacent stations.
#[derive(Debug, Serialize)]
pub struct SegmentResult {
    pub id: usize,
    pub north: String,
    pub south: String,
    pub duration_secs: i64,
    pub length_miles: f64,
}

impl SegmentResult {
    pub fn from_segment(segment: &Segment) -> Self {
        Self {
            id: segment.id().0,
            north: segment.north().to_string(),
            south: segment.south().to_string(),
            duration_secs: segment.duration().num_seconds(),
            length_miles: segment.length_miles(),
        }
    }
}

/// A train's position.
#[derive(Debug, Serialize)]
pub struct PositionResult {
    /// One of "not_started", "waiting", "transiting", "ended"
    pub state: &'static str,
    /// Station for not_started, waiting and ended
    pub station: Option<String>,
    /// Segment while transiting
    pub segment: Option<usize>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub progress: f64,
    pub remaining_secs: i64,
}

impl PositionResult {
    pub fn from_position(position: &Position) -> Self {
        let (station, segment, from, to) = match position.state {
            TrainState::NotStarted { origin } => (Some(origin), None, None, None),
            TrainState::Waiting { station } => (Some(station), None, None, None),
            TrainState::Transiting { segment, from, to } => (None, Some(segment.0), Some(from), Some(to)),
            TrainState::Ended { destination } => (Some(destination), None, None, None),
        };
        Self {
            state: position.state.label(),
            station: station.map(|s| s.to_string()),
            segment,
            from: from.map(|s| s.to_string()),
            to: to.map(|s| s.to_string()),
            progress: position.progress,
            remaining_secs: position.remaining.num_seconds(),
        }
    }
}

/// A scheduled call at a station.
#[derive(Debug, PartialEq, Serialize)]
pub struct CallResult {
    pub station: String,
    pub departs: Option<String>,
}

/// A train with both of its positions.
#[derive(Debug, Serialize)]
pub struct TrainResult {
    pub route: u32,
    pub trip: u32,
    /// One of "not_started", "active", "ended", by the timetable
    pub status: &'static str,
    pub origin: String,
    pub destination: String,
    pub departs: String,
    pub arrives: String,
    pub calls: Vec<CallResult>,
    /// Last stop served, by the observed position
    pub previous_stop: Option<String>,
    /// Next stop due, by the observed position
    pub next_stop: Option<String>,
    pub car_length: Option<u8>,
    pub scheduled: PositionResult,
    pub real: PositionResult,
}

impl TrainResult {
    pub fn from_train(train: &Train) -> Self {
        let status = if train.is_not_started() {
            "not_started"
        } else if train.is_ended() {
            "ended"
        } else {
            "active"
        };
        let (previous, next) = train.stops_around(&train.real().state);

        Self {
            route: train.route_number(),
            trip: train.id().trip.0,
            status,
            origin: train.origin().to_string(),
            destination: train.destination().to_string(),
            departs: format_timestamp(train.origin_departure()),
            arrives: format_timestamp(train.destination_departure()),
            calls: train
                .stops()
                .iter()
                .map(|s| CallResult {
                    station: s.to_string(),
                    departs: train.scheduled_departure(s).map(format_timestamp),
                })
                .collect(),
            previous_stop: previous.map(|s| s.to_string()),
            next_stop: next.map(|s| s.to_string()),
            car_length: train.car_length(),
            scheduled: PositionResult::from_position(train.scheduled()),
            real: PositionResult::from_position(train.real()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StationAbbr, TripIndex};
    use crate::network::RouteId;
    use crate::network::fixtures::*;
    use chrono::Duration;

    #[test]
    fn position_result_shapes() {
        let abbr = StationAbbr::parse("MONT").unwrap();
        let waiting = PositionResult::from_position(&Position::within(
            TrainState::Waiting { station: abbr },
            at(8, 0, 0),
            at(8, 0, 30),
            at(8, 0, 10),
        ));
        assert_eq!(waiting.state, "waiting");
        assert_eq!(waiting.station.as_deref(), Some("MONT"));
        assert_eq!(waiting.segment, None);
        assert_eq!(waiting.remaining_secs, 20);

        let ended = PositionResult::from_position(&Position::ended(abbr));
        assert_eq!(ended.state, "ended");
        assert_eq!(ended.progress, 1.0);

        let json = serde_json::to_value(&waiting).unwrap();
        assert_eq!(json["state"], "waiting");
        assert_eq!(json["from"], serde_json::Value::Null);
    }

    #[test]
    fn train_result_from_train() {
        let network = line_network();
        let route = network.route(RouteId(0)).unwrap();
        let schedule = route.trip(TripIndex(0)).unwrap();
        let mut train = Train::new(&network, route, TripIndex(0), schedule).unwrap();
        train.update_scheduled_location(at(8, 6, 0), &network);
        train.follow_schedule();

        let result = TrainResult::from_train(&train);
        assert_eq!(result.route, 1);
        assert_eq!(result.trip, 0);
        assert_eq!(result.departs, "2024-03-15T08:00:00");
        assert_eq!(result.status, "active");
        let stations: Vec<&str> = result.calls.iter().map(|c| c.station.as_str()).collect();
        assert_eq!(stations, vec!["AAAA", "BBBB", "CCCC", "DDDD"]);
        assert_eq!(result.calls[2].departs.as_deref(), Some("2024-03-15T08:11:00"));
        assert_eq!(result.previous_stop.as_deref(), Some("BBBB"));
        assert_eq!(result.next_stop.as_deref(), Some("CCCC"));
        assert_eq!(result.scheduled.state, "transiting");
        assert_eq!(result.scheduled.from.as_deref(), Some("BBBB"));
        assert_eq!(result.real.to.as_deref(), Some("CCCC"));
    }

    #[test]
    fn route_and_segment_results() {
        let network = line_network();
        let route = RouteResult::from_route(network.route(RouteId(1)).unwrap());
        assert_eq!(route.id, "ROUTE 2");
        assert_eq!(route.direction, Some(Direction::North));
        assert_eq!(route.segments.len(), 3);
        assert_eq!(route.trips, 1);
        assert_eq!(serde_json::to_value(&route).unwrap()["direction"], "north");

        let segment = SegmentResult::from_segment(&network.segments()[0]);
        assert_eq!(segment.north, "AAAA");
        assert_eq!(segment.south, "BBBB");
        assert_eq!(segment.duration_secs, Duration::seconds(270).num_seconds());

        let station = network.station(&abbr("BBBB")).unwrap();
        let result = StationResult::from_station(station, &network);
        assert_eq!(result.segments.len(), 2);
    }
}
