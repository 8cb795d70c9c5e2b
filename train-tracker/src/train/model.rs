//! The train entity: one scheduled trip on one route.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;

use crate::domain::{Direction, StationAbbr, TripIndex, TripSchedule, dwell_time};
use crate::network::{Network, Route, RouteId, SegmentId};

use super::location::{Position, TrainState};

/// Identity of a train: route plus trip index within that route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainId {
    pub route: RouteId,
    pub trip: TripIndex,
}

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.route, self.trip)
    }
}

/// Why a trip could not become a train.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrainError {
    #[error("trip {0} serves fewer than two stations")]
    TooFewStops(TrainId),

    #[error("trip {id} departs {station} before the previous stop")]
    NonMonotonic { id: TrainId, station: StationAbbr },

    #[error("trip {id} has no track between {from} and {to}")]
    MissingPath {
        id: TrainId,
        from: StationAbbr,
        to: StationAbbr,
    },
}

/// Track between two consecutive stops of a trip.
///
/// `stations` runs from the departing stop to the arriving stop inclusive,
/// so `path[i]` joins `stations[i]` and `stations[i + 1]`. Stops that are
/// adjacent on the route have a single-segment leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Leg {
    pub(super) stations: Vec<StationAbbr>,
    pub(super) path: Vec<SegmentId>,
}

/// One scheduled trip, with a timetable position and an observed position.
///
/// The stop list is the route's stations filtered to those the trip
/// serves, so next/previous lookups follow the trip rather than the route.
#[derive(Debug, Clone)]
pub struct Train {
    pub(super) id: TrainId,
    pub(super) route_number: u32,
    pub(super) stops: Vec<StationAbbr>,
    pub(super) departures: Vec<NaiveDateTime>,
    pub(super) stop_positions: HashMap<StationAbbr, usize>,
    pub(super) legs: Vec<Leg>,
    pub(super) car_length: Option<u8>,
    pub(super) scheduled: Position,
    pub(super) real: Position,
}

impl Train {
    /// Build a train for one trip of `route`.
    ///
    /// Fails if the trip serves fewer than two of the route's stations,
    /// if its departures go backwards along the route, or if the network
    /// has no segments between two of its stops.
    pub fn new(
        network: &Network,
        route: &Route,
        trip: TripIndex,
        schedule: &TripSchedule,
    ) -> Result<Self, TrainError> {
        let id = TrainId {
            route: route.id(),
            trip,
        };

        let mut stops = Vec::new();
        let mut departures = Vec::new();
        for station in route.trip_stops(schedule) {
            if let Some(dep) = schedule.departure(&station) {
                stops.push(station);
                departures.push(dep);
            }
        }
        if stops.len() < 2 {
            return Err(TrainError::TooFewStops(id));
        }
        for (i, pair) in departures.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(TrainError::NonMonotonic {
                    id,
                    station: stops[i + 1],
                });
            }
        }

        let mut legs = Vec::with_capacity(stops.len() - 1);
        for pair in stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let missing = || TrainError::MissingPath { id, from, to };
            let path = route.segments_between(&from, &to).ok_or_else(missing)?;
            let (Some(start), Some(end)) = (route.position(&from), route.position(&to)) else {
                return Err(missing());
            };
            if path.is_empty() || path.iter().any(|s| network.segment(*s).is_none()) {
                return Err(missing());
            }
            legs.push(Leg {
                stations: route.stations()[start..=end].to_vec(),
                path: path.to_vec(),
            });
        }

        let stop_positions = stops.iter().enumerate().map(|(i, s)| (*s, i)).collect();
        let initial = Position::not_started(stops[0], chrono::Duration::zero());

        Ok(Self {
            id,
            route_number: route.number(),
            stops,
            departures,
            stop_positions,
            legs,
            car_length: None,
            scheduled: initial.clone(),
            real: initial,
        })
    }

    pub fn id(&self) -> TrainId {
        self.id
    }

    /// Public route number this train runs on.
    pub fn route_number(&self) -> u32 {
        self.route_number
    }

    /// Stations the trip serves, in order.
    pub fn stops(&self) -> &[StationAbbr] {
        &self.stops
    }

    pub fn origin(&self) -> StationAbbr {
        self.stops[0]
    }

    pub fn destination(&self) -> StationAbbr {
        self.stops[self.stops.len() - 1]
    }

    pub fn origin_departure(&self) -> NaiveDateTime {
        self.departures[0]
    }

    pub fn destination_departure(&self) -> NaiveDateTime {
        self.departures[self.departures.len() - 1]
    }

    /// Scheduled departure from one of the trip's stops.
    pub fn scheduled_departure(&self, station: &StationAbbr) -> Option<NaiveDateTime> {
        self.stop_index(station).map(|i| self.departures[i])
    }

    /// Stop after `station` on this trip, if any.
    pub fn next_stop(&self, station: &StationAbbr) -> Option<StationAbbr> {
        let idx = self.stop_index(station)?;
        self.stops.get(idx + 1).copied()
    }

    /// Stop before `station` on this trip, if any.
    pub fn previous_stop(&self, station: &StationAbbr) -> Option<StationAbbr> {
        let idx = self.stop_index(station)?;
        idx.checked_sub(1).map(|i| self.stops[i])
    }

    /// The trip stops either side of `state`: the last one served and the
    /// next one due. A train dwelling at a stop has both neighbours.
    pub fn stops_around(&self, state: &TrainState) -> (Option<StationAbbr>, Option<StationAbbr>) {
        match *state {
            TrainState::NotStarted { origin } => (None, Some(origin)),
            TrainState::Waiting { station } => (self.previous_stop(&station), self.next_stop(&station)),
            TrainState::Transiting { segment, .. } => {
                match self.legs.iter().position(|leg| leg.path.contains(&segment)) {
                    Some(i) => (self.stops.get(i).copied(), self.stops.get(i + 1).copied()),
                    None => (None, None),
                }
            }
            TrainState::Ended { destination } => (Some(destination), None),
        }
    }

    /// Number of cars, once learnt from the live feed.
    pub fn car_length(&self) -> Option<u8> {
        self.car_length
    }

    /// Position according to the timetable.
    pub fn scheduled(&self) -> &Position {
        &self.scheduled
    }

    /// Position according to the live feed, or the timetable when the
    /// feed had nothing matching.
    pub fn real(&self) -> &Position {
        &self.real
    }

    /// Make the observed position follow the timetable.
    pub fn follow_schedule(&mut self) {
        self.real = self.scheduled.clone();
    }

    pub fn is_scheduled_active(&self) -> bool {
        self.scheduled.state.is_active()
    }

    pub fn is_not_started(&self) -> bool {
        matches!(self.scheduled.state, TrainState::NotStarted { .. })
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.scheduled.state, TrainState::Ended { .. })
    }

    /// Direction of travel leaving the trip stop at `idx`.
    pub(super) fn direction_leaving(&self, network: &Network, idx: usize) -> Option<Direction> {
        let leg = self.legs.get(idx)?;
        let first = network.segment(*leg.path.first()?)?;
        first.direction_towards(leg.stations.get(1)?)
    }

    /// First stop whose dwell window has not yet opened at `now`.
    pub(super) fn upcoming_stop_index(&self, now: NaiveDateTime) -> Option<usize> {
        let dwell = dwell_time();
        self.departures.iter().position(|dep| *dep - dwell > now)
    }

    /// The last stop whose scheduled departure is at or before `now`.
    pub(super) fn departed_stop_index(&self, now: NaiveDateTime) -> Option<usize> {
        self.departures.iter().rposition(|dep| *dep <= now)
    }

    pub(super) fn stop_index(&self, station: &StationAbbr) -> Option<usize> {
        self.stop_positions.get(station).copied()
    }

    /// Position along the leg leaving stop `idx`, `fraction` of the way
    /// through it in time.
    pub(super) fn leg_state(&self, network: &Network, idx: usize, fraction: f64) -> Option<(TrainState, f64)> {
        let leg = self.legs.get(idx)?;
        let (seg_idx, progress) = network.position_on_path(&leg.path, fraction)?;
        let state = TrainState::Transiting {
            segment: leg.path[seg_idx],
            from: leg.stations[seg_idx],
            to: *leg.stations.get(seg_idx + 1)?,
        };
        Some((state, progress))
    }
}
