//! The train system: network, trains and the current live snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use futures::future::join_all;
use tracing::{info, warn};

use crate::domain::{Direction, LiveDepartures, RouteSchedule, StationAbbr};
use crate::feed::{FeedError, RouteRecord, StationRecord, TransitFeed};
use crate::network::{DurationPolicy, Network, SegmentId, Station, TopologyError, build_network};
use crate::train::{Train, TrainId, TrainState};

/// Error loading the system at startup.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),
}

/// What happened during one refresh tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// The instant every train was evaluated against
    pub at: NaiveDateTime,
    /// Whether a fresh live snapshot was installed
    pub feed_available: bool,
    /// Trains between their first and last dwell windows
    pub active: usize,
    /// Active trains matched to a live estimate
    pub matched: usize,
}

/// Aggregate root: owns the network, every train and the live snapshot.
///
/// The only mutation entry point is [`TrainSystem::apply_tick`]; all other
/// methods are read-only queries.
#[derive(Debug)]
pub struct TrainSystem {
    network: Network,
    trains: Vec<Train>,
    index: HashMap<TrainId, usize>,
    live: Arc<LiveDepartures>,
    last_tick: Option<TickSummary>,
}

impl TrainSystem {
    /// Build the network and one train per scheduled trip.
    ///
    /// Trips that cannot become trains are logged and skipped.
    pub fn build(
        stations: Vec<StationRecord>,
        routes: Vec<(RouteRecord, RouteSchedule)>,
        policy: DurationPolicy,
    ) -> Result<Self, TopologyError> {
        let stations = stations.into_iter().map(Station::from).collect();
        let network = build_network(stations, routes, policy)?;

        let mut trains = Vec::new();
        for route in network.routes() {
            for (trip, schedule) in route.trips() {
                match Train::new(&network, route, *trip, schedule) {
                    Ok(train) => trains.push(train),
                    Err(e) => warn!(route = %route.long_id(), error = %e, "Skipping trip"),
                }
            }
        }

        let index = trains
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id(), i))
            .collect();
        info!(trains = trains.len(), "Instantiated trains");

        Ok(Self {
            network,
            trains,
            index,
            live: Arc::new(LiveDepartures::empty()),
            last_tick: None,
        })
    }

    /// Fetch the topology and every route's timetable, then build.
    ///
    /// Route timetables are fetched concurrently. A route whose timetable
    /// is malformed is skipped; any other feed failure aborts the load.
    pub async fn load<F: TransitFeed>(feed: &F, policy: DurationPolicy) -> Result<Self, SystemError> {
        let stations = feed.fetch_stations().await?;
        let routes = feed.fetch_routes().await?;
        info!(stations = stations.len(), routes = routes.len(), "Fetched topology");

        let schedules = join_all(routes.iter().map(|r| feed.fetch_route_schedule(r.number))).await;

        let mut with_trips = Vec::with_capacity(routes.len());
        for (route, schedule) in routes.into_iter().zip(schedules) {
            match schedule {
                Ok(trips) => with_trips.push((route, trips)),
                Err(FeedError::Malformed(message)) => {
                    warn!(route = %route.id, %message, "Skipping route with malformed timetable");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self::build(stations, with_trips, policy)?)
    }

    /// Advance every train to `now` using the result of this tick's fetch.
    ///
    /// A successful fetch replaces the live snapshot wholesale. A failed
    /// one keeps the previous snapshot and leaves observed positions of
    /// active trains untouched. Timetable positions are always updated.
    pub fn apply_tick(
        &mut self,
        now: NaiveDateTime,
        fetched: Result<LiveDepartures, FeedError>,
    ) -> TickSummary {
        let feed_available = match fetched {
            Ok(snapshot) => {
                self.live = Arc::new(snapshot);
                true
            }
            Err(e) => {
                warn!(error = %e, "Live feed unavailable, keeping previous snapshot");
                false
            }
        };

        let live = Arc::clone(&self.live);
        let mut active = 0;
        let mut matched = 0;

        for train in &mut self.trains {
            train.update_scheduled_location(now, &self.network);
            if !train.is_scheduled_active() {
                train.follow_schedule();
                continue;
            }
            active += 1;
            if feed_available && train.update_real_location(now, &self.network, &live) {
                matched += 1;
            }
        }

        let summary = TickSummary {
            at: now,
            feed_available,
            active,
            matched,
        };
        info!(
            %now,
            feed_available,
            active,
            matched,
            estimates = live.estimate_count(),
            "Refresh tick"
        );
        self.last_tick = Some(summary);
        summary
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    pub fn train(&self, id: TrainId) -> Option<&Train> {
        self.index.get(&id).map(|i| &self.trains[*i])
    }

    /// Trains between their first and last dwell windows.
    pub fn active_trains(&self) -> impl Iterator<Item = &Train> {
        self.trains.iter().filter(|t| t.is_scheduled_active())
    }

    /// The live snapshot in use.
    pub fn live(&self) -> Arc<LiveDepartures> {
        Arc::clone(&self.live)
    }

    /// Summary of the most recent tick, if any has run.
    pub fn last_tick(&self) -> Option<TickSummary> {
        self.last_tick
    }

    /// Trains observed on a segment, optionally only those heading one way.
    pub fn trains_on_segment(&self, segment: SegmentId, direction: Option<Direction>) -> Vec<&Train> {
        let Some(seg) = self.network.segment(segment) else {
            return Vec::new();
        };
        self.trains
            .iter()
            .filter(|t| match t.real().state {
                TrainState::Transiting { segment: s, to, .. } if s == segment => {
                    direction.is_none() || seg.direction_towards(&to) == direction
                }
                _ => false,
            })
            .collect()
    }

    /// Trains observed dwelling at a station.
    pub fn trains_at_station(&self, station: &StationAbbr) -> Vec<&Train> {
        self.trains
            .iter()
            .filter(|t| t.real().state.station() == Some(*station))
            .collect()
    }
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
