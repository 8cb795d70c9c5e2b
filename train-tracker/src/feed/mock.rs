//! In-memory transit feed for testing without API access.
//!
//! Serves a fixed topology and timetable, plus a queue of live snapshots
//! (or failures) handed out one per fetch, as if they were live API
//! responses.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{Direction, LiveDepartures, RouteSchedule, StationAbbr};

use super::convert::{RouteRecord, StationRecord};
use super::error::FeedError;
use super::provider::TransitFeed;

/// Mock feed that serves data from memory.
#[derive(Clone, Default)]
pub struct MockFeed {
    stations: Vec<StationRecord>,
    routes: Vec<RouteRecord>,
    schedules: HashMap<u32, RouteSchedule>,
    /// Snapshots to serve, front first. `None` entries simulate an outage.
    live: Arc<Mutex<VecDeque<Option<LiveDepartures>>>>,
    /// Number of live fetches served so far.
    live_calls: Arc<Mutex<usize>>,
}

impl MockFeed {
    /// Create a mock feed with a topology and no live data queued.
    pub fn new(
        stations: Vec<StationRecord>,
        routes: Vec<RouteRecord>,
        schedules: HashMap<u32, RouteSchedule>,
    ) -> Self {
        Self {
            stations,
            routes,
            schedules,
            ..Self::default()
        }
    }

    /// Queue a snapshot to be returned by the next live fetch.
    pub async fn push_live(&self, snapshot: LiveDepartures) {
        self.live.lock().await.push_back(Some(snapshot));
    }

    /// Queue a failed live fetch.
    pub async fn push_outage(&self) {
        self.live.lock().await.push_back(None);
    }

    /// How many live fetches have been made.
    pub async fn live_calls(&self) -> usize {
        *self.live_calls.lock().await
    }
}

impl TransitFeed for MockFeed {
    async fn fetch_stations(&self) -> Result<Vec<StationRecord>, FeedError> {
        Ok(self.stations.clone())
    }

    async fn fetch_routes(&self) -> Result<Vec<RouteRecord>, FeedError> {
        Ok(self.routes.clone())
    }

    async fn fetch_route_schedule(&self, route_number: u32) -> Result<RouteSchedule, FeedError> {
        self.schedules
            .get(&route_number)
            .cloned()
            .ok_or_else(|| FeedError::ApiError {
                status: 404,
                message: format!("No mock schedule for route {route_number}"),
            })
    }

    async fn fetch_live_departures(
        &self,
        _station: Option<StationAbbr>,
        _direction: Option<Direction>,
    ) -> Result<LiveDepartures, FeedError> {
        *self.live_calls.lock().await += 1;
        match self.live.lock().await.pop_front() {
            Some(Some(snapshot)) => Ok(snapshot),
            Some(None) => Err(FeedError::Timeout),
            None => Ok(LiveDepartures::empty()),
        }
    }
}
