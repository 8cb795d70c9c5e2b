//! The transit-data collaborator boundary.

use std::future::Future;

use crate::domain::{Direction, LiveDepartures, RouteSchedule, StationAbbr};

use super::convert::{RouteRecord, StationRecord};
use super::error::FeedError;

/// Source of topology, timetable and live departure data.
///
/// The first three methods are used once at startup; the live departure
/// fetch is used once per refresh tick. This abstraction allows the
/// tracker to be tested with in-memory data.
pub trait TransitFeed {
    /// All stations in the network.
    fn fetch_stations(&self) -> impl Future<Output = Result<Vec<StationRecord>, FeedError>> + Send;

    /// All directional routes, each with its ordered station list.
    fn fetch_routes(&self) -> impl Future<Output = Result<Vec<RouteRecord>, FeedError>> + Send;

    /// The full timetable of one route.
    fn fetch_route_schedule(
        &self,
        route_number: u32,
    ) -> impl Future<Output = Result<RouteSchedule, FeedError>> + Send;

    /// Live estimated departures.
    ///
    /// `station` restricts the snapshot to one departing station (all
    /// stations when `None`); `direction` is only honoured together with a
    /// station.
    fn fetch_live_departures(
        &self,
        station: Option<StationAbbr>,
        direction: Option<Direction>,
    ) -> impl Future<Output = Result<LiveDepartures, FeedError>> + Send;
}
