//! The built network: stations, shared segments and routes.

use std::collections::{BTreeMap, HashMap};

use chrono::Duration;

use crate::domain::StationAbbr;

use super::route::{Route, RouteId};
use super::segment::{Segment, SegmentId, SegmentKey};
use super::station::Station;

/// The static rail network.
///
/// Immutable once built. Segments and routes are stored in arenas and
/// referenced by index; the per-station adjacency index lists the segments
/// touching each station.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub(super) stations: BTreeMap<StationAbbr, Station>,
    pub(super) segments: Vec<Segment>,
    pub(super) segment_index: HashMap<SegmentKey, SegmentId>,
    pub(super) adjacency: HashMap<StationAbbr, Vec<SegmentId>>,
    pub(super) routes: Vec<Route>,
}

impl Network {
    /// Look up a station by abbreviation.
    pub fn station(&self, abbr: &StationAbbr) -> Option<&Station> {
        self.stations.get(abbr)
    }

    /// All stations, ordered by abbreviation.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The segment joining two stations, in either order.
    pub fn segment_between(&self, a: &StationAbbr, b: &StationAbbr) -> Option<&Segment> {
        let sa = self.station(a)?;
        let sb = self.station(b)?;
        let key = SegmentKey::orient(sa, sb).ok()?;
        let id = self.segment_index.get(&key)?;
        self.segment(*id)
    }

    /// Segments touching a station.
    pub fn segments_at(&self, abbr: &StationAbbr) -> impl Iterator<Item = &Segment> {
        self.adjacency
            .get(abbr)
            .into_iter()
            .flatten()
            .filter_map(|id| self.segment(*id))
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id.0)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Look up a route by its long identifier, e.g. "ROUTE 7".
    pub fn route_by_long_id(&self, long_id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.long_id() == long_id)
    }

    /// Total estimated travel time along a path of segments.
    pub fn path_duration(&self, path: &[SegmentId]) -> Duration {
        path.iter()
            .filter_map(|id| self.segment(*id))
            .fold(Duration::zero(), |acc, s| acc + s.duration())
    }

    /// Locate a point `fraction` of the way along a path of segments.
    ///
    /// Time is distributed over the segments in proportion to their
    /// estimated durations. Returns the index into `path` and the progress
    /// within that segment. A path whose segments all have zero duration
    /// is split evenly.
    pub fn position_on_path(&self, path: &[SegmentId], fraction: f64) -> Option<(usize, f64)> {
        if path.is_empty() {
            return None;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        let weights: Vec<f64> = path
            .iter()
            .map(|id| {
                self.segment(*id)
                    .map(|s| s.duration().num_milliseconds() as f64)
                    .unwrap_or(0.0)
            })
            .collect();
        let total: f64 = weights.iter().sum();

        if total <= 0.0 {
            let scaled = fraction * path.len() as f64;
            let idx = (scaled.floor() as usize).min(path.len() - 1);
            return Some((idx, (scaled - idx as f64).clamp(0.0, 1.0)));
        }

        let target = fraction * total;
        let mut start = 0.0;
        for (idx, weight) in weights.iter().enumerate() {
            let end = start + weight;
            if target < end && *weight > 0.0 {
                return Some((idx, ((target - start) / weight).clamp(0.0, 1.0)));
            }
            start = end;
        }
        Some((path.len() - 1, 1.0))
    }

    /// Sum of all segment lengths in meters.
    pub fn total_length_m(&self) -> f64 {
        self.segments.iter().map(Segment::length_m).sum()
    }

    /// Stations where a rider boarding `origin_route` at `origin` can
    /// change to `dest_route` and still ride it to `dest`.
    ///
    /// These are the origin route's stations from `origin` onwards that
    /// the destination route serves before `dest`, in the origin route's
    /// order. `None` if a route is unknown or a station is not on its
    /// route.
    pub fn find_transfer_stations(
        &self,
        origin_route: RouteId,
        origin: &StationAbbr,
        dest_route: RouteId,
        dest: &StationAbbr,
    ) -> Option<Vec<StationAbbr>> {
        let from = self.route(origin_route)?;
        let to = self.route(dest_route)?;
        let boarding = from.position(origin)?;
        let alighting = to.position(dest)?;

        let reachable = &to.stations()[..alighting];
        Some(
            from.stations()[boarding..]
                .iter()
                .filter(|s| reachable.contains(s))
                .copied()
                .collect(),
        )
    }
}
