//! Two-phase topology build.
//!
//! Phase one registers stations and route skeletons. Phase two slides a
//! width-2 window over every route's stations, creating each oriented
//! segment once and sharing it between every route that walks it.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::domain::{RouteSchedule, StationAbbr};
use crate::feed::RouteRecord;
use crate::geometry::meters_to_miles;

use super::error::TopologyError;
use super::estimator::{DurationPolicy, estimate_segment_duration};
use super::graph::Network;
use super::route::{Route, RouteId};
use super::segment::{Segment, SegmentId, SegmentKey};
use super::station::Station;

/// Build the network from stations and routes with their timetables.
///
/// Routes that reference unknown stations are logged and skipped. Equal
/// latitudes between adjacent stations abort the build, as does a
/// segment without timetable samples under `DurationPolicy::Strict`.
pub fn build_network(
    stations: Vec<Station>,
    routes: Vec<(RouteRecord, RouteSchedule)>,
    policy: DurationPolicy,
) -> Result<Network, TopologyError> {
    let mut station_map = BTreeMap::new();
    for station in stations {
        if let Some(previous) = station_map.insert(station.abbr, station) {
            warn!(abbr = %previous.abbr, "Duplicate station, keeping the later entry");
        }
    }

    let mut skeletons = Vec::with_capacity(routes.len());
    for (record, trips) in routes {
        if let Some(unknown) = record.stations.iter().find(|s| !station_map.contains_key(*s)) {
            warn!(route = %record.id, station = %unknown, "Skipping route with unknown station");
            continue;
        }
        let id = RouteId(skeletons.len());
        skeletons.push(Route::new(id, record, trips));
    }

    let mut segments: Vec<Segment> = Vec::new();
    let mut segment_index: HashMap<SegmentKey, SegmentId> = HashMap::new();
    let mut adjacency: HashMap<StationAbbr, Vec<SegmentId>> = HashMap::new();
    let mut paths = Vec::with_capacity(skeletons.len());

    for route in &skeletons {
        let mut path = Vec::with_capacity(route.stations().len().saturating_sub(1));
        for pair in route.stations().windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let sa = station_map.get(&a).ok_or(TopologyError::UnknownStation(a))?;
            let sb = station_map.get(&b).ok_or(TopologyError::UnknownStation(b))?;
            let key = SegmentKey::orient(sa, sb)?;

            let id = match segment_index.get(&key) {
                Some(id) => *id,
                None => {
                    let all_trips = skeletons.iter().flat_map(|r| r.trips().values());
                    let duration = match (estimate_segment_duration(all_trips, a, b), policy) {
                        (Ok(d), _) => d,
                        (Err(TopologyError::InsufficientScheduleData(..)), DurationPolicy::Fallback(d)) => {
                            warn!(%a, %b, fallback_secs = d.num_seconds(), "No timetable samples for segment, using fallback duration");
                            d
                        }
                        (Err(e), _) => return Err(e),
                    };

                    let id = SegmentId(segments.len());
                    let segment = Segment::new(id, sa, sb, duration)?;
                    debug!(%segment, duration_secs = duration.num_seconds(), "Created segment");
                    segments.push(segment);
                    segment_index.insert(key, id);
                    adjacency.entry(a).or_default().push(id);
                    adjacency.entry(b).or_default().push(id);
                    id
                }
            };
            path.push(id);
        }
        paths.push(path);
    }

    for (route, path) in skeletons.iter_mut().zip(paths) {
        for id in path {
            route.push_segment(id);
        }
    }

    let network = Network {
        stations: station_map,
        segments,
        segment_index,
        adjacency,
        routes: skeletons,
    };

    info!(
        stations = network.station_count(),
        routes = network.routes().len(),
        segments = network.segments().len(),
        track_miles = meters_to_miles(network.total_length_m()),
        "Built network topology"
    );

    Ok(network)
}
