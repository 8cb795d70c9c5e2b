//! Transit API response DTOs.
//!
//! These types map directly to the JSON variant of the BART API
//! (`json=y`). Every payload is wrapped in a `root` object, numbers arrive
//! as strings, and a list with a single element is sometimes sent as a
//! bare object, hence [`OneOrMany`].

use serde::Deserialize;

/// A JSON value that is either a list or a single bare element.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// Flatten into a vector.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

/// The `{"root": ...}` wrapper around every response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub root: T,
}

/// Response from `stn.aspx?cmd=stns`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationsRoot {
    pub stations: StationList,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationList {
    #[serde(default)]
    pub station: OneOrMany<StationDto>,
}

/// One station in the station list.
#[derive(Debug, Clone, Deserialize)]
pub struct StationDto {
    /// Display name.
    pub name: String,

    /// Station abbreviation (e.g. "MONT").
    pub abbr: String,

    /// Latitude as a decimal string.
    pub gtfs_latitude: Option<String>,

    /// Longitude as a decimal string.
    pub gtfs_longitude: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
}

/// Response from `route.aspx?cmd=routes` and `route.aspx?cmd=routeinfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesRoot {
    pub routes: RouteList,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteList {
    #[serde(default)]
    pub route: OneOrMany<RouteDto>,
}

/// A route, either summary (`routes`) or detailed (`routeinfo`).
///
/// Only the detailed form carries `config`, the ordered station list.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDto {
    /// Long name (e.g. "Antioch - SFIA/Millbrae").
    pub name: String,

    /// Abbreviation (e.g. "ANTC-SFIA").
    pub abbr: String,

    /// Long identifier (e.g. "ROUTE 1").
    #[serde(rename = "routeID")]
    pub route_id: String,

    /// Route number as a string.
    pub number: String,

    pub hexcolor: Option<String>,
    pub color: Option<String>,

    /// Origin station abbreviation (detailed form only).
    pub origin: Option<String>,

    /// Destination station abbreviation (detailed form only).
    pub destination: Option<String>,

    /// "North", "South" or empty (detailed form only).
    pub direction: Option<String>,

    /// Number of stations, as a string (detailed form only).
    pub num_stns: Option<String>,

    /// Ordered station list (detailed form only).
    pub config: Option<RouteConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    #[serde(default)]
    pub station: OneOrMany<String>,
}

/// Response from `sched.aspx?cmd=routesched`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRoot {
    /// Schedule date, `MM/DD/YYYY`.
    pub date: String,

    pub route: Option<ScheduleRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRoute {
    #[serde(default)]
    pub train: OneOrMany<TrainDto>,
}

/// One trip in a route schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainDto {
    /// Trip index within the route schedule.
    #[serde(rename = "@index")]
    pub index: String,

    #[serde(default)]
    pub stop: OneOrMany<StopDto>,
}

/// A stop of a trip. Stations the trip passes without stopping carry no
/// `origTime`.
#[derive(Debug, Clone, Deserialize)]
pub struct StopDto {
    #[serde(rename = "@station")]
    pub station: String,

    #[serde(rename = "@origTime")]
    pub orig_time: Option<String>,
}

/// Response from `etd.aspx?cmd=etd`.
#[derive(Debug, Clone, Deserialize)]
pub struct EtdRoot {
    /// Feed date, `MM/DD/YYYY`.
    pub date: String,

    /// Feed time, e.g. `"05:01:23 PM PDT"`.
    pub time: String,

    #[serde(default)]
    pub station: OneOrMany<EtdStation>,
}

/// Departures from one station.
#[derive(Debug, Clone, Deserialize)]
pub struct EtdStation {
    pub name: String,
    pub abbr: String,

    #[serde(default)]
    pub etd: OneOrMany<EtdDestination>,
}

/// Departures from one station towards one destination.
#[derive(Debug, Clone, Deserialize)]
pub struct EtdDestination {
    /// Destination display name.
    pub destination: String,

    /// Destination station abbreviation.
    pub abbreviation: String,

    #[serde(default)]
    pub estimate: OneOrMany<EstimateDto>,
}

/// One estimated departure.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateDto {
    /// Countdown in whole minutes, or `"Leaving"`.
    pub minutes: String,

    pub platform: Option<String>,

    /// `"North"` or `"South"`.
    pub direction: String,

    /// Number of cars, as a string.
    pub length: Option<String>,

    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_stations() {
        let json = r#"{"root": {"stations": {"station": [
            {"name": "Montgomery St.", "abbr": "MONT",
             "gtfs_latitude": "37.789405", "gtfs_longitude": "-122.401066",
             "address": "598 Market Street", "city": "San Francisco",
             "county": "sanfrancisco", "state": "CA", "zipcode": "94104"},
            {"name": "Powell St.", "abbr": "POWL",
             "gtfs_latitude": "37.784471", "gtfs_longitude": "-122.407974"}
        ]}}}"#;

        let env: Envelope<StationsRoot> = serde_json::from_str(json).unwrap();
        let stations = env.root.stations.station.into_vec();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].abbr, "MONT");
        assert_eq!(stations[0].gtfs_latitude.as_deref(), Some("37.789405"));
        assert!(stations[1].zipcode.is_none());
    }

    #[test]
    fn deserialize_single_route_info() {
        let json = r##"{"root": {"routes": {"route": {
            "name": "Antioch - SFIA/Millbrae", "abbr": "ANTC-SFIA",
            "routeID": "ROUTE 1", "number": "1", "origin": "ANTC",
            "destination": "MLBR", "direction": "South", "hexcolor": "#ffff33",
            "color": "YELLOW", "num_stns": "3",
            "config": {"station": ["ANTC", "PCTR", "PITT"]}
        }}}}"##;

        let env: Envelope<RoutesRoot> = serde_json::from_str(json).unwrap();
        let routes = env.root.routes.route.into_vec();
        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.route_id, "ROUTE 1");
        assert_eq!(route.direction.as_deref(), Some("South"));
        let stations = route.config.clone().unwrap().station.into_vec();
        assert_eq!(stations, vec!["ANTC", "PCTR", "PITT"]);
    }

    #[test]
    fn deserialize_schedule() {
        let json = r#"{"root": {"date": "10/19/2026", "sched_num": "72", "route": {"train": [
            {"@index": "1", "stop": [
                {"@station": "ANTC", "@origTime": "4:51 AM", "@bikeflag": "1"},
                {"@station": "PCTR", "@bikeflag": "1"},
                {"@station": "PITT", "@origTime": "5:04 AM", "@bikeflag": "1"}
            ]}
        ]}}}"#;

        let env: Envelope<ScheduleRoot> = serde_json::from_str(json).unwrap();
        assert_eq!(env.root.date, "10/19/2026");
        let trains = env.root.route.unwrap().train.into_vec();
        assert_eq!(trains[0].index, "1");
        let stops = trains[0].stop.clone().into_vec();
        assert_eq!(stops.len(), 3);
        assert!(stops[1].orig_time.is_none());
        assert_eq!(stops[2].orig_time.as_deref(), Some("5:04 AM"));
    }

    #[test]
    fn deserialize_etd() {
        let json = r#"{"root": {"date": "10/19/2026", "time": "05:01:23 PM PDT", "station": [
            {"name": "Lake Merritt", "abbr": "LAKE", "etd": [
                {"destination": "Daly City", "abbreviation": "DALY", "limited": "0", "estimate": [
                    {"minutes": "Leaving", "platform": "1", "direction": "North", "length": "10", "color": "GREEN"},
                    {"minutes": "14", "platform": "1", "direction": "North", "length": "9"}
                ]},
                {"destination": "Berryessa", "abbreviation": "BERY", "estimate":
                    {"minutes": "3", "platform": "2", "direction": "South", "length": "8"}
                }
            ]}
        ]}}"#;

        let env: Envelope<EtdRoot> = serde_json::from_str(json).unwrap();
        let stations = env.root.station.into_vec();
        assert_eq!(stations[0].abbr, "LAKE");
        let etds = stations[0].etd.clone().into_vec();
        assert_eq!(etds.len(), 2);
        assert_eq!(etds[0].estimate.clone().into_vec()[0].minutes, "Leaving");
        assert_eq!(etds[1].estimate.clone().into_vec().len(), 1);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let json = r#"{"root": {"date": "10/19/2026", "time": "01:00:00 AM PDT"}}"#;
        let env: Envelope<EtdRoot> = serde_json::from_str(json).unwrap();
        assert!(env.root.station.into_vec().is_empty());
    }
}
