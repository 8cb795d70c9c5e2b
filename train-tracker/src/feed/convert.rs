//! Conversion from transit API DTOs to domain types.
//!
//! Malformed upstream data is handled per entity: a station, route, trip
//! or estimate that fails to convert is logged and skipped, and only a
//! payload that is unusable as a whole is an error.

use chrono::{Duration, NaiveDateTime};
use tracing::warn;

use crate::domain::{
    Direction, LiveDepartures, LiveEstimate, RouteSchedule, StationAbbr, TripIndex, TripSchedule,
    parse_clock, parse_feed_date, parse_service_time, schedule_context,
};

use super::types::{
    EstimateDto, EtdRoot, RouteDto, ScheduleRoot, StationDto, StationsRoot, StopDto, TrainDto,
};

/// Countdown value the feed uses for a train already at the platform.
const LEAVING: &str = "Leaving";

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Failed to parse a station abbreviation
    #[error("invalid station abbreviation: {0}")]
    InvalidStation(String),

    /// Failed to parse a latitude or longitude
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Failed to parse a time or date string
    #[error("invalid time: {0}")]
    InvalidTime(String),

    /// Failed to parse a numeric field
    #[error("invalid {0}: {1}")]
    InvalidNumber(&'static str, String),

    /// Failed to parse a direction
    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// A station as supplied by the feed, before it joins the network.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub abbr: StationAbbr,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// A directional route with its ordered station list.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRecord {
    /// Route number, used to request the route's schedule
    pub number: u32,
    /// Long identifier (e.g. "ROUTE 1")
    pub id: String,
    pub abbr: String,
    pub name: String,
    pub color: Option<String>,
    pub direction: Option<Direction>,
    /// Stations from origin to destination
    pub stations: Vec<StationAbbr>,
}

/// Convert the station list, skipping stations that fail to convert.
pub fn convert_stations(root: StationsRoot) -> Vec<StationRecord> {
    root.stations
        .station
        .into_vec()
        .into_iter()
        .filter_map(|dto| match convert_station(&dto) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(station = %dto.abbr, error = %e, "skipping station");
                None
            }
        })
        .collect()
}

/// Convert a single station.
pub fn convert_station(dto: &StationDto) -> Result<StationRecord, ConversionError> {
    let abbr = parse_abbr(&dto.abbr)?;
    let lat = parse_coordinate(dto.gtfs_latitude.as_deref(), "gtfs_latitude", 90.0)?;
    let lng = parse_coordinate(dto.gtfs_longitude.as_deref(), "gtfs_longitude", 180.0)?;

    Ok(StationRecord {
        abbr,
        name: dto.name.clone(),
        lat,
        lng,
    })
}

/// Extract the route number from a route summary.
pub fn route_number(dto: &RouteDto) -> Result<u32, ConversionError> {
    dto.number
        .trim()
        .parse()
        .map_err(|_| ConversionError::InvalidNumber("route number", dto.number.clone()))
}

/// Convert a detailed route (`routeinfo`) into a record.
pub fn convert_route_info(dto: &RouteDto) -> Result<RouteRecord, ConversionError> {
    let number = route_number(dto)?;

    let config = dto
        .config
        .as_ref()
        .ok_or(ConversionError::MissingField("config"))?;

    let stations = config
        .station
        .clone()
        .into_vec()
        .iter()
        .map(|s| parse_abbr(s))
        .collect::<Result<Vec<_>, _>>()?;

    if stations.len() < 2 {
        return Err(ConversionError::MissingField("config.station (at least two)"));
    }

    if let Some(expected) = dto.num_stns.as_deref().and_then(|n| n.trim().parse::<usize>().ok())
        && expected != stations.len()
    {
        warn!(
            route = %dto.route_id,
            expected,
            actual = stations.len(),
            "route station count disagrees with num_stns"
        );
    }

    let direction = match dto.direction.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(d) => {
            Some(Direction::parse(d).map_err(|_| ConversionError::InvalidDirection(d.into()))?)
        }
    };

    Ok(RouteRecord {
        number,
        id: dto.route_id.clone(),
        abbr: dto.abbr.clone(),
        name: dto.name.clone(),
        color: dto.color.clone(),
        direction,
        stations,
    })
}

/// Convert a route schedule, skipping trips that fail to convert.
///
/// Times are placed on the calendar relative to the schedule date, so
/// departures after midnight land on the following day.
pub fn convert_schedule(root: &ScheduleRoot) -> Result<RouteSchedule, ConversionError> {
    let date =
        parse_feed_date(&root.date).map_err(|_| ConversionError::InvalidTime(root.date.clone()))?;
    let context = schedule_context(date);

    let trains = root
        .route
        .as_ref()
        .map(|r| r.train.clone().into_vec())
        .unwrap_or_default();

    let mut schedule = RouteSchedule::new();
    for train in &trains {
        match convert_trip(train, context) {
            Ok((index, trip)) => {
                schedule.insert(index, trip);
            }
            Err(e) => {
                warn!(trip = %train.index, error = %e, "skipping trip");
            }
        }
    }

    Ok(schedule)
}

fn convert_trip(
    train: &TrainDto,
    context: NaiveDateTime,
) -> Result<(TripIndex, TripSchedule), ConversionError> {
    let index = train
        .index
        .trim()
        .parse()
        .map(TripIndex)
        .map_err(|_| ConversionError::InvalidNumber("trip index", train.index.clone()))?;

    let trip = train
        .stop
        .clone()
        .into_vec()
        .iter()
        .filter_map(|stop| convert_stop(stop, context).transpose())
        .collect::<Result<TripSchedule, _>>()?;

    Ok((index, trip))
}

/// Stops without a departure time are passed through, not served.
fn convert_stop(
    stop: &StopDto,
    context: NaiveDateTime,
) -> Result<Option<(StationAbbr, NaiveDateTime)>, ConversionError> {
    let Some(time) = stop.orig_time.as_deref().filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };
    let station = parse_abbr(&stop.station)?;
    let departure =
        parse_service_time(time, context).map_err(|_| ConversionError::InvalidTime(time.into()))?;
    Ok(Some((station, departure)))
}

/// Convert an estimated-departure response into a live snapshot.
///
/// Each countdown is anchored at the feed's own timestamp.
pub fn convert_etd(root: &EtdRoot) -> Result<LiveDepartures, ConversionError> {
    let date =
        parse_feed_date(&root.date).map_err(|_| ConversionError::InvalidTime(root.date.clone()))?;
    let time = parse_clock(&root.time).map_err(|_| ConversionError::InvalidTime(root.time.clone()))?;
    // The ETD header carries the calendar date, not the service date, so
    // no cutoff rollover applies here.
    let generated_at = date.and_time(time);

    let mut live = LiveDepartures::new(generated_at);

    for station in root.station.clone().into_vec() {
        let origin = match parse_abbr(&station.abbr) {
            Ok(abbr) => abbr,
            Err(e) => {
                warn!(station = %station.abbr, error = %e, "skipping live departures");
                continue;
            }
        };

        for etd in station.etd.into_vec() {
            let destination = match parse_abbr(&etd.abbreviation) {
                Ok(abbr) => abbr,
                Err(e) => {
                    warn!(
                        station = %origin,
                        destination = %etd.abbreviation,
                        error = %e,
                        "skipping live departures"
                    );
                    continue;
                }
            };

            for estimate in etd.estimate.into_vec() {
                match convert_estimate(&estimate, destination, generated_at) {
                    Ok(est) => live.push(origin, est),
                    Err(e) => {
                        warn!(station = %origin, destination = %destination, error = %e, "skipping estimate");
                    }
                }
            }
        }
    }

    Ok(live)
}

fn convert_estimate(
    dto: &EstimateDto,
    destination: StationAbbr,
    generated_at: NaiveDateTime,
) -> Result<LiveEstimate, ConversionError> {
    let minutes = parse_countdown(&dto.minutes)?;
    let direction = Direction::parse(&dto.direction)
        .map_err(|_| ConversionError::InvalidDirection(dto.direction.clone()))?;

    Ok(LiveEstimate {
        destination,
        direction,
        platform: dto
            .platform
            .as_ref()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
        car_length: dto.length.as_deref().and_then(|l| l.trim().parse().ok()),
        departure: generated_at + Duration::minutes(minutes),
    })
}

/// Parse a countdown in minutes; `"Leaving"` counts as zero.
fn parse_countdown(s: &str) -> Result<i64, ConversionError> {
    let s = s.trim();
    if s.eq_ignore_ascii_case(LEAVING) {
        return Ok(0);
    }
    s.parse::<i64>()
        .ok()
        .filter(|m| *m >= 0)
        .ok_or_else(|| ConversionError::InvalidNumber("countdown", s.to_string()))
}

fn parse_abbr(s: &str) -> Result<StationAbbr, ConversionError> {
    StationAbbr::parse_normalized(s).map_err(|_| ConversionError::InvalidStation(s.to_string()))
}

fn parse_coordinate(
    value: Option<&str>,
    field: &'static str,
    limit: f64,
) -> Result<f64, ConversionError> {
    let raw = value.ok_or(ConversionError::MissingField(field))?;
    let parsed: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ConversionError::InvalidCoordinate(raw.to_string()))?;
    if !parsed.is_finite() || parsed.abs() > limit {
        return Err(ConversionError::InvalidCoordinate(raw.to_string()));
    }
    Ok(parsed)
}
