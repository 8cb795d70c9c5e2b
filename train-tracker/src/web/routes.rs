//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tracing::warn;

use crate::domain::{Direction, StationAbbr, TripIndex};
use crate::geometry::meters_to_miles;
use crate::network::{Network, Route, SegmentId};
use crate::train::TrainId;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", get(list_stations))
        .route("/stations/:abbr/trains", get(trains_at_station))
        .route("/routes", get(list_routes))
        .route("/segments", get(list_segments))
        .route("/segments/:id/trains", get(trains_on_segment))
        .route("/trains", get(list_trains))
        .route("/trains/:route/:trip", get(get_train))
        .route("/transfers", get(transfers))
        .with_state(state)
}

/// Health check with network and refresh status.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let system = state.system.read().await;
    let network = system.network();
    Json(HealthResponse {
        status: "ok",
        stations: network.station_count(),
        routes: network.routes().len(),
        segments: network.segments().len(),
        track_miles: meters_to_miles(network.total_length_m()),
        trains: system.trains().len(),
        active_trains: system.active_trains().count(),
        last_tick: system.last_tick().as_ref().map(TickResult::from_summary),
    })
}

async fn list_stations(State(state): State<AppState>) -> Json<Vec<StationResult>> {
    let system = state.system.read().await;
    let network = system.network();
    Json(
        network
            .stations()
            .map(|s| StationResult::from_station(s, network))
            .collect(),
    )
}

fn parse_station(raw: &str) -> Result<StationAbbr, AppError> {
    StationAbbr::parse_normalized(raw).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

fn route_by_number(network: &Network, number: u32) -> Result<&Route, AppError> {
    network
        .routes()
        .iter()
        .find(|r| r.number() == number)
        .ok_or_else(|| AppError::NotFound {
            message: format!("route {number} not found"),
        })
}

/// All routes, or one by long identifier with `?id=`.
async fn list_routes(
    State(state): State<AppState>,
    Query(query): Query<RoutesQuery>,
) -> Result<Json<Vec<RouteResult>>, AppError> {
    let system = state.system.read().await;
    let network = system.network();

    let routes = match query.id.as_deref() {
        Some(id) => {
            let route = network.route_by_long_id(id).ok_or_else(|| AppError::NotFound {
                message: format!("route {id} not found"),
            })?;
            vec![RouteResult::from_route(route)]
        }
        None => network.routes().iter().map(RouteResult::from_route).collect(),
    };
    Ok(Json(routes))
}

/// All segments, or the one joining `?from=` and `?to=`.
async fn list_segments(
    State(state): State<AppState>,
    Query(query): Query<SegmentsQuery>,
) -> Result<Json<Vec<SegmentResult>>, AppError> {
    let system = state.system.read().await;
    let network = system.network();

    let segments = match (query.from.as_deref(), query.to.as_deref()) {
        (None, None) => network.segments().iter().map(SegmentResult::from_segment).collect(),
        (Some(from), Some(to)) => {
            let (from, to) = (parse_station(from)?, parse_station(to)?);
            let segment = network
                .segment_between(&from, &to)
                .ok_or_else(|| AppError::NotFound {
                    message: format!("no segment between {from} and {to}"),
                })?;
            vec![SegmentResult::from_segment(segment)]
        }
        _ => {
            return Err(AppError::BadRequest {
                message: "from and to must be given together".to_string(),
            });
        }
    };
    Ok(Json(segments))
}

/// Where to change from one route to another on the way to `dest`.
async fn transfers(
    State(state): State<AppState>,
    Query(query): Query<TransfersQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let origin = parse_station(&query.origin)?;
    let dest = parse_station(&query.dest)?;

    let system = state.system.read().await;
    let network = system.network();
    let origin_route = route_by_number(network, query.origin_route)?.id();
    let dest_route = route_by_number(network, query.dest_route)?.id();

    let stations = network
        .find_transfer_stations(origin_route, &origin, dest_route, &dest)
        .ok_or_else(|| AppError::NotFound {
            message: format!(
                "{origin} is not on route {} or {dest} is not on route {}",
                query.origin_route, query.dest_route
            ),
        })?;
    Ok(Json(stations.iter().map(|s| s.to_string()).collect()))
}

/// All trains, or only active ones with `?active=true`.
async fn list_trains(
    State(state): State<AppState>,
    Query(query): Query<TrainsQuery>,
) -> Json<Vec<TrainResult>> {
    let system = state.system.read().await;
    let trains: Vec<TrainResult> = if query.active.unwrap_or(false) {
        system.active_trains().map(TrainResult::from_train).collect()
    } else {
        system.trains().iter().map(TrainResult::from_train).collect()
    };
    Json(trains)
}

/// One train by route number and trip index.
async fn get_train(
    State(state): State<AppState>,
    Path((route_number, trip)): Path<(u32, u32)>,
) -> Result<Json<TrainResult>, AppError> {
    let system = state.system.read().await;
    let route = route_by_number(system.network(), route_number)?;

    let id = TrainId {
        route: route.id(),
        trip: TripIndex(trip),
    };
    let train = system.train(id).ok_or_else(|| AppError::NotFound {
        message: format!("trip {trip} not found on route {route_number}"),
    })?;

    Ok(Json(TrainResult::from_train(train)))
}

/// Trains observed dwelling at a station.
async fn trains_at_station(
    State(state): State<AppState>,
    Path(abbr): Path<String>,
) -> Result<Json<Vec<TrainResult>>, AppError> {
    let abbr = parse_station(&abbr)?;

    let system = state.system.read().await;
    if system.network().station(&abbr).is_none() {
        return Err(AppError::NotFound {
            message: format!("station {abbr} not found"),
        });
    }

    Ok(Json(
        system
            .trains_at_station(&abbr)
            .into_iter()
            .map(TrainResult::from_train)
            .collect(),
    ))
}

/// Trains observed on a segment, optionally filtered by `?direction=`.
async fn trains_on_segment(
    State(state): State<AppState>,
    Path(id): Path<usize>,
    Query(query): Query<SegmentTrainsQuery>,
) -> Result<Json<Vec<TrainResult>>, AppError> {
    let direction = query
        .direction
        .as_deref()
        .map(Direction::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;

    let system = state.system.read().await;
    let segment = SegmentId(id);
    if system.network().segment(segment).is_none() {
        return Err(AppError::NotFound {
            message: format!("segment {id} not found"),
        });
    }

    Ok(Json(
        system
            .trains_on_segment(segment, direction)
            .into_iter()
            .map(TrainResult::from_train)
            .collect(),
    ))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "Request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
