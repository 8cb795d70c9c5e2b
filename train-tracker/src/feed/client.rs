//! BART API HTTP client.
//!
//! Provides async methods for the station, route, schedule and
//! estimated-departure endpoints. Handles authentication, concurrency
//! limiting and conversion to domain types.

use std::sync::Arc;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::{Direction, LiveDepartures, RouteSchedule, StationAbbr};

use super::convert::{
    RouteRecord, StationRecord, convert_etd, convert_route_info, convert_schedule,
    convert_stations, route_number,
};
use super::error::FeedError;
use super::provider::TransitFeed;
use super::types::{EtdRoot, Envelope, RoutesRoot, ScheduleRoot, StationsRoot};

/// Default base URL for the BART API.
pub const DEFAULT_BASE_URL: &str = "https://api.bart.gov/api";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the BART client.
#[derive(Debug, Clone)]
pub struct BartConfig {
    /// API key, sent as the `key` query parameter
    pub api_key: String,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BartConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// BART API client.
///
/// Uses a semaphore to limit concurrent requests, since the startup
/// schedule fetch issues one request per route.
#[derive(Debug, Clone)]
pub struct BartClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
}

impl BartClient {
    /// Create a new client with the given configuration.
    pub fn new(config: BartConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Issue a GET against `script` and decode the `root` of the response.
    async fn get<T: DeserializeOwned>(
        &self,
        script: &str,
        params: &[(&str, String)],
    ) -> Result<T, FeedError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FeedError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/{}", self.base_url, script);
        debug!(%url, ?params, "transit API request");

        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("json", "y")])
            .query(params)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(FeedError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| FeedError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        Ok(envelope.root)
    }

    /// Fetch `routeinfo` for one route number.
    async fn fetch_route_info(&self, number: u32) -> Result<RouteRecord, FeedError> {
        let root: RoutesRoot = self
            .get(
                "route.aspx",
                &[("cmd", "routeinfo".to_string()), ("route", number.to_string())],
            )
            .await?;

        let dto = root
            .routes
            .route
            .into_vec()
            .into_iter()
            .next()
            .ok_or_else(|| FeedError::Malformed(format!("no routeinfo for route {number}")))?;

        convert_route_info(&dto).map_err(|e| FeedError::Malformed(e.to_string()))
    }
}

impl TransitFeed for BartClient {
    async fn fetch_stations(&self) -> Result<Vec<StationRecord>, FeedError> {
        let root: StationsRoot = self.get("stn.aspx", &[("cmd", "stns".to_string())]).await?;
        Ok(convert_stations(root))
    }

    async fn fetch_routes(&self) -> Result<Vec<RouteRecord>, FeedError> {
        let root: RoutesRoot = self.get("route.aspx", &[("cmd", "routes".to_string())]).await?;

        let numbers: Vec<u32> = root
            .routes
            .route
            .into_vec()
            .iter()
            .filter_map(|dto| match route_number(dto) {
                Ok(n) => Some(n),
                Err(e) => {
                    warn!(route = %dto.route_id, error = %e, "skipping route");
                    None
                }
            })
            .collect();

        let infos = join_all(numbers.iter().map(|&n| self.fetch_route_info(n))).await;

        let mut routes = Vec::with_capacity(infos.len());
        for (number, info) in numbers.into_iter().zip(infos) {
            match info {
                Ok(record) => routes.push(record),
                // A route that cannot be described is left out; a transport
                // failure means the whole listing is unreliable.
                Err(FeedError::Malformed(reason)) => {
                    warn!(route = number, %reason, "skipping route");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(routes)
    }

    async fn fetch_route_schedule(&self, route_number: u32) -> Result<RouteSchedule, FeedError> {
        let root: ScheduleRoot = self
            .get(
                "sched.aspx",
                &[("cmd", "routesched".to_string()), ("route", route_number.to_string())],
            )
            .await?;

        convert_schedule(&root).map_err(|e| FeedError::Malformed(e.to_string()))
    }

    async fn fetch_live_departures(
        &self,
        station: Option<StationAbbr>,
        direction: Option<Direction>,
    ) -> Result<LiveDepartures, FeedError> {
        let mut params = vec![("cmd", "etd".to_string())];
        match station {
            Some(abbr) => {
                params.push(("orig", abbr.as_str().to_string()));
                if let Some(dir) = direction {
                    params.push(("dir", dir.code().to_string()));
                }
            }
            None => {
                if direction.is_some() {
                    debug!("direction filter ignored for an all-stations request");
                }
                params.push(("orig", "ALL".to_string()));
            }
        }

        let root: EtdRoot = self.get("etd.aspx", &params).await?;
        convert_etd(&root).map_err(|e| FeedError::Malformed(e.to_string()))
    }
}
