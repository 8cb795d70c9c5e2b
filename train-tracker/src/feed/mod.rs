//! Transit feed adapter.
//!
//! This module provides the collaborator that supplies the network
//! topology, the timetable and the live estimated-departure feed, along
//! with an HTTP client for the BART API.
//!
//! Key characteristics of the feed:
//! - Times are local clock strings; departures between midnight and 02:27
//!   belong to the following calendar day of the service day
//! - Live departures are countdowns in whole minutes ("Leaving" = 0),
//!   anchored at the feed's own timestamp
//! - Malformed entities are skipped individually, never the whole payload

mod client;
mod convert;
mod error;
mod mock;
mod provider;
mod types;

pub use client::{BartClient, BartConfig, DEFAULT_BASE_URL};
pub use convert::{ConversionError, RouteRecord, StationRecord};
pub use error::FeedError;
pub use mock::MockFeed;
pub use provider::TransitFeed;
pub use types::{
    EstimateDto, EtdDestination, EtdRoot, OneOrMany, RouteDto, ScheduleRoot, StationDto,
    TrainDto,
};
