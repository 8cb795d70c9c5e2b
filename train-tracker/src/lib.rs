//! Rail network position tracker.
//!
//! Estimates where every scheduled BART train is along its route by
//! combining the static timetable with the live estimated-departure feed.
//! The network topology and per-segment travel times are derived once at
//! startup; train positions are refreshed on a fixed interval and served
//! over a small JSON API.

pub mod config;
pub mod domain;
pub mod feed;
pub mod geometry;
pub mod network;
pub mod refresh;
pub mod system;
pub mod train;
pub mod web;
