//! Trains and their position estimates.
//!
//! Each train tracks two positions: one derived purely from its
//! timetable, and one observed by matching the live departure feed.
//! Both are recomputed every refresh tick against an explicit `now`.

mod location;
mod matcher;
mod model;
mod scheduled;

pub use location::{Position, TrainState};
pub use model::{Train, TrainError, TrainId};
