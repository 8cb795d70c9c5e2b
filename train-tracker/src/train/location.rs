//! Where a train is: its state plus progress through the current window.

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use crate::domain::StationAbbr;
use crate::geometry::{remaining_until, time_range_progress};
use crate::network::SegmentId;

/// Coarse state of a train along its trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainState {
    /// Before the origin dwell window opens.
    NotStarted { origin: StationAbbr },
    /// Dwelling at a station.
    Waiting { station: StationAbbr },
    /// Moving along a segment; `from` and `to` are its ends in travel order.
    Transiting {
        segment: SegmentId,
        from: StationAbbr,
        to: StationAbbr,
    },
    /// After the destination dwell window closes.
    Ended { destination: StationAbbr },
}

impl TrainState {
    /// Whether the train is between its first and last dwell windows.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Waiting { .. } | Self::Transiting { .. })
    }

    /// The station the train is at, if dwelling.
    pub fn station(&self) -> Option<StationAbbr> {
        match self {
            Self::Waiting { station } => Some(*station),
            _ => None,
        }
    }

    /// The segment the train is on, if moving.
    pub fn segment(&self) -> Option<SegmentId> {
        match self {
            Self::Transiting { segment, .. } => Some(*segment),
            _ => None,
        }
    }

    /// Short lowercase name of the state.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted { .. } => "not_started",
            Self::Waiting { .. } => "waiting",
            Self::Transiting { .. } => "transiting",
            Self::Ended { .. } => "ended",
        }
    }
}

impl fmt::Display for TrainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted { origin } => write!(f, "not started at {origin}"),
            Self::Waiting { station } => write!(f, "waiting at {station}"),
            Self::Transiting { from, to, .. } => write!(f, "transiting {from} -> {to}"),
            Self::Ended { destination } => write!(f, "ended at {destination}"),
        }
    }
}

/// A train's state with progress through its current window.
///
/// `progress` is always within `[0.0, 1.0]`; `remaining` is never negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub state: TrainState,
    pub progress: f64,
    pub remaining: Duration,
}

impl Position {
    /// Not yet started; progress pinned to 0.
    pub fn not_started(origin: StationAbbr, remaining: Duration) -> Self {
        Self {
            state: TrainState::NotStarted { origin },
            progress: 0.0,
            remaining: remaining.max(Duration::zero()),
        }
    }

    /// Finished; progress pinned to 1.
    pub fn ended(destination: StationAbbr) -> Self {
        Self {
            state: TrainState::Ended { destination },
            progress: 1.0,
            remaining: Duration::zero(),
        }
    }

    /// A state whose progress runs linearly over `[start, end]`.
    pub fn within(
        state: TrainState,
        start: NaiveDateTime,
        end: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            state,
            progress: time_range_progress(start, end, now),
            remaining: remaining_until(end, now),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.0}%, {}s left)",
            self.state,
            self.progress * 100.0,
            self.remaining.num_seconds()
        )
    }
}
