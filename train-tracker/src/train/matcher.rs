//! Live-feed matching for the observed position.
//!
//! The feed is station-scoped: it reports upcoming departures from each
//! station towards each destination. A train is matched by looking at
//! the stations it is at or heading to, and taking the first estimate
//! towards its destination that agrees on direction and car length and
//! is not implausibly early. This is a heuristic; a different train on
//! the same line can be matched by mistake.

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::domain::{LiveDepartures, LiveEstimate, dwell_time, match_tolerance};
use crate::geometry::{remaining_until, time_range_progress};
use crate::network::Network;

use super::location::{Position, TrainState};
use super::model::Train;

impl Train {
    /// Recompute the observed position from a live snapshot.
    ///
    /// Uses the scheduled position, so run it after
    /// [`Train::update_scheduled_location`] for the same `now`. Returns
    /// whether a live estimate matched; without one the observed position
    /// falls back to the scheduled one.
    pub fn update_real_location(
        &mut self,
        now: NaiveDateTime,
        network: &Network,
        live: &LiveDepartures,
    ) -> bool {
        let Some((idx, estimate)) = self.find_match(network, live, now) else {
            trace!(train = %self.id, "No live match, using scheduled position");
            self.real = self.scheduled.clone();
            return false;
        };

        if self.car_length.is_none()
            && let Some(length) = estimate.car_length
        {
            debug!(train = %self.id, cars = length, "Learnt car length");
            self.car_length = Some(length);
        }

        self.real = self.observed_position(network, idx, &estimate, now);
        trace!(train = %self.id, position = %self.real, "Observed position");
        true
    }

    /// Candidate stops in stop order: the last one the schedule has left,
    /// the one the train is dwelling at, and the next one it has not yet
    /// reached.
    fn candidate_stops(&self, now: NaiveDateTime) -> Vec<usize> {
        let mut candidates = Vec::with_capacity(3);
        candidates.extend(self.departed_stop_index(now));
        if let Some(station) = self.scheduled.state.station()
            && let Some(idx) = self.stop_index(&station)
        {
            candidates.push(idx);
        }
        candidates.extend(self.upcoming_stop_index(now));
        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }

    fn find_match(
        &self,
        network: &Network,
        live: &LiveDepartures,
        now: NaiveDateTime,
    ) -> Option<(usize, LiveEstimate)> {
        let destination = self.destination();
        let dwell = dwell_time();
        let earliest_offset = dwell + match_tolerance();

        for idx in self.candidate_stops(now) {
            let station = self.stops[idx];
            let Some(expected) = self.direction_leaving(network, idx) else {
                continue;
            };
            let earliest = self.departures[idx] - earliest_offset;
            // Past its scheduled departure, a stop only matches a train
            // still standing at the platform.
            let departed = self.departures[idx] <= now;

            let found = live
                .estimates(&station, &destination)
                .iter()
                .filter(|e| e.direction == expected)
                .filter(|e| match (self.car_length, e.car_length) {
                    (Some(known), Some(reported)) => known == reported,
                    _ => true,
                })
                .filter(|e| !departed || (e.departure - dwell <= now && now < e.departure))
                .find(|e| e.departure >= earliest);

            if let Some(estimate) = found {
                trace!(train = %self.id, %station, departure = %estimate.departure, "Matched live estimate");
                return Some((idx, estimate.clone()));
            }
        }
        None
    }

    fn observed_position(
        &self,
        network: &Network,
        idx: usize,
        estimate: &LiveEstimate,
        now: NaiveDateTime,
    ) -> Position {
        let station = self.stops[idx];
        let departure = estimate.departure;
        let arrival = departure - dwell_time();

        if now >= arrival {
            return Position::within(TrainState::Waiting { station }, arrival, departure, now);
        }

        // Still approaching the matched station
        let Some(prev) = idx.checked_sub(1) else {
            return Position::not_started(station, arrival - now);
        };
        let travel = self
            .legs
            .get(prev)
            .map(|leg| network.path_duration(&leg.path))
            .unwrap_or_else(chrono::Duration::zero);
        let start = arrival - travel;
        let fraction = time_range_progress(start, arrival, now);

        match self.leg_state(network, prev, fraction) {
            Some((state, progress)) => Position {
                state,
                progress,
                remaining: remaining_until(arrival, now),
            },
            None => Position::within(TrainState::Waiting { station: self.stops[prev] }, start, arrival, now),
        }
    }
}
