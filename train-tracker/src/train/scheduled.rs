//! Timetable-derived position.

use chrono::NaiveDateTime;
use tracing::trace;

use crate::domain::dwell_time;
use crate::geometry::time_range_progress;
use crate::network::Network;

use super::location::{Position, TrainState};
use super::model::Train;

impl Train {
    /// Recompute the timetable position at `now`.
    ///
    /// Walks consecutive stop pairs in order; the first window containing
    /// `now` wins. Each stop has a dwell window ending at its departure,
    /// and the track between two stops is covered from the first departure
    /// until the second stop's dwell window opens.
    pub fn update_scheduled_location(&mut self, now: NaiveDateTime, network: &Network) {
        self.scheduled = self.scheduled_position(now, network);
        trace!(train = %self.id, position = %self.scheduled, "Scheduled position");
    }

    fn scheduled_position(&self, now: NaiveDateTime, network: &Network) -> Position {
        let dwell = dwell_time();
        let origin_dep = self.origin_departure();
        let dest_dep = self.destination_departure();

        if now <= origin_dep - dwell {
            return Position::not_started(self.origin(), origin_dep - dwell - now);
        }
        if now >= dest_dep + dwell {
            return Position::ended(self.destination());
        }
        if now < origin_dep {
            let state = TrainState::Waiting {
                station: self.origin(),
            };
            return Position::within(state, origin_dep - dwell, origin_dep, now);
        }

        for (idx, pair) in self.departures.windows(2).enumerate() {
            let (dep_a, dep_b) = (pair[0], pair[1]);
            let arrive_b = dep_b - dwell;

            if now >= arrive_b && now < dep_b {
                let state = TrainState::Waiting {
                    station: self.stops[idx + 1],
                };
                return Position::within(state, arrive_b, dep_b, now);
            }
            if now >= dep_a && now < arrive_b {
                let fraction = time_range_progress(dep_a, arrive_b, now);
                if let Some((state, progress)) = self.leg_state(network, idx, fraction) {
                    let mut position = Position::within(state, dep_a, arrive_b, now);
                    position.progress = progress;
                    return position;
                }
            }
        }

        // Dwelling at the destination after its departure time
        let state = TrainState::Waiting {
            station: self.destination(),
        };
        Position::within(state, dest_dep, dest_dep + dwell, now)
    }
}
