//! Live estimated-departure snapshot.
//!
//! A snapshot is built once per refresh tick from the feed and then only
//! read. It is replaced wholesale on the next successful fetch.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::{Direction, StationAbbr};

/// One upcoming departure as estimated by the live feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEstimate {
    /// Final destination of the departing train
    pub destination: StationAbbr,
    /// Direction of travel leaving the station
    pub direction: Direction,
    /// Platform, if reported
    pub platform: Option<String>,
    /// Number of cars, if reported
    pub car_length: Option<u8>,
    /// Estimated departure instant (feed time + countdown)
    pub departure: NaiveDateTime,
}

/// Live departures keyed by departing station, then destination.
///
/// Estimates under each key keep the order the feed reported them in.
#[derive(Debug, Clone, Default)]
pub struct LiveDepartures {
    generated_at: Option<NaiveDateTime>,
    departures: HashMap<StationAbbr, HashMap<StationAbbr, Vec<LiveEstimate>>>,
}

impl LiveDepartures {
    /// Create an empty snapshot generated at the given instant.
    pub fn new(generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at: Some(generated_at),
            departures: HashMap::new(),
        }
    }

    /// A snapshot with no data, used before the first fetch succeeds.
    pub fn empty() -> Self {
        Self::default()
    }

    /// When the feed produced this snapshot, if known.
    pub fn generated_at(&self) -> Option<NaiveDateTime> {
        self.generated_at
    }

    /// Append an estimate departing `station`.
    pub fn push(&mut self, station: StationAbbr, estimate: LiveEstimate) {
        self.departures
            .entry(station)
            .or_default()
            .entry(estimate.destination)
            .or_default()
            .push(estimate);
    }

    /// Estimates departing `station` towards `destination`, in feed order.
    pub fn estimates(&self, station: &StationAbbr, destination: &StationAbbr) -> &[LiveEstimate] {
        self.departures
            .get(station)
            .and_then(|by_dest| by_dest.get(destination))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All estimates departing `station`, grouped by destination.
    pub fn departing(
        &self,
        station: &StationAbbr,
    ) -> impl Iterator<Item = (&StationAbbr, &[LiveEstimate])> {
        self.departures
            .get(station)
            .into_iter()
            .flat_map(|by_dest| by_dest.iter().map(|(d, e)| (d, e.as_slice())))
    }

    /// Number of stations with at least one estimate.
    pub fn station_count(&self) -> usize {
        self.departures.len()
    }

    /// Total number of estimates in the snapshot.
    pub fn estimate_count(&self) -> usize {
        self.departures
            .values()
            .flat_map(|by_dest| by_dest.values())
            .map(Vec::len)
            .sum()
    }

    /// Whether the snapshot holds no estimates.
    pub fn is_empty(&self) -> bool {
        self.estimate_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn abbr(s: &str) -> StationAbbr {
        StationAbbr::parse(s).unwrap()
    }

    fn estimate(dest: &str, minute: u32) -> LiveEstimate {
        LiveEstimate {
            destination: abbr(dest),
            direction: Direction::South,
            platform: Some("2".into()),
            car_length: Some(8),
            departure: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(8, minute, 0)
                .unwrap(),
        }
    }

    #[test]
    fn keeps_feed_order() {
        let mut live = LiveDepartures::empty();
        live.push(abbr("MONT"), estimate("DALY", 7));
        live.push(abbr("MONT"), estimate("DALY", 3));
        live.push(abbr("MONT"), estimate("SFIA", 5));

        let to_daly = live.estimates(&abbr("MONT"), &abbr("DALY"));
        assert_eq!(to_daly.len(), 2);
        assert_eq!(to_daly[0].departure.format("%M").to_string(), "07");
        assert_eq!(to_daly[1].departure.format("%M").to_string(), "03");

        assert_eq!(live.station_count(), 1);
        assert_eq!(live.estimate_count(), 3);
        assert_eq!(live.departing(&abbr("MONT")).count(), 2);
    }

    #[test]
    fn missing_keys_are_empty() {
        let live = LiveDepartures::empty();
        assert!(live.is_empty());
        assert!(live.generated_at().is_none());
        assert!(live.estimates(&abbr("MONT"), &abbr("DALY")).is_empty());
        assert_eq!(live.departing(&abbr("MONT")).count(), 0);
    }
}
