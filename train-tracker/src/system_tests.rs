//! End-to-end scenarios for the train system.

use super::*;
use crate::domain::{LiveEstimate, TripIndex};
use crate::feed::MockFeed;
use crate::network::RouteId;
use crate::network::fixtures::*;

fn system() -> TrainSystem {
    TrainSystem::build(
        station_records(),
        vec![southbound(), northbound()],
        DurationPolicy::Strict,
    )
    .unwrap()
}

fn id(route: usize, trip: u32) -> TrainId {
    TrainId {
        route: RouteId(route),
        trip: TripIndex(trip),
    }
}

fn snapshot(entries: &[(&str, &str, Direction, NaiveDateTime)]) -> LiveDepartures {
    let mut live = LiveDepartures::new(at(8, 0, 0));
    for (station, dest, direction, departure) in entries {
        live.push(
            abbr(station),
            LiveEstimate {
                destination: abbr(dest),
                direction: *direction,
                platform: None,
                car_length: Some(8),
                departure: *departure,
            },
        );
    }
    live
}

#[test]
fn one_train_per_trip() {
    let sys = system();
    assert_eq!(sys.trains().len(), 3);
    assert!(sys.train(id(0, 0)).is_some());
    assert!(sys.train(id(0, 1)).is_some());
    assert!(sys.train(id(1, 0)).is_some());
    assert!(sys.train(id(1, 1)).is_none());
    assert!(sys.last_tick().is_none());
}

#[test]
fn scheduled_track_at_eight_oh_six() {
    let mut sys = system();
    let summary = sys.apply_tick(at(8, 6, 0), Ok(LiveDepartures::empty()));

    assert!(summary.feed_available);
    assert_eq!(summary.active, 1);
    assert_eq!(summary.matched, 0);

    let train = sys.train(id(0, 0)).unwrap();
    let bc = sys
        .network()
        .segment_between(&abbr("BBBB"), &abbr("CCCC"))
        .unwrap();
    assert_eq!(train.scheduled().state.segment(), Some(bc.id()));
    assert!((train.scheduled().progress - 60.0 / 330.0).abs() < 1e-9);

    // Nothing in the feed: observed follows the timetable
    assert_eq!(train.real(), train.scheduled());

    // Trains outside their windows are pinned
    let later = sys.train(id(0, 1)).unwrap();
    assert!(later.is_not_started());
    assert_eq!(later.scheduled().progress, 0.0);
    assert_eq!(later.real(), later.scheduled());
}

#[test]
fn observed_waiting_from_live_estimate() {
    let mut sys = system();
    let live = snapshot(&[("CCCC", "DDDD", Direction::South, at(8, 11, 15))]);
    let summary = sys.apply_tick(at(8, 10, 50), Ok(live));
    assert_eq!(summary.matched, 1);

    let train = sys.train(id(0, 0)).unwrap();
    assert_eq!(train.real().state, TrainState::Waiting { station: abbr("CCCC") });
    assert_eq!(train.car_length(), Some(8));

    let at_c = sys.trains_at_station(&abbr("CCCC"));
    assert_eq!(at_c.len(), 1);
    assert_eq!(at_c[0].id(), id(0, 0));
}

#[test]
fn late_train_observed_through_derived_arrival_window() {
    let mut sys = system();
    let live = snapshot(&[("CCCC", "DDDD", Direction::South, at(8, 11, 30))]);
    let bc = sys
        .network()
        .segment_between(&abbr("BBBB"), &abbr("CCCC"))
        .unwrap()
        .id();

    // Still approaching CCCC, which it now reaches at 08:11:00
    sys.apply_tick(at(8, 10, 45), Ok(live.clone()));
    let train = sys.train(id(0, 0)).unwrap();
    assert_eq!(train.real().state.segment(), Some(bc));
    assert!((train.real().progress - 315.0 / 330.0).abs() < 1e-9);

    // The timetable has it leaving CCCC at 08:11:00; the feed holds it there
    for (s, elapsed) in [(0, 0.0), (10, 10.0), (25, 25.0)] {
        let summary = sys.apply_tick(at(8, 11, s), Ok(live.clone()));
        assert_eq!(summary.matched, 1);

        let train = sys.train(id(0, 0)).unwrap();
        assert_eq!(train.scheduled().state.station(), None);
        assert_eq!(train.real().state, TrainState::Waiting { station: abbr("CCCC") });
        assert!((train.real().progress - elapsed / 30.0).abs() < 1e-9);
    }
    assert_eq!(sys.trains_at_station(&abbr("CCCC")).len(), 1);
}

#[test]
fn implausibly_early_estimate_never_matched() {
    let mut sys = system();
    // 61 seconds earlier than (08:11:00 - dwell)
    let live = snapshot(&[("CCCC", "DDDD", Direction::South, at(8, 9, 29))]);
    let summary = sys.apply_tick(at(8, 6, 0), Ok(live));
    assert_eq!(summary.matched, 0);
}

#[test]
fn feed_outage_keeps_previous_snapshot() {
    let mut sys = system();
    let live = snapshot(&[("CCCC", "DDDD", Direction::South, at(8, 11, 0))]);
    sys.apply_tick(at(8, 6, 0), Ok(live));
    assert_eq!(sys.live().estimate_count(), 1);
    let before = sys.train(id(0, 0)).unwrap().real().clone();

    let summary = sys.apply_tick(at(8, 7, 0), Err(FeedError::Timeout));
    assert!(!summary.feed_available);
    assert_eq!(summary.active, 1);
    assert_eq!(summary.matched, 0);
    assert_eq!(sys.live().estimate_count(), 1);

    let train = sys.train(id(0, 0)).unwrap();
    assert_eq!(train.real(), &before);
    // The timetable position still advances
    assert!(train.scheduled().progress > before.progress);
    assert_eq!(sys.last_tick(), Some(summary));
}

#[test]
fn segment_queries_respect_direction() {
    let mut sys = system();
    sys.apply_tick(at(8, 6, 0), Ok(LiveDepartures::empty()));
    let bc = sys
        .network()
        .segment_between(&abbr("BBBB"), &abbr("CCCC"))
        .unwrap()
        .id();

    assert_eq!(sys.trains_on_segment(bc, None).len(), 1);
    assert_eq!(sys.trains_on_segment(bc, Some(Direction::South)).len(), 1);
    assert!(sys.trains_on_segment(bc, Some(Direction::North)).is_empty());
    assert!(sys.trains_on_segment(SegmentId(99), None).is_empty());
    assert_eq!(sys.active_trains().count(), 1);
}

#[test]
fn short_turn_trip_uses_own_stops() {
    let mut sys = system();
    sys.apply_tick(at(8, 43, 0), Ok(LiveDepartures::empty()));
    let train = sys.train(id(0, 1)).unwrap();
    assert_eq!(train.stops(), &[abbr("AAAA"), abbr("BBBB"), abbr("DDDD")]);
    assert_eq!(train.next_stop(&abbr("BBBB")), Some(abbr("DDDD")));

    let cd = sys
        .network()
        .segment_between(&abbr("CCCC"), &abbr("DDDD"))
        .unwrap();
    assert_eq!(train.scheduled().state.segment(), Some(cd.id()));
}

#[test]
fn every_tick_keeps_progress_in_range() {
    let mut sys = system();
    let mut now = at(7, 30, 0);
    while now < at(9, 30, 0) {
        sys.apply_tick(now, Ok(LiveDepartures::empty()));
        for train in sys.trains() {
            for pos in [train.scheduled(), train.real()] {
                assert!((0.0..=1.0).contains(&pos.progress), "{} at {now}", train.id());
                match pos.state {
                    TrainState::NotStarted { .. } => assert_eq!(pos.progress, 0.0),
                    TrainState::Ended { .. } => assert_eq!(pos.progress, 1.0),
                    _ => {}
                }
            }
        }
        now += chrono::Duration::seconds(20);
    }
}

#[test]
fn bad_trip_is_skipped() {
    let (record, mut trips) = southbound();
    trips.insert(TripIndex(7), trip(&[("AAAA", at(9, 0, 0))]));
    let sys = TrainSystem::build(station_records(), vec![(record, trips)], DurationPolicy::Strict)
        .unwrap();
    assert_eq!(sys.trains().len(), 2);
    assert!(sys.train(id(0, 7)).is_none());
}

#[tokio::test]
async fn load_from_feed() {
    let feed = mock_feed();
    let mut sys = TrainSystem::load(&feed, DurationPolicy::Strict).await.unwrap();
    assert_eq!(sys.network().routes().len(), 2);
    assert_eq!(sys.network().segments().len(), 3);
    assert_eq!(sys.trains().len(), 3);

    feed.push_live(snapshot(&[("CCCC", "DDDD", Direction::South, at(8, 11, 15))]))
        .await;
    let live = feed.fetch_live_departures(None, None).await;
    let summary = sys.apply_tick(at(8, 10, 50), live);
    assert_eq!(summary.matched, 1);
}

#[tokio::test]
async fn load_fails_on_missing_schedule() {
    let feed = MockFeed::new(
        station_records(),
        vec![route_record(5, &["AAAA", "BBBB"], Direction::South)],
        std::collections::HashMap::new(),
    );
    let err = TrainSystem::load(&feed, DurationPolicy::Strict).await.unwrap_err();
    assert!(matches!(err, SystemError::Feed(_)));
}
