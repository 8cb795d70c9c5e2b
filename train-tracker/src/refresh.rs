//! Periodic refresh of the live snapshot and train positions.
//!
//! The fetch happens before the write lock is taken, so readers are only
//! blocked for the in-memory update and every train sees one snapshot.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::feed::{FeedError, TransitFeed};
use crate::system::{TickSummary, TrainSystem};

/// The train system shared between the refresh task and readers.
pub type SharedSystem = Arc<RwLock<TrainSystem>>;

/// Wrap a system for sharing.
pub fn shared(system: TrainSystem) -> SharedSystem {
    Arc::new(RwLock::new(system))
}

/// Run one refresh tick.
///
/// A fetch that errors or exceeds `timeout` counts as no new data. The
/// clock is read once, after the fetch, and used for every train.
pub async fn refresh_once<F, C>(
    system: &SharedSystem,
    feed: &F,
    timeout: Duration,
    clock: &C,
) -> TickSummary
where
    F: TransitFeed,
    C: Fn() -> NaiveDateTime,
{
    let fetched = match tokio::time::timeout(timeout, feed.fetch_live_departures(None, None)).await {
        Ok(result) => result,
        Err(_) => Err(FeedError::Timeout),
    };
    let now = clock();

    let mut guard = system.write().await;
    guard.apply_tick(now, fetched)
}

/// Refresh forever at a fixed interval.
///
/// The first tick runs immediately. Ticks missed while a slow fetch was in
/// flight are skipped rather than run back to back.
pub async fn run_refresh_loop<F, C>(
    system: SharedSystem,
    feed: F,
    interval: Duration,
    timeout: Duration,
    clock: C,
) where
    F: TransitFeed,
    C: Fn() -> NaiveDateTime,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let summary = refresh_once(&system, &feed, timeout, &clock).await;
        debug!(?summary, "Refresh complete");
    }
}
