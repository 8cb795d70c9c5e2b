use chrono::{Local, NaiveDateTime};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use train_tracker::config::TrackerConfig;
use train_tracker::feed::BartClient;
use train_tracker::refresh::{run_refresh_loop, shared};
use train_tracker::system::TrainSystem;
use train_tracker::web::{AppState, create_router};

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = TrackerConfig::from_env()?;
    let client = BartClient::new(config.bart_config())?;

    // Topology and timetable are fetched once; failure here is fatal
    info!(base_url = %config.base_url, "Loading network");
    let system = TrainSystem::load(&client, config.duration_policy()).await?;
    let system = shared(system);

    tokio::spawn(run_refresh_loop(
        system.clone(),
        client,
        config.refresh_interval,
        config.feed_timeout,
        local_now,
    ));

    let app = create_router(AppState::new(system));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Train tracker listening");
    info!("  GET  /health                  - Status and counts");
    info!("  GET  /stations                - Stations");
    info!("  GET  /stations/:abbr/trains   - Trains at a station");
    info!("  GET  /routes                  - Routes");
    info!("  GET  /segments                - Segments");
    info!("  GET  /segments/:id/trains     - Trains on a segment");
    info!("  GET  /trains?active=true      - Trains");
    info!("  GET  /trains/:route/:trip     - One train");

    axum::serve(listener, app).await?;
    Ok(())
}
