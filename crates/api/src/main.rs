//! LMS console synchronizer: API server binary entrypoint.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use lms_common::config::AppConfig;
use lms_engine::processor::EventProcessor;
use lms_engine::random::{RandomSource, StdRandom};
use lms_engine::scheduler::Scheduler;
use lms_engine::simulator::{EventLog, EventSimulator, SimulatorConfig};
use lms_engine::{ActionRunner, SyncOptions, Synchronizer, SystemClock};
use lms_notifier::{BroadcastSink, FanoutSink, TracingSink};
use lms_sources::{build_fetchers, build_mutator};

use lms_api::routes::create_router;
use lms_api::state::AppState;

const DEFAULT_LOG_FILTER: &str =
    "lms_api=info,lms_engine=info,lms_sources=info,lms_notifier=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first: it selects the log format
    let config = AppConfig::from_env()?;
    lms_common::logging::init(config.log_format, DEFAULT_LOG_FILTER);

    tracing::info!("Starting LMS sync API server...");

    let fetchers = build_fetchers(&config)?;

    let broadcast = BroadcastSink::new(256);
    let sink = FanoutSink::new()
        .with(Arc::new(TracingSink))
        .with(Arc::new(broadcast.clone()));

    let clock = Arc::new(SystemClock);
    let sync = Synchronizer::new(
        fetchers,
        Arc::new(sink),
        clock.clone(),
        SyncOptions::from_config(&config),
    )?;

    let actions = ActionRunner::new(
        sync.clone(),
        build_mutator(&config)?,
        Duration::from_millis(config.fetch_timeout_ms),
    );

    let events = EventLog::new();
    let state = AppState::new(sync.clone(), actions, events.clone(), config.clone());
    tokio::spawn(state.notifications.clone().follow(broadcast.subscribe()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Staleness checks; the first tick loads every resource
    let scheduler = Scheduler::new(sync.clone(), config.scheduler_period_ms);
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx.clone()));

    let simulator_task = if config.simulator_enabled {
        let random: Box<dyn RandomSource> = match config.simulator_seed {
            Some(seed) => Box::new(StdRandom::seeded(seed)),
            None => Box::new(StdRandom::from_os()),
        };
        let simulator = EventSimulator::new(
            SimulatorConfig::from_config(&config),
            random,
            clock,
            events,
        );
        Some(tokio::spawn(
            simulator.run(EventProcessor::new(sync), shutdown_rx),
        ))
    } else {
        tracing::info!("Event simulator disabled");
        None
    };

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.api_bind_addr).await?;
    tracing::info!("API server listening on {}", config.api_bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    tracing::info!("Shutting down background tasks...");
    let _ = shutdown_tx.send(true);
    let _ = scheduler_task.await;
    if let Some(task) = simulator_task {
        let _ = task.await;
    }

    Ok(())
}
