mod app;
mod feedback;

use anyhow::Result;
use app::App;
use arcoach_config::AppConfig;
use arcoach_feed::sim::SimulatedSession;
use arcoach_feed::FeedClient;
use arcoach_history::{InMemorySessionStore, SessionRepository, TomlSessionStore};
use feedback::LogFeedback;
use tracing::{error, info, warn};

/// Pace of the simulated AR session.
const SIMULATED_FRAME_RATE: f32 = 60.0;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "arcoach=info,arcoach_placement=info,arcoach_exercise=info,arcoach_trail=info,arcoach_history=info,arcoach_feed=info".into()
            }),
        )
        .init();

    info!("AR coach starting");

    // Load config.
    let config = arcoach_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    info!(
        history_size = config.placement.history_size,
        stability_threshold = config.placement.stability_threshold,
        start_height = config.exercise.start_height,
        "Config loaded"
    );

    // Session history (fall back to memory if there is nowhere to write).
    let store: Box<dyn SessionRepository> = match arcoach_config::sessions_path() {
        Ok(path) => {
            info!(?path, "Using session history file");
            Box::new(TomlSessionStore::new(path))
        }
        Err(e) => {
            warn!(?e, "No session history location, keeping sessions in memory");
            Box::new(InMemorySessionStore::new())
        }
    };

    let session = SimulatedSession::new(&app::simulation_params(&config));
    let mut feed = FeedClient::simulated(session, SIMULATED_FRAME_RATE);

    let mut app = App::new(&config, store, Box::new(LogFeedback::default()));
    while let Some(event) = feed.next_event().await {
        app.handle(event);
    }

    app.log_summary();

    if let Err(e) = arcoach_config::save_config(&config) {
        error!(?e, "Failed to save config");
    }

    Ok(())
}
