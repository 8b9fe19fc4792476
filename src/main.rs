//! Order Silence - A state-managed HTTP server for per-group mute countdown
//! sessions
//!
//! This is the main entry point for the order-silence application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use order_silence::{
    api::create_router,
    config::Config,
    mute::{RosterMuteController, VoiceRoster},
    services::SessionService,
    state::{AppState, SessionRegistry},
    tasks::completion_watch_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "order_silence={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!(
        "Starting order-silence server v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Configuration: host={}, port={}", config.host, config.port);

    // Wire the core: roster -> controller -> registry -> session service
    let roster = Arc::new(VoiceRoster::new());
    let controller = Arc::new(RosterMuteController::new(Arc::clone(&roster)));
    let registry = Arc::new(SessionRegistry::new());
    let service = Arc::new(SessionService::new(registry, controller));

    // Start the completion watch background task
    tokio::spawn(completion_watch_task(service.subscribe()));

    // Create HTTP router with all endpoints
    let state = Arc::new(AppState::new(
        service,
        roster,
        config.port,
        config.host.clone(),
    ));
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/:group_id/start  - Mute the group and start a countdown");
    info!("  POST /timer/:group_id/pause  - Freeze the countdown and unmute");
    info!("  POST /timer/:group_id/resume - Re-mute the group and unfreeze");
    info!("  GET  /timer/:group_id        - Inspect one countdown");
    info!("  POST /group/:gid/channel/:cid/join  - Seat a member in a voice channel");
    info!("  POST /group/:gid/channel/:cid/leave - Remove a member from a voice channel");
    info!("  GET  /group/:gid/roster      - Current voice occupancy of a group");
    info!("  GET  /status                 - Active sessions and uptime");
    info!("  GET  /health                 - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
