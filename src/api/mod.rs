//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/:group_id/start", post(start_timer_handler))
        .route("/timer/:group_id/pause", post(pause_timer_handler))
        .route("/timer/:group_id/resume", post(resume_timer_handler))
        .route("/timer/:group_id", get(timer_status_handler))
        .route(
            "/group/:group_id/channel/:channel_id/join",
            post(join_channel_handler),
        )
        .route(
            "/group/:group_id/channel/:channel_id/leave",
            post(leave_channel_handler),
        )
        .route("/group/:group_id/roster", get(group_roster_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
