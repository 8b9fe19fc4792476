//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    mute::{ChannelId, MemberId},
    state::{AppState, GroupId, SessionError},
};

use super::responses::{ApiResponse, HealthResponse, StatusResponse, TimerResponse};

type ApiError = (StatusCode, Json<ApiResponse>);

fn session_error(err: SessionError) -> ApiError {
    let status = match err {
        SessionError::NotFound => StatusCode::NOT_FOUND,
        SessionError::InvalidDuration => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::AlreadyActive | SessionError::AlreadyPaused | SessionError::NotPaused => {
            StatusCode::CONFLICT
        }
        SessionError::MuteFailed | SessionError::UnmuteFailed => StatusCode::BAD_GATEWAY,
    };
    (status, Json(ApiResponse::error(err.to_string())))
}

#[derive(Debug, Deserialize)]
pub struct StartTimerRequest {
    /// Countdown length in seconds.
    pub seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub member: MemberId,
    #[serde(default = "default_manageable")]
    pub manageable: bool,
}

fn default_manageable() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub member: MemberId,
}

/// Handle POST /timer/:group_id/start - Mute the group and start a countdown
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(group): Path<GroupId>,
    Json(request): Json<StartTimerRequest>,
) -> Result<Json<TimerResponse>, ApiError> {
    let snapshot = state
        .service
        .start_timer(group, request.seconds)
        .await
        .map_err(session_error)?;

    info!(group, seconds = request.seconds, "start-timer accepted");
    Ok(Json(TimerResponse::from_snapshot(group, snapshot)))
}

/// Handle POST /timer/:group_id/pause - Freeze the countdown and unmute
pub async fn pause_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(group): Path<GroupId>,
) -> Result<Json<TimerResponse>, ApiError> {
    state
        .service
        .pause_timer(group)
        .await
        .map_err(session_error)?;

    let snapshot = state.service.status(group).map_err(session_error)?;
    Ok(Json(TimerResponse::from_snapshot(group, snapshot)))
}

/// Handle POST /timer/:group_id/resume - Re-mute the group and unfreeze
pub async fn resume_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(group): Path<GroupId>,
) -> Result<Json<TimerResponse>, ApiError> {
    let paused_ticks = state
        .service
        .resume_timer(group)
        .await
        .map_err(session_error)?;

    info!(group, paused_ticks, "resume-timer accepted");
    let snapshot = state.service.status(group).map_err(session_error)?;
    Ok(Json(TimerResponse::from_snapshot(group, snapshot)))
}

/// Handle GET /timer/:group_id - Inspect one countdown
pub async fn timer_status_handler(
    State(state): State<Arc<AppState>>,
    Path(group): Path<GroupId>,
) -> Result<Json<TimerResponse>, ApiError> {
    let snapshot = state.service.status(group).map_err(session_error)?;
    Ok(Json(TimerResponse::from_snapshot(group, snapshot)))
}

/// Handle POST /group/:group_id/channel/:channel_id/join - Seat a member
pub async fn join_channel_handler(
    State(state): State<Arc<AppState>>,
    Path((group, channel)): Path<(GroupId, ChannelId)>,
    Json(request): Json<JoinRequest>,
) -> Json<ApiResponse> {
    state
        .roster
        .join(group, channel, request.member, request.manageable);
    Json(ApiResponse::ok(format!(
        "member {} joined channel {}",
        request.member, channel
    )))
}

/// Handle POST /group/:group_id/channel/:channel_id/leave - Remove a member
pub async fn leave_channel_handler(
    State(state): State<Arc<AppState>>,
    Path((group, channel)): Path<(GroupId, ChannelId)>,
    Json(request): Json<LeaveRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    if state.roster.leave(group, channel, request.member) {
        Ok(Json(ApiResponse::ok(format!(
            "member {} left channel {}",
            request.member, channel
        ))))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("member is not in that channel")),
        ))
    }
}

/// Handle GET /group/:group_id/roster - Current voice occupancy of a group
pub async fn group_roster_handler(
    State(state): State<Arc<AppState>>,
    Path(group): Path<GroupId>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "group": group,
        "channels": state.roster.group_snapshot(group),
    }))
}

/// Handle GET /status - Return every active session and server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let active_sessions = state
        .service
        .active_groups()
        .into_iter()
        .filter_map(|group| {
            // A session can complete between listing and snapshotting.
            state
                .service
                .status(group)
                .ok()
                .map(|snapshot| TimerResponse::from_snapshot(group, snapshot))
        })
        .collect();

    Json(StatusResponse {
        active_sessions,
        uptime: state.uptime(),
        host: state.host.clone(),
        port: state.port,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
