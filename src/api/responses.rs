//! API response structures

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::{GroupId, TimerSnapshot};

/// Envelope for acknowledgements and errors.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    fn new(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a success response
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new("ok", message)
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("error", message)
    }
}

/// One group's countdown as reported over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct TimerResponse {
    pub group: GroupId,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub paused: bool,
    pub paused_ticks: u64,
    pub timestamp: DateTime<Utc>,
}

impl TimerResponse {
    pub fn from_snapshot(group: GroupId, snapshot: TimerSnapshot) -> Self {
        Self {
            group,
            total_seconds: snapshot.total.as_secs(),
            remaining_seconds: snapshot.remaining.as_secs(),
            paused: snapshot.paused,
            paused_ticks: snapshot.paused_ticks,
            timestamp: Utc::now(),
        }
    }
}

/// Server-wide status with every active session.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub active_sessions: Vec<TimerResponse>,
    pub uptime: String,
    pub host: String,
    pub port: u16,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
