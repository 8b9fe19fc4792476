//! Shared server state handed to the HTTP layer

use std::{sync::Arc, time::Instant};

use crate::mute::VoiceRoster;
use crate::services::SessionService;

/// Everything the HTTP handlers need: the session service, the voice roster,
/// and server metadata for the status endpoint.
pub struct AppState {
    pub service: Arc<SessionService>,
    pub roster: Arc<VoiceRoster>,
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
}

impl AppState {
    pub fn new(
        service: Arc<SessionService>,
        roster: Arc<VoiceRoster>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            service,
            roster,
            start_time: Instant::now(),
            port,
            host,
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
