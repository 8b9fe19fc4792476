//! Completion announcement background task

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use crate::services::SessionEvent;

/// Logs every session completion. Stands where a chat announcement to the
/// originating channel would go in a full deployment.
pub async fn completion_watch_task(mut events: broadcast::Receiver<SessionEvent>) {
    info!("Starting completion watch task");

    loop {
        match events.recv().await {
            Ok(SessionEvent::Completed { group }) => {
                info!(group, "timer completed; all voice members unmuted");
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "completion watcher fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
