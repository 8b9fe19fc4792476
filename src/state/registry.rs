//! Session registry: at most one live timer per group

use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use super::error::SessionError;
use super::timer::{CompletionAction, Timer};

/// Identifier of one group (one independent community/server).
pub type GroupId = u64;

/// Maps each group to its single active countdown.
///
/// The map is sharded, so operations on different groups never contend on a
/// global lock; duplicate-pause and duplicate-resume detection happens inside
/// the timer's own lock, so same-group control calls cannot tear its flags.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<GroupId, Timer>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Create a timer for `group` and start its run loop in the background.
    /// The caller gets the handle back immediately; completion is signalled
    /// through the supplied action, which is also responsible for calling
    /// [`remove`](SessionRegistry::remove) — the timer itself never touches
    /// the registry.
    pub fn start_session(
        &self,
        group: GroupId,
        duration: Duration,
        on_complete: CompletionAction,
    ) -> Result<Timer, SessionError> {
        match self.sessions.entry(group) {
            Entry::Occupied(_) => Err(SessionError::AlreadyActive),
            Entry::Vacant(slot) => {
                let timer = Timer::new(duration, on_complete);
                slot.insert(timer.clone());
                info!(group, seconds = duration.as_secs(), "session started");

                let runner = timer.clone();
                tokio::spawn(async move { runner.run().await });
                Ok(timer)
            }
        }
    }

    /// Handle of the group's active timer.
    pub fn lookup(&self, group: GroupId) -> Result<Timer, SessionError> {
        self.sessions
            .get(&group)
            .map(|entry| entry.value().clone())
            .ok_or(SessionError::NotFound)
    }

    pub fn contains(&self, group: GroupId) -> bool {
        self.sessions.contains_key(&group)
    }

    /// Retire a finished session. Safe to call for a group that was already
    /// removed, and safe to race with a `lookup` on the same key.
    pub fn remove(&self, group: GroupId) {
        if self.sessions.remove(&group).is_some() {
            debug!(group, "session removed");
        }
    }

    /// Freeze the group's countdown.
    pub fn pause_session(&self, group: GroupId) -> Result<(), SessionError> {
        let timer = self.lookup(group)?;
        if timer.pause() {
            Ok(())
        } else {
            Err(SessionError::AlreadyPaused)
        }
    }

    /// Unfreeze the group's countdown and report how many whole ticks it
    /// spent paused.
    pub fn resume_session(&self, group: GroupId) -> Result<u64, SessionError> {
        let timer = self.lookup(group)?;
        timer.resume().ok_or(SessionError::NotPaused)
    }

    pub fn active_groups(&self) -> Vec<GroupId> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }
}
