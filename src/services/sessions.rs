//! Session orchestration
//!
//! The protocol between the registry, the timers, and the mute controller:
//! starting a session mutes the group, pausing lifts the mute, resuming
//! re-applies it, and completion unmutes and retires the session.

use std::{sync::Arc, time::Duration};

use futures::FutureExt;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::mute::MuteController;
use crate::state::{GroupId, SessionError, SessionRegistry, TimerSnapshot};

/// Broadcast to interested parties when a session changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The countdown ran out: the group was unmuted and the session retired.
    Completed { group: GroupId },
}

/// Drives the start/pause/resume protocol for every group.
pub struct SessionService {
    registry: Arc<SessionRegistry>,
    controller: Arc<dyn MuteController>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionService {
    pub fn new(registry: Arc<SessionRegistry>, controller: Arc<dyn MuteController>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            registry,
            controller,
            events,
        }
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Start a countdown for `group`: mute everyone in its voice channels,
    /// then schedule the unmute-and-retire action for when the countdown
    /// runs out. A failed mute leaves no session behind.
    pub async fn start_timer(
        &self,
        group: GroupId,
        seconds: u64,
    ) -> Result<TimerSnapshot, SessionError> {
        if seconds == 0 {
            return Err(SessionError::InvalidDuration);
        }
        if self.registry.contains(group) {
            return Err(SessionError::AlreadyActive);
        }
        if !self.controller.mute_all(group).await {
            return Err(SessionError::MuteFailed);
        }

        let registry = Arc::clone(&self.registry);
        let controller = Arc::clone(&self.controller);
        let events = self.events.clone();
        let on_complete = Box::new(move || {
            async move {
                if !controller.unmute_all(group).await {
                    warn!(
                        group,
                        "unmute after completion failed; group mute state is indeterminate"
                    );
                }
                registry.remove(group);
                info!(group, "timer completed, group unmuted");
                if events.send(SessionEvent::Completed { group }).is_err() {
                    debug!(group, "no listeners for completion event");
                }
            }
            .boxed()
        });

        let timer = self
            .registry
            .start_session(group, Duration::from_secs(seconds), on_complete)?;
        Ok(timer.snapshot())
    }

    /// Pause the countdown and lift the mute. A failed unmute still leaves
    /// the timer paused: the request's state change wins over the external
    /// one, and the caller learns the mute state is indeterminate.
    pub async fn pause_timer(&self, group: GroupId) -> Result<(), SessionError> {
        self.registry.pause_session(group)?;
        info!(group, "timer paused");
        if !self.controller.unmute_all(group).await {
            return Err(SessionError::UnmuteFailed);
        }
        Ok(())
    }

    /// Re-mute the group and unfreeze the countdown. The mute happens first,
    /// so a failed mute leaves the session paused rather than running
    /// unmuted. Returns the number of whole ticks spent paused.
    pub async fn resume_timer(&self, group: GroupId) -> Result<u64, SessionError> {
        let timer = self.registry.lookup(group)?;
        if !timer.is_paused() {
            return Err(SessionError::NotPaused);
        }
        if !self.controller.mute_all(group).await {
            return Err(SessionError::MuteFailed);
        }
        let paused_ticks = self.registry.resume_session(group)?;
        info!(group, paused_ticks, "timer resumed");
        Ok(paused_ticks)
    }

    /// Snapshot of one group's countdown.
    pub fn status(&self, group: GroupId) -> Result<TimerSnapshot, SessionError> {
        Ok(self.registry.lookup(group)?.snapshot())
    }

    pub fn active_groups(&self) -> Vec<GroupId> {
        self.registry.active_groups()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::time::sleep;

    const GROUP: GroupId = 42;

    /// Controller double with fixed answers.
    struct ScriptedController {
        mute_ok: bool,
        unmute_ok: bool,
    }

    #[async_trait]
    impl MuteController for ScriptedController {
        async fn mute_all(&self, _group: GroupId) -> bool {
            self.mute_ok
        }

        async fn unmute_all(&self, _group: GroupId) -> bool {
            self.unmute_ok
        }
    }

    fn service(mute_ok: bool, unmute_ok: bool) -> SessionService {
        SessionService::new(
            Arc::new(SessionRegistry::new()),
            Arc::new(ScriptedController { mute_ok, unmute_ok }),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_is_rejected_before_any_mutation() {
        let service = service(true, true);
        assert_eq!(
            service.start_timer(GROUP, 0).await.unwrap_err(),
            SessionError::InvalidDuration
        );
        assert_eq!(service.status(GROUP).unwrap_err(), SessionError::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_mute_leaves_no_session_behind() {
        let service = service(false, true);
        assert_eq!(
            service.start_timer(GROUP, 5).await.unwrap_err(),
            SessionError::MuteFailed
        );
        assert_eq!(service.status(GROUP).unwrap_err(), SessionError::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_unmute_on_pause_still_records_paused() {
        let service = service(true, false);
        service.start_timer(GROUP, 30).await.unwrap();

        assert_eq!(
            service.pause_timer(GROUP).await.unwrap_err(),
            SessionError::UnmuteFailed
        );
        assert!(service.status(GROUP).unwrap().paused);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_mute_on_resume_keeps_session_paused() {
        let registry = Arc::new(SessionRegistry::new());
        let service = SessionService::new(
            Arc::clone(&registry),
            Arc::new(ScriptedController {
                mute_ok: false,
                unmute_ok: true,
            }),
        );

        // Seed a paused session directly; the scripted controller would
        // reject the start.
        registry
            .start_session(
                GROUP,
                Duration::from_secs(30),
                Box::new(|| futures::future::ready(()).boxed()),
            )
            .unwrap();
        registry.pause_session(GROUP).unwrap();

        assert_eq!(
            service.resume_timer(GROUP).await.unwrap_err(),
            SessionError::MuteFailed
        );
        assert!(service.status(GROUP).unwrap().paused);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_on_running_timer_reports_not_paused() {
        let service = service(true, true);
        service.start_timer(GROUP, 30).await.unwrap();
        assert_eq!(
            service.resume_timer(GROUP).await.unwrap_err(),
            SessionError::NotPaused
        );
    }

    #[tokio::test(start_paused = true)]
    async fn completion_retires_the_session_and_broadcasts() {
        let service = service(true, true);
        let mut events = service.subscribe();

        service.start_timer(GROUP, 2).await.unwrap();
        sleep(Duration::from_secs(2) + Duration::from_millis(50)).await;

        assert_eq!(service.status(GROUP).unwrap_err(), SessionError::NotFound);
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::Completed { group: GROUP }
        );
    }
}
