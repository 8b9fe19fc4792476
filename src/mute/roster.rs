//! In-process voice roster and the mute controller that drives it
//!
//! The chat platform itself is an external collaborator; this roster stands
//! in for its voice state so the session protocol has real members to mute.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::controller::MuteController;
use crate::state::GroupId;

/// Identifier of one voice-capable channel.
pub type ChannelId = u64;

/// Identifier of one member.
pub type MemberId = u64;

type Channels = BTreeMap<ChannelId, BTreeMap<MemberId, MemberState>>;

/// One member's voice state as the roster sees it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MemberState {
    pub muted: bool,
    /// Whether this process is allowed to change the member. Unmanageable
    /// members stand in for the platform's permission-denied responses.
    pub manageable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("missing permission to change member {member}")]
    PermissionDenied { member: MemberId },
    #[error("member {member} is not in channel {channel}")]
    UnknownMember { channel: ChannelId, member: MemberId },
}

/// Who is sitting in which voice-capable channel, per group.
///
/// BTreeMaps keep iteration order stable, so a partial mute failure always
/// stops at the same member given the same roster.
#[derive(Debug, Default)]
pub struct VoiceRoster {
    groups: Mutex<BTreeMap<GroupId, Channels>>,
}

impl VoiceRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat a member in a voice channel, creating the group and channel
    /// entries as needed. Members join unmuted.
    pub fn join(&self, group: GroupId, channel: ChannelId, member: MemberId, manageable: bool) {
        let mut groups = self.lock();
        groups
            .entry(group)
            .or_default()
            .entry(channel)
            .or_default()
            .insert(
                member,
                MemberState {
                    muted: false,
                    manageable,
                },
            );
        debug!(group, channel, member, "member joined voice channel");
    }

    /// Remove a member from a voice channel. Returns false when the member
    /// was not there.
    pub fn leave(&self, group: GroupId, channel: ChannelId, member: MemberId) -> bool {
        let mut groups = self.lock();
        let Some(channels) = groups.get_mut(&group) else {
            return false;
        };
        let Some(members) = channels.get_mut(&channel) else {
            return false;
        };
        let left = members.remove(&member).is_some();
        if left {
            debug!(group, channel, member, "member left voice channel");
        }
        left
    }

    /// Ordered `(channel, member)` pairs for one group, snapshotted at call
    /// time. Members joining afterwards are outside the current pass.
    pub fn members_of(&self, group: GroupId) -> Vec<(ChannelId, MemberId)> {
        let groups = self.lock();
        groups
            .get(&group)
            .map(|channels| {
                channels
                    .iter()
                    .flat_map(|(channel, members)| {
                        members.keys().map(move |member| (*channel, *member))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Flip one member's mute flag.
    pub fn set_member_mute(
        &self,
        group: GroupId,
        channel: ChannelId,
        member: MemberId,
        muted: bool,
    ) -> Result<(), RosterError> {
        let mut groups = self.lock();
        let state = groups
            .get_mut(&group)
            .and_then(|channels| channels.get_mut(&channel))
            .and_then(|members| members.get_mut(&member))
            .ok_or(RosterError::UnknownMember { channel, member })?;
        if !state.manageable {
            return Err(RosterError::PermissionDenied { member });
        }
        state.muted = muted;
        Ok(())
    }

    pub fn is_muted(&self, group: GroupId, channel: ChannelId, member: MemberId) -> Option<bool> {
        let groups = self.lock();
        groups
            .get(&group)
            .and_then(|channels| channels.get(&channel))
            .and_then(|members| members.get(&member))
            .map(|state| state.muted)
    }

    /// Clone of one group's channels for the status endpoint.
    pub fn group_snapshot(&self, group: GroupId) -> Channels {
        self.lock().get(&group).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<GroupId, Channels>> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [`MuteController`] over the in-process roster.
///
/// Walks the group's channels and members in roster order and stops at the
/// first member it cannot change; members already changed stay changed.
#[derive(Debug)]
pub struct RosterMuteController {
    roster: Arc<VoiceRoster>,
}

impl RosterMuteController {
    pub fn new(roster: Arc<VoiceRoster>) -> Self {
        Self { roster }
    }

    fn apply_all(&self, group: GroupId, muted: bool) -> bool {
        let action = if muted { "mute" } else { "unmute" };
        for (channel, member) in self.roster.members_of(group) {
            if let Err(error) = self.roster.set_member_mute(group, channel, member, muted) {
                warn!(
                    group,
                    channel,
                    member,
                    action,
                    %error,
                    "bulk voice update stopped at first failure"
                );
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl MuteController for RosterMuteController {
    async fn mute_all(&self, group: GroupId) -> bool {
        self.apply_all(group, true)
    }

    async fn unmute_all(&self, group: GroupId) -> bool {
        self.apply_all(group, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP: GroupId = 7;

    fn controller_with_roster() -> (RosterMuteController, Arc<VoiceRoster>) {
        let roster = Arc::new(VoiceRoster::new());
        (RosterMuteController::new(Arc::clone(&roster)), roster)
    }

    #[tokio::test]
    async fn mutes_every_member_across_channels() {
        let (controller, roster) = controller_with_roster();
        roster.join(GROUP, 1, 10, true);
        roster.join(GROUP, 1, 11, true);
        roster.join(GROUP, 2, 12, true);

        assert!(controller.mute_all(GROUP).await);
        assert_eq!(roster.is_muted(GROUP, 1, 10), Some(true));
        assert_eq!(roster.is_muted(GROUP, 1, 11), Some(true));
        assert_eq!(roster.is_muted(GROUP, 2, 12), Some(true));

        assert!(controller.unmute_all(GROUP).await);
        assert_eq!(roster.is_muted(GROUP, 2, 12), Some(false));
    }

    #[tokio::test]
    async fn stops_at_first_unmanageable_member_without_rollback() {
        let (controller, roster) = controller_with_roster();
        roster.join(GROUP, 1, 10, true);
        roster.join(GROUP, 1, 11, false);
        roster.join(GROUP, 1, 12, true);

        assert!(!controller.mute_all(GROUP).await);

        // Member before the failure stays muted; members at and after the
        // failure were never reached.
        assert_eq!(roster.is_muted(GROUP, 1, 10), Some(true));
        assert_eq!(roster.is_muted(GROUP, 1, 11), Some(false));
        assert_eq!(roster.is_muted(GROUP, 1, 12), Some(false));
    }

    #[tokio::test]
    async fn empty_group_is_a_successful_pass() {
        let (controller, _roster) = controller_with_roster();
        assert!(controller.mute_all(GROUP).await);
        assert!(controller.unmute_all(GROUP).await);
    }

    #[test]
    fn leave_reports_presence() {
        let roster = VoiceRoster::new();
        roster.join(GROUP, 1, 10, true);

        assert!(roster.leave(GROUP, 1, 10));
        assert!(!roster.leave(GROUP, 1, 10));
        assert_eq!(roster.is_muted(GROUP, 1, 10), None);
    }

    #[test]
    fn set_mute_on_unknown_member_is_an_error() {
        let roster = VoiceRoster::new();
        assert_eq!(
            roster.set_member_mute(GROUP, 1, 10, true),
            Err(RosterError::UnknownMember {
                channel: 1,
                member: 10
            })
        );
    }
}
