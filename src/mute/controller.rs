//! Boundary contract for the bulk mute/unmute collaborator

use async_trait::async_trait;

use crate::state::GroupId;

/// Applies a mute or unmute action to every member currently sitting in any
/// of a group's voice-capable channels.
///
/// Implementations are best-effort: they stop at the first member that cannot
/// be changed and return `false` without rolling back members already
/// changed. A `false` result therefore means the group's mute state is
/// indeterminate, not untouched. Per-member failures are logged, never
/// enumerated to the caller.
#[async_trait]
pub trait MuteController: Send + Sync {
    /// Mute every reachable member of the group.
    async fn mute_all(&self, group: GroupId) -> bool;

    /// Unmute every reachable member of the group.
    async fn unmute_all(&self, group: GroupId) -> bool;
}
