//! Typed failures for session control operations

use thiserror::Error;

/// Everything that can go wrong while driving a group's session. None of
/// these are fatal to the process; each maps to a caller-facing report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A timer is already running for the group.
    #[error("a timer is already running for this group")]
    AlreadyActive,

    /// No timer is running for the group.
    #[error("no timer is running for this group")]
    NotFound,

    /// The timer is already paused.
    #[error("the timer is already paused")]
    AlreadyPaused,

    /// The timer is not paused.
    #[error("the timer is not paused")]
    NotPaused,

    /// Rejected before any state mutation.
    #[error("timer duration must be a positive number of seconds")]
    InvalidDuration,

    /// The mute pass gave up partway through; the group's mute state is
    /// indeterminate, not untouched.
    #[error("failed to mute every member in the group's voice channels")]
    MuteFailed,

    /// The unmute pass gave up partway through.
    #[error("failed to unmute every member in the group's voice channels")]
    UnmuteFailed,
}
