//! Mute controller boundary and its in-process implementation

pub mod controller;
pub mod roster;

// Re-export main types
pub use controller::MuteController;
pub use roster::{ChannelId, MemberId, MemberState, RosterError, RosterMuteController, VoiceRoster};
