//! Orchestration services
//!
//! This module contains the session service that drives the start/pause/
//! resume protocol between the registry and the mute controller.

pub mod sessions;

// Re-export main types
pub use sessions::{SessionEvent, SessionService};
