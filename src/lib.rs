//! Order Silence - A state-managed HTTP server for per-group mute countdown
//! sessions
//!
//! One countdown per group gates the group's voice mute state: starting a
//! timer mutes everyone currently in the group's voice channels, pausing
//! lifts the mute, resuming re-applies it, and completion unmutes the group
//! and retires the session.

pub mod api;
pub mod config;
pub mod mute;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::{AppState, SessionRegistry};
pub use utils::signals::shutdown_signal;
