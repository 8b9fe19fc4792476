//! State management module
//!
//! Core session state: the countdown timer, the per-group registry, the
//! session error taxonomy, and the shared server state handed to the HTTP
//! layer.

pub mod app_state;
pub mod error;
pub mod registry;
pub mod timer;

// Re-export main types
pub use app_state::AppState;
pub use error::SessionError;
pub use registry::{GroupId, SessionRegistry};
pub use timer::{CompletionAction, Timer, TimerSnapshot};
