//! State management module
//!
//! This module contains all state-related structures and their management logic.

pub mod app_state;
pub mod monitor_state;
pub mod session_state;

// Re-export main types
pub use app_state::AppState;
pub use monitor_state::{MonitorState, Phase};
pub use session_state::{Session, SessionState};
