//! Monitor phase and published countdown state

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Lifecycle phase of the idle monitor for the current session
///
/// The automatic path is always `Watching` -> `Warning` -> `Terminated`;
/// `Terminated` is terminal for a session instance and only a fresh session
/// returns the monitor to `Watching`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Session active, counting down toward the warning
    Watching,
    /// Warning shown, forced logout pending unless explicitly cancelled
    Warning,
    /// Forced logout has executed for this session instance
    Terminated,
}

/// Snapshot of the idle monitor, published over a watch channel
///
/// A dormant monitor (no active session) has no phase and no deadlines.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub phase: Option<Phase>,
    /// When the warning will be shown, absent activity
    pub main_deadline: Option<Instant>,
    /// When forced logout fires, absent the stay-connected action
    pub warning_deadline: Option<Instant>,
}

impl MonitorState {
    /// Create a dormant monitor state
    pub fn new() -> Self {
        Self {
            phase: None,
            main_deadline: None,
            warning_deadline: None,
        }
    }

    /// Check if a countdown is currently armed
    pub fn is_counting(&self) -> bool {
        matches!(self.phase, Some(Phase::Watching) | Some(Phase::Warning))
    }

    /// Seconds until the next deadline for the current phase, if armed
    pub fn remaining_seconds(&self) -> Option<u64> {
        let deadline = match self.phase? {
            Phase::Watching => self.main_deadline?,
            Phase::Warning => self.warning_deadline?,
            Phase::Terminated => return None,
        };
        Some(deadline.saturating_duration_since(Instant::now()).as_secs())
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new()
    }
}
