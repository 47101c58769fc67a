//! Monitor input events and commands

use serde::{Deserialize, Serialize};

/// The fixed set of input event classes that count as user activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    PointerDown,
    PointerMove,
    KeyDown,
    Scroll,
    TouchStart,
    Click,
}

/// Commands delivered to the idle monitor task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    /// A new authenticated session began
    SessionStarted,
    /// The session ended outside the monitor (logout button, other tab)
    SessionEnded,
    /// A qualifying input event was observed
    Activity(ActivityKind),
    /// The explicit stay-connected action from the warning notice
    StayConnected,
}
