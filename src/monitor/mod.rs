//! Idle session monitor module
//!
//! The monitor owns the inactivity countdown for the current session and is
//! the only writer of the monitor phase.

pub mod events;
pub mod idle_monitor;

// Re-export main types
pub use events::{ActivityKind, MonitorCommand};
pub use idle_monitor::{
    idle_monitor_task, spawn_idle_monitor, IdleMonitor, MonitorConfig, MonitorDeps, MonitorHandle,
};
