//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    boundary::{NoticeBoard, RedirectSink},
    config::Config,
    monitor::{ActivityKind, MonitorHandle},
};

use super::{MonitorState, Session, SessionState};

/// Main application state shared between the HTTP surface and the monitor
#[derive(Clone)]
pub struct AppState {
    /// Current session record, also read by the local session authority
    pub session: Arc<Mutex<SessionState>>,
    /// Command side of the idle monitor task
    pub monitor: MonitorHandle,
    /// Notification board clients poll for warnings and notices
    pub board: Arc<NoticeBoard>,
    /// Pending redirect recorded after a forced logout
    pub redirects: Arc<RedirectSink>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last qualifying activity tracking
    pub last_activity: Arc<Mutex<Option<ActivityKind>>>,
    pub last_activity_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create a new AppState around an already-spawned monitor
    pub fn new(
        config: &Config,
        monitor: MonitorHandle,
        session: Arc<Mutex<SessionState>>,
        board: Arc<NoticeBoard>,
        redirects: Arc<RedirectSink>,
    ) -> Self {
        Self {
            session,
            monitor,
            board,
            redirects,
            start_time: Instant::now(),
            port: config.port,
            host: config.host.clone(),
            last_activity: Arc::new(Mutex::new(None)),
            last_activity_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Begin a fresh authenticated session and arm the monitor
    pub fn begin_session(&self) -> Result<Session, String> {
        let mut state = self
            .session
            .lock()
            .map_err(|e| format!("Failed to lock session state: {}", e))?;
        let session = state.begin();
        drop(state);

        self.redirects.clear();
        info!("Session {} started", session.id);
        self.monitor.session_started()?;
        Ok(session)
    }

    /// End the current session by external request; tears the monitor down
    pub fn end_session(&self) -> Result<Option<Session>, String> {
        let mut state = self
            .session
            .lock()
            .map_err(|e| format!("Failed to lock session state: {}", e))?;
        let ended = state.end();
        drop(state);

        match &ended {
            Some(session) => info!("Session {} ended by client request", session.id),
            None => debug!("Session end requested with no active session"),
        }
        self.monitor.session_ended()?;
        Ok(ended)
    }

    /// Record a qualifying input event and forward it to the monitor
    pub fn record_activity(&self, kind: ActivityKind) -> Result<(), String> {
        if let Ok(mut last) = self.last_activity.lock() {
            *last = Some(kind);
        }
        if let Ok(mut last_time) = self.last_activity_time.lock() {
            *last_time = Some(Utc::now());
        }
        self.monitor.activity(kind)
    }

    /// Forward the explicit stay-connected action to the monitor
    pub fn stay_connected(&self) -> Result<(), String> {
        self.monitor.stay_connected()
    }

    /// Get the current session, if any
    pub fn get_session(&self) -> Result<Option<Session>, String> {
        self.session
            .lock()
            .map(|state| state.session.clone())
            .map_err(|e| format!("Failed to lock session state: {}", e))
    }

    /// Current published monitor state
    pub fn monitor_state(&self) -> MonitorState {
        self.monitor.snapshot()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last activity information
    pub fn get_last_activity(&self) -> (Option<ActivityKind>, Option<DateTime<Utc>>) {
        let last_activity = self.last_activity.lock().ok().and_then(|a| *a);
        let last_activity_time = self.last_activity_time.lock().ok().and_then(|t| *t);
        (last_activity, last_activity_time)
    }
}
