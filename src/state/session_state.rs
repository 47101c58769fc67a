//! Session state structure and management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A currently authenticated session as seen by this service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier for the session instance
    pub id: String,
    /// Timestamp when the session was started
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session with a timestamp-derived identifier
    pub fn start() -> Self {
        let started_at = Utc::now();
        Self {
            id: format!("sess-{}", started_at.timestamp_millis()),
            started_at,
        }
    }
}

/// Session state structure - holds the current session, if any
///
/// "No session" is a normal state, not an error. The idle monitor consults
/// this record before arming any countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session: Option<Session>,
}

impl SessionState {
    /// Create a new SessionState with no active session
    pub fn new() -> Self {
        Self { session: None }
    }

    /// Check if a session is currently active
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Replace any current session with a fresh one, returning it
    pub fn begin(&mut self) -> Session {
        let session = Session::start();
        self.session = Some(session.clone());
        session
    }

    /// End the current session, returning it if one existed
    pub fn end(&mut self) -> Option<Session> {
        self.session.take()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
