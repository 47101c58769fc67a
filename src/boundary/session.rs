//! Session authority boundary

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use crate::state::{Session, SessionState};

/// The component owning authentication session state
///
/// The idle monitor only observes whether a session exists and asks for it to
/// be terminated; it never mutates session state directly. Termination may
/// fail (network error, already-expired session) and callers are expected to
/// log and carry on.
#[async_trait]
pub trait SessionAuthority: Send + Sync {
    /// Read the currently active session, if any
    fn current_session(&self) -> Option<Session>;

    /// Terminate the active session
    async fn terminate_session(&self) -> Result<(), String>;
}

/// Session authority backed by this service's own session record
#[derive(Debug)]
pub struct LocalSessionAuthority {
    state: Arc<Mutex<SessionState>>,
}

impl LocalSessionAuthority {
    pub fn new(state: Arc<Mutex<SessionState>>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl SessionAuthority for LocalSessionAuthority {
    fn current_session(&self) -> Option<Session> {
        self.state.lock().ok().and_then(|s| s.session.clone())
    }

    async fn terminate_session(&self) -> Result<(), String> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| format!("Failed to lock session state: {}", e))?;

        match state.end() {
            Some(session) => {
                info!("Session {} terminated", session.id);
                Ok(())
            }
            None => Err("no active session to terminate".to_string()),
        }
    }
}
