//! Navigation boundary

use std::sync::Mutex;

use tracing::{info, warn};

/// Navigation surface used to send the user somewhere after a forced logout
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Records the pending redirect target for clients to observe
///
/// The service cannot move a browser by itself; it exposes the target via
/// `/status` and the front end follows it.
#[derive(Debug, Default)]
pub struct RedirectSink {
    target: Mutex<Option<String>>,
}

impl RedirectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The redirect target recorded by the last forced logout, if any
    pub fn pending(&self) -> Option<String> {
        self.target.lock().ok().and_then(|t| t.clone())
    }

    /// Clear the pending redirect, typically when a new session begins
    pub fn clear(&self) {
        if let Ok(mut target) = self.target.lock() {
            *target = None;
        }
    }
}

impl Navigator for RedirectSink {
    fn redirect(&self, path: &str) {
        info!("Redirecting client to {}", path);
        match self.target.lock() {
            Ok(mut target) => *target = Some(path.to_string()),
            Err(e) => warn!("Failed to lock redirect target: {}", e),
        }
    }
}
