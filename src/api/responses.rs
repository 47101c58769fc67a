//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    boundary::PostedNotice,
    monitor::ActivityKind,
    state::{Phase, Session},
};

/// API response structure for session and activity endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: Option<Session>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, session: Option<Session>) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            session,
        }
    }

    /// Create a response for an active session
    pub fn active(message: String, session: Session) -> Self {
        Self::new("active".to_string(), message, Some(session))
    }

    /// Create a response with no session attached
    pub fn inactive(message: String) -> Self {
        Self::new("inactive".to_string(), message, None)
    }
}

/// Status response with session, phase and countdown information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub session: Option<Session>,
    pub phase: Option<Phase>,
    pub countdown_active: bool,
    pub remaining_seconds: Option<u64>,
    pub redirect_to: Option<String>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_activity: Option<ActivityKind>,
    pub last_activity_time: Option<DateTime<Utc>>,
}

/// Active notices response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticesResponse {
    pub count: usize,
    pub notices: Vec<PostedNotice>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: "1.1.0".to_string(),
        }
    }
}
