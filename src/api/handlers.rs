//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use tracing::{error, info};

use crate::{monitor::ActivityKind, state::AppState};

use super::responses::{ApiResponse, HealthResponse, NoticesResponse, StatusResponse};

/// Request body for POST /activity
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityPayload {
    pub kind: ActivityKind,
}

/// Handle POST /session/start - Begin an authenticated session
pub async fn session_start_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.begin_session() {
        Ok(session) => {
            info!("Session start endpoint called - inactivity watchdog armed");
            Ok(Json(ApiResponse::active(
                "Session started, inactivity watchdog armed".to_string(),
                session,
            )))
        }
        Err(e) => {
            error!("Failed to start session: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /session/end - End the session from outside the monitor
pub async fn session_end_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.end_session() {
        Ok(Some(_)) => {
            info!("Session end endpoint called - session ended, watchdog torn down");
            Ok(Json(ApiResponse::inactive("Session ended".to_string())))
        }
        Ok(None) => Ok(Json(ApiResponse::inactive(
            "No active session".to_string(),
        ))),
        Err(e) => {
            error!("Failed to end session: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /activity - Report a qualifying input event
pub async fn activity_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ActivityPayload>,
) -> Result<Json<ApiResponse>, StatusCode> {
    if let Err(e) = state.record_activity(payload.kind) {
        error!("Failed to record activity: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    match state.get_session() {
        Ok(Some(session)) => Ok(Json(ApiResponse::active(
            "Activity recorded".to_string(),
            session,
        ))),
        Ok(None) => Ok(Json(ApiResponse::inactive(
            "Activity ignored, no active session".to_string(),
        ))),
        Err(e) => {
            error!("Failed to read session state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /stay-connected - Explicit keep-alive from the warning notice
pub async fn stay_connected_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    if let Err(e) = state.stay_connected() {
        error!("Failed to forward stay-connected action: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    match state.get_session() {
        Ok(Some(session)) => Ok(Json(ApiResponse::active(
            "Stay-connected request forwarded".to_string(),
            session,
        ))),
        Ok(None) => Ok(Json(ApiResponse::inactive(
            "Stay-connected ignored, no active session".to_string(),
        ))),
        Err(e) => {
            error!("Failed to read session state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return session, phase and countdown status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let session = match state.get_session() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to get session state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let monitor_state = state.monitor_state();
    let (last_activity, last_activity_time) = state.get_last_activity();

    Ok(Json(StatusResponse {
        session,
        phase: monitor_state.phase,
        countdown_active: monitor_state.is_counting(),
        remaining_seconds: monitor_state.remaining_seconds(),
        redirect_to: state.redirects.pending(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_activity,
        last_activity_time,
    }))
}

/// Handle GET /notices - Return currently visible notices
pub async fn notices_handler(State(state): State<Arc<AppState>>) -> Json<NoticesResponse> {
    let notices = state.board.snapshot();
    Json(NoticesResponse {
        count: notices.len(),
        notices,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
