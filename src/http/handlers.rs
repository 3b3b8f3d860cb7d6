use super::state::AppState;
use crate::audio::WavSource;
use crate::error::SessionError;
use crate::session::VoiceSession;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    /// Optional WAV file to use as the capture source (overrides the
    /// server-wide default)
    pub capture_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: crate::session::SessionState,
    pub amplitude: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/connect
/// Open a live session (one at a time)
pub async fn connect(
    State(state): State<AppState>,
    Json(req): Json<ConnectRequest>,
) -> impl IntoResponse {
    {
        let session = state.session.read().await;
        if session.is_some() {
            return error_response(
                StatusCode::CONFLICT,
                "a session is already active".to_string(),
            );
        }
    }

    let capture_path = match req.capture_path.or_else(|| state.capture_path.clone()) {
        Some(p) => p,
        None => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "no capture source configured".to_string(),
            )
        }
    };

    let source = match WavSource::open(&capture_path, state.config.audio.frame_samples) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to open capture source: {e}");
            let message = format!("capture source unavailable: {e}");
            *state.last_error.write().await = Some(message.clone());
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    };

    match VoiceSession::connect(&state.config, Box::new(source)).await {
        Ok(session) => {
            info!("session connected: {}", session.id());
            let response = ConnectResponse {
                session_id: session.id().to_string(),
                status: "connecting".to_string(),
            };
            *state.session.write().await = Some(session);
            *state.last_error.write().await = None;
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e @ SessionError::MissingCredential) => {
            error!("{e}");
            *state.last_error.write().await = Some(e.to_string());
            error_response(StatusCode::UNAUTHORIZED, e.to_string())
        }
        Err(e) => {
            error!("failed to connect session: {e}");
            *state.last_error.write().await = Some(e.to_string());
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

/// POST /session/disconnect
/// Tear down the active session
pub async fn disconnect(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.write().await.take();

    match session {
        Some(session) => {
            session.disconnect().await;
            (StatusCode::OK, Json(session.stats())).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "no active session".to_string()),
    }
}

/// POST /session/text
/// Send a typed message to the model (resets the transcript)
pub async fn send_text(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> impl IntoResponse {
    let session = state.session.read().await;

    match session.as_ref() {
        Some(session) => match session.send_text(&req.text).await {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(e) => {
                error!("failed to send text: {e}");
                error_response(StatusCode::BAD_GATEWAY, e.to_string())
            }
        },
        None => error_response(StatusCode::NOT_FOUND, "no active session".to_string()),
    }
}

/// GET /session/state
/// Current state machine position and amplitude level. A failed connect
/// attempt leaves no session behind, so its error condition is reported
/// here until a later attempt succeeds.
pub async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;

    let response = match session.as_ref() {
        Some(session) => StateResponse {
            state: session.state(),
            amplitude: session.amplitude(),
            error: None,
        },
        None => match state.last_error.read().await.clone() {
            Some(message) => StateResponse {
                state: crate::session::SessionState::Error,
                amplitude: 0.0,
                error: Some(message),
            },
            None => StateResponse {
                state: crate::session::SessionState::Idle,
                amplitude: 0.0,
                error: None,
            },
        },
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// GET /session/transcript
/// Accumulated transcript of the model's speech
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;

    let transcript = session
        .as_ref()
        .map(|s| s.transcript())
        .unwrap_or_default();

    (StatusCode::OK, Json(TranscriptResponse { transcript })).into_response()
}

/// GET /session/outfit
/// Latest outfit suggestion, if one is displayed
pub async fn get_outfit(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;

    let outfit = session.as_ref().and_then(|s| s.outfit());
    (StatusCode::OK, Json(outfit)).into_response()
}

/// POST /session/outfit/dismiss
/// Clear the displayed outfit
pub async fn dismiss_outfit(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;

    match session.as_ref() {
        Some(session) => {
            session.dismiss_outfit();
            StatusCode::NO_CONTENT.into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "no active session".to_string()),
    }
}

/// GET /session/stats
/// Session counters
pub async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;

    match session.as_ref() {
        Some(session) => (StatusCode::OK, Json(session.stats())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "no active session".to_string()),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
