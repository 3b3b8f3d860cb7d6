use super::state::SessionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a live session's counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: String,

    pub state: SessionState,

    /// When the session was established
    pub connected_at: DateTime<Utc>,

    /// Seconds since the session was established
    pub duration_secs: f64,

    /// Microphone frames forwarded to the transport
    pub frames_sent: usize,

    /// Response audio chunks accepted by the playback scheduler
    pub chunks_played: usize,

    /// Length of the accumulated transcript
    pub transcript_chars: usize,
}
