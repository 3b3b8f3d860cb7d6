use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a live voice session.
///
/// Idle → Connecting → Listening ⇄ Speaking, with Error reachable from any
/// state on a transport failure and Idle on clean closure. Idle and Error
/// are only left by a fresh user-initiated connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Connecting,
    /// Session open, microphone attached, nothing playing.
    Listening,
    /// Response audio is scheduled or playing.
    Speaking,
    Error,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Listening => "listening",
            SessionState::Speaking => "speaking",
            SessionState::Error => "error",
        };
        f.write_str(name)
    }
}
