//! Live voice session management
//!
//! This module provides the `VoiceSession` abstraction that manages:
//! - The connection lifecycle state machine
//! - Microphone capture and outbound streaming
//! - Gapless playback of response audio
//! - The outfit-suggestion tool contract
//! - Observable state, amplitude, transcript, and outfit values

mod session;
mod state;
mod stats;

pub use session::VoiceSession;
pub use state::SessionState;
pub use stats::SessionStats;
