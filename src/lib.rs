pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod transport;

pub use audio::{
    AudioBuffer, AudioFrame, AudioSink, CaptureSource, OutputClock, PlaybackScheduler,
    ScheduledChunk, SourceId, SystemClock, TimerSink, WavSource,
};
pub use config::Config;
pub use error::SessionError;
pub use http::{create_router, AppState};
pub use session::{SessionState, SessionStats, VoiceSession};
pub use transport::{
    ClientMessage, LiveTransport, OutfitSuggestion, ServerEvent, ServerMessage, WsTransport,
    OUTFIT_TOOL,
};
