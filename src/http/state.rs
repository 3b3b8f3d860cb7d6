use crate::config::Config;
use crate::session::VoiceSession;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    /// Default WAV file used as the capture source when a connect request
    /// does not name one
    pub capture_path: Option<String>,

    /// The active session, if any (one at a time)
    pub session: Arc<RwLock<Option<Arc<VoiceSession>>>>,

    /// Why the last connect attempt failed, when no session exists. A
    /// rejected connect never produces a session object, so the state
    /// endpoint reports the error condition from here instead.
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: Config, capture_path: Option<String>) -> Self {
        Self {
            config,
            capture_path,
            session: Arc::new(RwLock::new(None)),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}
