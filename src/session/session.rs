use super::state::SessionState;
use super::stats::SessionStats;
use crate::audio::capture::{spawn_capture_task, CaptureSource};
use crate::audio::playback::{PlaybackScheduler, SourceId, SystemClock, TimerSink};
use crate::config::Config;
use crate::error::SessionError;
use crate::transport::{LiveTransport, OutfitSuggestion, ServerEvent, WsTransport, OUTFIT_TOOL};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Everything the event loop reacts to, merged onto one ordered channel:
/// transport events in arrival order, plus playback completions.
enum SessionEvent {
    Server(ServerEvent),
    PlaybackEnded(SourceId),
}

/// One live voice session: owns the transport, the playback scheduler, and
/// the capture pipeline, and publishes state, amplitude, transcript, and the
/// latest outfit as read-only observables.
///
/// Constructed at connect time, torn down at disconnect. A single event loop
/// drives all mutable scheduling state, so no locking is needed around the
/// playback timeline.
pub struct VoiceSession {
    id: String,
    connected_at: DateTime<Utc>,
    transport: Arc<dyn LiveTransport>,

    state_tx: watch::Sender<SessionState>,
    amplitude_tx: watch::Sender<f32>,
    transcript_tx: watch::Sender<String>,
    outfit_tx: watch::Sender<Option<OutfitSuggestion>>,

    frames_sent: Arc<AtomicUsize>,
    chunks_played: Arc<AtomicUsize>,

    running: Arc<AtomicBool>,
    event_task: Mutex<Option<JoinHandle<()>>>,
    capture_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl VoiceSession {
    /// Connect to the live service and start the session.
    ///
    /// Fails fast with `MissingCredential` before any network activity if
    /// the API key is absent. No retry on any failure: reconnection is
    /// always a fresh call.
    pub async fn connect(
        config: &Config,
        capture: Box<dyn CaptureSource>,
    ) -> Result<Arc<Self>, SessionError> {
        let api_key = Config::api_key().ok_or(SessionError::MissingCredential)?;

        let (transport, events) = WsTransport::connect(&config.live, &api_key)
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        Ok(Self::start(config, Arc::new(transport), events, capture).await)
    }

    /// Wire up a session around an already-connected transport.
    ///
    /// The session starts in `Connecting` and waits for the transport's
    /// `Open` event before attaching capture and listening.
    pub async fn start(
        config: &Config,
        transport: Arc<dyn LiveTransport>,
        events: mpsc::Receiver<ServerEvent>,
        capture: Box<dyn CaptureSource>,
    ) -> Arc<Self> {
        let id = format!("session-{}", uuid::Uuid::new_v4());
        info!("starting voice session: {}", id);

        let (state_tx, _) = watch::channel(SessionState::Connecting);
        let (amplitude_tx, _) = watch::channel(0.0f32);
        let (transcript_tx, _) = watch::channel(String::new());
        let (outfit_tx, _) = watch::channel(None);

        let session = Arc::new(Self {
            id,
            connected_at: Utc::now(),
            transport,
            state_tx,
            amplitude_tx,
            transcript_tx,
            outfit_tx,
            frames_sent: Arc::new(AtomicUsize::new(0)),
            chunks_played: Arc::new(AtomicUsize::new(0)),
            running: Arc::new(AtomicBool::new(true)),
            event_task: Mutex::new(None),
            capture_task: Arc::new(Mutex::new(None)),
        });

        // Merge transport events and playback completions onto one channel.
        let (merged_tx, merged_rx) = mpsc::unbounded_channel();

        let server_tx = merged_tx.clone();
        let mut events = events;
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if server_tx.send(SessionEvent::Server(event)).is_err() {
                    break;
                }
            }
        });

        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(id) = done_rx.recv().await {
                if merged_tx.send(SessionEvent::PlaybackEnded(id)).is_err() {
                    break;
                }
            }
        });

        let clock = Arc::new(SystemClock::new());
        let scheduler = PlaybackScheduler::new(
            Arc::clone(&clock),
            TimerSink::new(clock, done_tx),
            config.audio.playback_sample_rate,
            config.audio.channels,
        );

        let task = tokio::spawn(run_event_loop(
            Arc::clone(&session),
            merged_rx,
            scheduler,
            capture,
        ));
        *session.event_task.lock().await = Some(task);

        session
    }

    /// Tear the session down. Safe to call from any state; a session stuck
    /// in `Connecting` is released here.
    pub async fn disconnect(&self) {
        info!("disconnecting voice session: {}", self.id);
        self.running.store(false, Ordering::SeqCst);

        if let Err(e) = self.transport.close().await {
            warn!("error closing transport: {e}");
        }

        if let Some(task) = self.event_task.lock().await.take() {
            task.abort();
        }
        if let Some(task) = self.capture_task.lock().await.take() {
            task.abort();
        }

        // Leave a transport error visible; everything else returns to Idle.
        self.state_tx.send_if_modified(|s| {
            if *s != SessionState::Error && *s != SessionState::Idle {
                *s = SessionState::Idle;
                true
            } else {
                false
            }
        });
        self.amplitude_tx.send_replace(0.0);
    }

    /// Send a typed message to the model. Resets the running transcript.
    pub async fn send_text(&self, text: &str) -> Result<()> {
        self.transcript_tx.send_replace(String::new());
        self.transport.send_text(text).await
    }

    /// Clear the displayed outfit.
    pub fn dismiss_outfit(&self) {
        self.outfit_tx.send_replace(None);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Current input/output level, 0..1.
    pub fn amplitude(&self) -> f32 {
        *self.amplitude_tx.borrow()
    }

    pub fn watch_amplitude(&self) -> watch::Receiver<f32> {
        self.amplitude_tx.subscribe()
    }

    pub fn transcript(&self) -> String {
        self.transcript_tx.borrow().clone()
    }

    pub fn watch_transcript(&self) -> watch::Receiver<String> {
        self.transcript_tx.subscribe()
    }

    pub fn outfit(&self) -> Option<OutfitSuggestion> {
        self.outfit_tx.borrow().clone()
    }

    pub fn watch_outfit(&self) -> watch::Receiver<Option<OutfitSuggestion>> {
        self.outfit_tx.subscribe()
    }

    pub fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.connected_at);
        SessionStats {
            session_id: self.id.clone(),
            state: self.state(),
            connected_at: self.connected_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            frames_sent: self.frames_sent.load(Ordering::SeqCst),
            chunks_played: self.chunks_played.load(Ordering::SeqCst),
            transcript_chars: self.transcript_tx.borrow().len(),
        }
    }

    fn set_state(&self, next: SessionState) {
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            info!(from = %current, to = %next, "session state changed");
            *current = next;
            true
        });
    }
}

/// The single consumer loop: processes merged events strictly in arrival
/// order, so the playback timeline has exactly one writer.
async fn run_event_loop(
    session: Arc<VoiceSession>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    mut scheduler: PlaybackScheduler<Arc<SystemClock>, TimerSink>,
    capture: Box<dyn CaptureSource>,
) {
    // Capture attaches on the first Open and stays attached for the life of
    // the session.
    let mut mic = Some(capture);
    let mut capture_attached = false;

    while let Some(event) = events.recv().await {
        if !session.running.load(Ordering::SeqCst) {
            break;
        }

        match event {
            SessionEvent::Server(ServerEvent::Open) => {
                if capture_attached {
                    warn!("duplicate open event ignored");
                    continue;
                }
                let Some(mut source) = mic.take() else {
                    continue;
                };

                match source.start().await {
                    Ok(frames) => {
                        info!("session open, capture attached: {}", source.name());
                        let handle = spawn_capture_task(
                            frames,
                            Arc::clone(&session.transport),
                            session.amplitude_tx.clone(),
                            Arc::clone(&session.frames_sent),
                            Arc::clone(&session.running),
                        );
                        *session.capture_task.lock().await = Some(handle);
                        // Keep the source alive so it keeps delivering.
                        mic = Some(source);
                        capture_attached = true;
                        session.set_state(SessionState::Listening);
                    }
                    Err(e) => {
                        let e = SessionError::CaptureDenied(e.to_string());
                        error!("{e}");
                        session.set_state(SessionState::Error);
                        break;
                    }
                }
            }

            SessionEvent::Server(ServerEvent::Audio { data }) => {
                match scheduler.enqueue(&data) {
                    Ok(chunk) => {
                        session.chunks_played.fetch_add(1, Ordering::SeqCst);
                        session.amplitude_tx.send_replace(chunk.level);
                        if session.state() == SessionState::Listening {
                            session.set_state(SessionState::Speaking);
                        }
                    }
                    // Truncated chunk: drop it, the session survives.
                    Err(e) => warn!("dropping audio chunk: {e}"),
                }
            }

            SessionEvent::Server(ServerEvent::Transcript { text }) => {
                session.transcript_tx.send_modify(|t| t.push_str(&text));
            }

            SessionEvent::Server(ServerEvent::ToolCall { id, name, args }) => {
                if name == OUTFIT_TOOL {
                    // Render whatever fields are present; malformed args
                    // fall back to an empty card rather than a rejection.
                    let outfit: OutfitSuggestion =
                        serde_json::from_value(args).unwrap_or_default();
                    info!(style = %outfit.style, "outfit suggestion received");
                    session.outfit_tx.send_replace(Some(outfit));
                } else {
                    warn!(%name, "unknown tool invoked");
                }

                // Exactly one acknowledgement per invocation, echoing the
                // call id, unconditionally successful.
                if let Err(e) = session.transport.send_tool_response(&id, true).await {
                    error!("failed to acknowledge tool call {id}: {e}");
                }
            }

            SessionEvent::Server(ServerEvent::Interrupted) => {
                scheduler.interrupt();
                session.amplitude_tx.send_replace(0.0);
                // Schedule and sources reset even when already listening
                if session.state() == SessionState::Speaking {
                    session.set_state(SessionState::Listening);
                }
            }

            SessionEvent::Server(ServerEvent::TurnComplete) => {
                debug!("model turn complete");
            }

            SessionEvent::Server(ServerEvent::Error { message }) => {
                error!("transport error: {message}");
                session.set_state(SessionState::Error);
                break;
            }

            SessionEvent::Server(ServerEvent::Closed) => {
                info!("transport closed");
                session.set_state(SessionState::Idle);
                break;
            }

            SessionEvent::PlaybackEnded(id) => {
                if scheduler.on_source_ended(id) {
                    // Output drained: back to listening.
                    session.amplitude_tx.send_replace(0.0);
                    if session.state() == SessionState::Speaking {
                        session.set_state(SessionState::Listening);
                    }
                }
            }
        }
    }

    session.running.store(false, Ordering::SeqCst);
    debug!("session event loop finished");
}
