use crate::audio::pcm;
use crate::transport::LiveTransport;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// One microphone frame: f32 samples in [-1, 1], interleaved.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Source of live microphone-style frames.
///
/// Implementations push fixed-size frames at real-time cadence; the
/// file-backed source replays a WAV recording the same way.
#[async_trait::async_trait]
pub trait CaptureSource: Send + Sync {
    /// Start capturing; returns the channel frames arrive on.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing.
    async fn stop(&mut self) -> Result<()>;

    /// Whether the source is currently delivering frames.
    fn is_capturing(&self) -> bool;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Forward captured frames to the live transport.
///
/// Per frame: publish the RMS level, convert to 16-bit PCM, base64-encode,
/// and send. Sends are fire-and-forget (one spawned task per frame) with no
/// bound on outstanding sends; a slow link grows the in-flight set without
/// limit. That matches the source system this engine models and is a known
/// limitation, not a goal.
pub fn spawn_capture_task(
    mut frames: mpsc::Receiver<AudioFrame>,
    transport: Arc<dyn LiveTransport>,
    amplitude: watch::Sender<f32>,
    frames_sent: Arc<AtomicUsize>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("capture task started");

        while let Some(frame) = frames.recv().await {
            if !running.load(Ordering::SeqCst) {
                break;
            }

            amplitude.send_replace(pcm::rms(&frame.samples));

            let payload = pcm::encode_payload(&pcm::float_to_pcm16(&frame.samples));
            let mime_type = format!("audio/pcm;rate={}", frame.sample_rate);

            frames_sent.fetch_add(1, Ordering::SeqCst);

            let transport = Arc::clone(&transport);
            tokio::spawn(async move {
                if let Err(e) = transport.send_audio(&mime_type, payload).await {
                    error!("failed to send audio frame: {e}");
                }
            });
        }

        amplitude.send_replace(0.0);
        info!("capture task stopped");
    })
}
