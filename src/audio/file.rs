use super::capture::{AudioFrame, CaptureSource};
use anyhow::{Context, Result};
use hound::WavReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Capture source that replays a WAV file in fixed-size frames at
/// real-time cadence. The headless stand-in for a live microphone.
pub struct WavSource {
    path: String,
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    frame_samples: usize,
    capturing: Arc<AtomicBool>,
}

impl WavSource {
    pub fn open(path: impl AsRef<Path>, frame_samples: usize) -> Result<Self> {
        let path = path.as_ref();
        info!("opening capture file: {}", path.display());

        let reader = WavReader::open(path).context("Failed to open WAV file")?;

        let spec = reader.spec();
        let samples: Vec<f32> = reader
            .into_samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration = samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);
        info!(
            "capture file loaded: {:.1}s, {}Hz, {} channels",
            duration, spec.sample_rate, spec.channels
        );

        Ok(Self {
            path: path.display().to_string(),
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            frame_samples,
            capturing: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

#[async_trait::async_trait]
impl CaptureSource for WavSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let (tx, rx) = mpsc::channel(16);

        self.capturing.store(true, Ordering::SeqCst);

        let samples = self.samples.clone();
        let sample_rate = self.sample_rate;
        let channels = self.channels;
        let frame_samples = self.frame_samples;
        let capturing = Arc::clone(&self.capturing);

        tokio::spawn(async move {
            let frame_ms =
                (frame_samples as f64 * 1000.0) / (sample_rate as f64 * channels as f64);
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs_f64(frame_ms / 1000.0));
            let mut timestamp_ms = 0u64;

            for chunk in samples.chunks(frame_samples) {
                ticker.tick().await;

                if !capturing.load(Ordering::SeqCst) {
                    break;
                }

                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate,
                    channels,
                    timestamp_ms,
                };
                timestamp_ms += frame_ms as u64;

                if tx.send(frame).await.is_err() {
                    break;
                }
            }

            capturing.store(false, Ordering::SeqCst);
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        &self.path
    }
}
